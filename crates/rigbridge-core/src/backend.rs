//! The wrapped rig-control library
//!
//! The bridge never speaks a radio protocol itself. Everything a control call
//! does on the wire is decided by a [`RigBackend`], which receives the
//! bridge's [`Port`] for any transport I/O it needs to perform.

use crate::config::BridgeConfig;
use crate::error::Result;
use crate::io::Port;
use crate::port::PortSettings;
use crate::types::{Freq, Mode, ModelId, PassbandWidth, Ptt, Vfo};

/// A rig-control library wrapped by the bridge
pub trait RigBackend {
    /// The library's own per-radio handle
    type Rig;

    /// Construct a handle for `model`
    ///
    /// `None` means the library itself could not create the rig.
    fn init(&mut self, model: ModelId) -> Option<Self::Rig>;

    /// Open the rig using `settings` for the transport
    fn open(
        &mut self,
        rig: &mut Self::Rig,
        settings: &PortSettings,
        port: &mut dyn Port,
    ) -> Result<()>;

    /// Close the rig
    fn close(&mut self, rig: &mut Self::Rig, port: &mut dyn Port) -> Result<()>;

    /// Release the handle
    fn cleanup(&mut self, rig: Self::Rig) -> Result<()>;

    fn set_freq(
        &mut self,
        rig: &mut Self::Rig,
        vfo: Vfo,
        freq: Freq,
        port: &mut dyn Port,
    ) -> Result<()>;

    fn get_freq(&mut self, rig: &mut Self::Rig, vfo: Vfo, port: &mut dyn Port) -> Result<Freq>;

    fn set_mode(
        &mut self,
        rig: &mut Self::Rig,
        vfo: Vfo,
        mode: Mode,
        width: PassbandWidth,
        port: &mut dyn Port,
    ) -> Result<()>;

    fn get_mode(
        &mut self,
        rig: &mut Self::Rig,
        vfo: Vfo,
        port: &mut dyn Port,
    ) -> Result<(Mode, PassbandWidth)>;

    fn set_ptt(
        &mut self,
        rig: &mut Self::Rig,
        vfo: Vfo,
        ptt: Ptt,
        port: &mut dyn Port,
    ) -> Result<()>;

    fn get_ptt(&mut self, rig: &mut Self::Rig, vfo: Vfo, port: &mut dyn Port) -> Result<Ptt>;

    /// Display name of a model, if the library knows it
    fn model_name(&self, model: ModelId) -> Option<&'static str>;

    /// Every model the library can construct, in library order
    fn models(&mut self) -> Vec<ModelId>;

    /// Apply bridge configuration relevant to the library
    fn configure(&mut self, _config: &BridgeConfig) {}
}
