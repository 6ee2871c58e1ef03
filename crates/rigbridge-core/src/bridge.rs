//! The bridge context object
//!
//! A [`Bridge`] owns one set of host callbacks and one wrapped library. Every
//! operation that can touch the transport builds a [`HostPort`] over this
//! bridge's callbacks and hands it to the library, so I/O performed on behalf
//! of a handle always reaches the callbacks of the bridge that served the
//! call. Independent bridges never share callbacks.

use tracing::{debug, info, warn};

use crate::backend::RigBackend;
use crate::callbacks::{CloseCallback, HostCallbacks, OpenCallback, ReadCallback, WriteCallback};
use crate::config::BridgeConfig;
use crate::error::{Result, RigError};
use crate::io::{HostPort, Port, ReadMode};
use crate::port::PortSettings;
use crate::types::{Freq, Mode, ModelId, PassbandWidth, Ptt, Vfo};

/// A rig constructed through a [`Bridge`]
///
/// Owned by the caller from [`Bridge::construct`] until [`Bridge::cleanup`].
#[derive(Debug)]
pub struct RigHandle<R> {
    rig: R,
    model: ModelId,
    port: PortSettings,
}

impl<R> RigHandle<R> {
    /// Model the handle was constructed for
    pub fn model(&self) -> ModelId {
        self.model
    }

    /// Transport settings used on the next open
    pub fn port_settings(&self) -> &PortSettings {
        &self.port
    }

    /// The wrapped library's handle
    pub fn rig(&self) -> &R {
        &self.rig
    }
}

/// Host callbacks plus a wrapped rig library
pub struct Bridge<B: RigBackend> {
    callbacks: HostCallbacks,
    backend: B,
    config: BridgeConfig,
}

impl<B: RigBackend> Bridge<B> {
    /// Create a bridge with default configuration and no callbacks
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, BridgeConfig::default())
    }

    /// Create a bridge with custom configuration
    pub fn with_config(mut backend: B, config: BridgeConfig) -> Self {
        backend.configure(&config);
        Self {
            callbacks: HostCallbacks::new(),
            backend,
            config,
        }
    }

    /// Current configuration
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Replace the configuration
    pub fn set_config(&mut self, config: BridgeConfig) {
        self.backend.configure(&config);
        self.config = config;
    }

    /// The wrapped library
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Replace all four host callbacks
    pub fn register_callbacks(
        &mut self,
        open: Option<OpenCallback>,
        close: Option<CloseCallback>,
        write: Option<WriteCallback>,
        read: Option<ReadCallback>,
    ) {
        self.callbacks.register(open, close, write, read);
    }

    /// Registered callbacks
    pub fn callbacks(&self) -> &HostCallbacks {
        &self.callbacks
    }

    /// Registered callbacks, mutably
    pub fn callbacks_mut(&mut self) -> &mut HostCallbacks {
        &mut self.callbacks
    }

    /// A [`Port`] over this bridge's callbacks
    pub fn port(&mut self) -> HostPort<'_> {
        HostPort::new(&mut self.callbacks)
    }

    /// Construct a rig for `model`
    ///
    /// Fails with a configuration error unless all four callbacks are
    /// registered. A library failure is reported as [`RigError::InitFailed`].
    pub fn construct(&mut self, model: ModelId) -> Result<RigHandle<B::Rig>> {
        debug!(model, "constructing rig");

        if !self.callbacks.is_complete() {
            let missing = self.callbacks.missing();
            warn!(model, ?missing, "host callbacks not set");
            return Err(RigError::Config(format!(
                "host callbacks not set: {}",
                missing
                    .iter()
                    .map(|op| op.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        let Some(rig) = self.backend.init(model) else {
            warn!(model, "rig library failed to construct model");
            return Err(RigError::InitFailed(model));
        };

        info!(model, name = self.backend.model_name(model), "rig constructed");
        Ok(RigHandle {
            rig,
            model,
            port: PortSettings::new(),
        })
    }

    /// Open the rig through the host transport
    pub fn open(&mut self, handle: &mut RigHandle<B::Rig>) -> Result<()> {
        debug!(model = handle.model, port = ?handle.port, "opening rig");
        let mut port = HostPort::new(&mut self.callbacks);
        self.backend.open(&mut handle.rig, &handle.port, &mut port)
    }

    /// Close the rig
    pub fn close(&mut self, handle: &mut RigHandle<B::Rig>) -> Result<()> {
        debug!(model = handle.model, "closing rig");
        let mut port = HostPort::new(&mut self.callbacks);
        self.backend.close(&mut handle.rig, &mut port)
    }

    /// Release the rig; the handle is consumed either way
    pub fn cleanup(&mut self, handle: RigHandle<B::Rig>) -> Result<()> {
        debug!(model = handle.model, "cleaning up rig");
        self.backend.cleanup(handle.rig)
    }

    pub fn set_freq(
        &mut self,
        handle: &mut RigHandle<B::Rig>,
        vfo: Vfo,
        freq: Freq,
    ) -> Result<()> {
        let mut port = HostPort::new(&mut self.callbacks);
        self.backend.set_freq(&mut handle.rig, vfo, freq, &mut port)
    }

    pub fn get_freq(&mut self, handle: &mut RigHandle<B::Rig>, vfo: Vfo) -> Result<Freq> {
        let mut port = HostPort::new(&mut self.callbacks);
        self.backend.get_freq(&mut handle.rig, vfo, &mut port)
    }

    pub fn set_mode(
        &mut self,
        handle: &mut RigHandle<B::Rig>,
        vfo: Vfo,
        mode: Mode,
        width: PassbandWidth,
    ) -> Result<()> {
        let mut port = HostPort::new(&mut self.callbacks);
        self.backend.set_mode(&mut handle.rig, vfo, mode, width, &mut port)
    }

    pub fn get_mode(
        &mut self,
        handle: &mut RigHandle<B::Rig>,
        vfo: Vfo,
    ) -> Result<(Mode, PassbandWidth)> {
        let mut port = HostPort::new(&mut self.callbacks);
        self.backend.get_mode(&mut handle.rig, vfo, &mut port)
    }

    pub fn set_ptt(&mut self, handle: &mut RigHandle<B::Rig>, vfo: Vfo, ptt: Ptt) -> Result<()> {
        let mut port = HostPort::new(&mut self.callbacks);
        self.backend.set_ptt(&mut handle.rig, vfo, ptt, &mut port)
    }

    pub fn get_ptt(&mut self, handle: &mut RigHandle<B::Rig>, vfo: Vfo) -> Result<Ptt> {
        let mut port = HostPort::new(&mut self.callbacks);
        self.backend.get_ptt(&mut handle.rig, vfo, &mut port)
    }

    /// Set the transport path and baud rate used on the next open
    ///
    /// Framing is always reset to 8N1 without handshaking. Returns `true`
    /// if the path was truncated.
    pub fn set_transport_config(
        &self,
        handle: &mut RigHandle<B::Rig>,
        path: &str,
        baud: i32,
    ) -> bool {
        debug!(model = handle.model, path, baud, "setting transport config");
        handle.port.configure(path, baud)
    }

    /// Display name of `model`
    pub fn model_name(&self, model: ModelId) -> Option<&'static str> {
        self.backend.model_name(model)
    }

    /// Number of models the wrapped library can construct
    pub fn model_count(&mut self) -> usize {
        self.backend.models().len()
    }

    /// Model id at `index` in the library's enumeration order
    pub fn model_id_at(&mut self, index: usize) -> Result<ModelId> {
        self.backend
            .models()
            .get(index)
            .copied()
            .ok_or(RigError::InvalidArgument("model index out of range"))
    }

    /// Write through the host callbacks without a rig
    pub fn write_block(&mut self, buf: &[u8]) -> Result<usize> {
        self.port().write_block(buf)
    }

    /// Read through the host callbacks without a rig
    pub fn read_block(&mut self, buf: &mut [u8], mode: ReadMode) -> Result<usize> {
        self.port().read_block(buf, mode)
    }
}
