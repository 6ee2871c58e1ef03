//! In-memory rig library
//!
//! [`DummyBackend`] behaves like the wrapped library's dummy rigs: it keeps
//! frequency, mode, passband and PTT in memory and only touches the host
//! transport to open and close it.

use rigbridge_core::{
    BridgeConfig, ErrorCode, Freq, Mode, ModelId, PassbandWidth, Port, PortSettings, Ptt,
    Result, RigBackend, RigError, Vfo, PASSBAND_NOCHANGE, PASSBAND_NORMAL,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::models::{normal_passband, SimModel, SimModelDatabase};

/// Initial state for every rig a [`DummyBackend`] constructs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Initial frequency in Hz
    pub initial_frequency_hz: Freq,
    /// Initial operating mode, by name
    pub initial_mode: String,
    /// Initial passband in Hz
    pub initial_width_hz: PassbandWidth,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_frequency_hz: 14_250_000.0, // 20m
            initial_mode: "USB".to_string(),
            initial_width_hz: 2_400,
        }
    }
}

impl SimConfig {
    /// Initial mode, falling back to USB for an unknown name
    pub fn mode(&self) -> Mode {
        Mode::from_name(&self.initial_mode).unwrap_or_else(|| {
            warn!(mode = %self.initial_mode, "unknown initial mode, using USB");
            Mode::USB
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct VfoState {
    freq: Freq,
    mode: Mode,
    width: PassbandWidth,
}

/// A simulated rig
#[derive(Debug)]
pub struct DummyRig {
    model: ModelId,
    caps: &'static SimModel,
    opened: bool,
    vfos: [VfoState; 2],
    current: usize,
    ptt: Ptt,
}

impl DummyRig {
    fn new(model: ModelId, caps: &'static SimModel, config: &SimConfig) -> Self {
        let state = VfoState {
            freq: config.initial_frequency_hz,
            mode: config.mode(),
            width: config.initial_width_hz,
        };
        Self {
            model,
            caps,
            opened: false,
            vfos: [state; 2],
            current: 0,
            ptt: Ptt::OFF,
        }
    }

    /// Model id
    pub fn model(&self) -> ModelId {
        self.model
    }

    /// Whether the rig is open
    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// Frequency of VFO A, regardless of open state
    pub fn frequency_hz(&self) -> Freq {
        self.vfos[0].freq
    }

    /// Current PTT state, regardless of open state
    pub fn ptt(&self) -> Ptt {
        self.ptt
    }

    fn ensure_open(&self) -> Result<()> {
        if self.opened {
            Ok(())
        } else {
            debug!(model = self.model, "rig not open");
            Err(RigError::backend(ErrorCode::InvalidArgument))
        }
    }

    fn vfo_index(&self, vfo: Vfo) -> Result<usize> {
        if !self.caps.has_vfo {
            return Ok(0);
        }
        match vfo {
            Vfo::NONE | Vfo::CURR => Ok(self.current),
            Vfo::A | Vfo::MAIN => Ok(0),
            Vfo::B | Vfo::SUB => Ok(1),
            other => {
                debug!(vfo = %other, "unsupported VFO");
                Err(RigError::backend(ErrorCode::Vfo))
            }
        }
    }

    fn vfo(&self, vfo: Vfo) -> Result<&VfoState> {
        self.ensure_open()?;
        let index = self.vfo_index(vfo)?;
        Ok(&self.vfos[index])
    }

    fn vfo_mut(&mut self, vfo: Vfo) -> Result<&mut VfoState> {
        self.ensure_open()?;
        let index = self.vfo_index(vfo)?;
        Ok(&mut self.vfos[index])
    }
}

/// Rig library made of [`DummyRig`]s
#[derive(Debug, Default)]
pub struct DummyBackend {
    config: SimConfig,
    constructed: usize,
    released: usize,
}

impl DummyBackend {
    /// Create a backend with default initial state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend whose rigs start from `config`
    pub fn with_config(config: SimConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Initial state for new rigs
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Number of rigs constructed so far
    pub fn constructed(&self) -> usize {
        self.constructed
    }

    /// Number of rigs released so far
    pub fn released(&self) -> usize {
        self.released
    }
}

impl RigBackend for DummyBackend {
    type Rig = DummyRig;

    fn init(&mut self, model: ModelId) -> Option<DummyRig> {
        let Some(caps) = SimModelDatabase::by_id(model) else {
            warn!(model, "model not in simulated catalog");
            return None;
        };
        self.constructed += 1;
        Some(DummyRig::new(model, caps, &self.config))
    }

    fn open(
        &mut self,
        rig: &mut DummyRig,
        settings: &PortSettings,
        port: &mut dyn Port,
    ) -> Result<()> {
        if rig.opened {
            return Err(RigError::backend(ErrorCode::InvalidArgument));
        }
        port.open(settings)?;
        rig.opened = true;
        info!(model = rig.model, path = %settings.pathname(), "dummy rig opened");
        Ok(())
    }

    fn close(&mut self, rig: &mut DummyRig, port: &mut dyn Port) -> Result<()> {
        rig.ensure_open()?;
        // The rig counts as closed even if the host transport complains
        rig.opened = false;
        rig.ptt = Ptt::OFF;
        port.close()
    }

    fn cleanup(&mut self, rig: DummyRig) -> Result<()> {
        debug!(model = rig.model, open = rig.opened, "releasing dummy rig");
        self.released += 1;
        Ok(())
    }

    fn set_freq(
        &mut self,
        rig: &mut DummyRig,
        vfo: Vfo,
        freq: Freq,
        _port: &mut dyn Port,
    ) -> Result<()> {
        rig.ensure_open()?;
        if !rig.caps.tunes(freq) {
            debug!(freq, "frequency out of range");
            return Err(RigError::backend(ErrorCode::InvalidArgument));
        }
        rig.vfo_mut(vfo)?.freq = freq;
        trace!(%vfo, freq, "frequency set");
        Ok(())
    }

    fn get_freq(&mut self, rig: &mut DummyRig, vfo: Vfo, _port: &mut dyn Port) -> Result<Freq> {
        Ok(rig.vfo(vfo)?.freq)
    }

    fn set_mode(
        &mut self,
        rig: &mut DummyRig,
        vfo: Vfo,
        mode: Mode,
        width: PassbandWidth,
        _port: &mut dyn Port,
    ) -> Result<()> {
        rig.ensure_open()?;
        if !rig.caps.supports(mode) {
            debug!(%mode, "mode not supported");
            return Err(RigError::backend(ErrorCode::InvalidArgument));
        }

        let state = rig.vfo_mut(vfo)?;
        state.mode = mode;
        state.width = match width {
            PASSBAND_NOCHANGE => state.width,
            PASSBAND_NORMAL => normal_passband(mode),
            w => w,
        };
        trace!(%vfo, %mode, width = state.width, "mode set");
        Ok(())
    }

    fn get_mode(
        &mut self,
        rig: &mut DummyRig,
        vfo: Vfo,
        _port: &mut dyn Port,
    ) -> Result<(Mode, PassbandWidth)> {
        let state = rig.vfo(vfo)?;
        Ok((state.mode, state.width))
    }

    fn set_ptt(
        &mut self,
        rig: &mut DummyRig,
        vfo: Vfo,
        ptt: Ptt,
        _port: &mut dyn Port,
    ) -> Result<()> {
        rig.ensure_open()?;
        rig.vfo_index(vfo)?;
        if !ptt.is_known() {
            debug!(ptt = ptt.as_raw(), "unknown PTT value");
            return Err(RigError::backend(ErrorCode::InvalidArgument));
        }
        rig.ptt = ptt;
        trace!(%vfo, ?ptt, "ptt set");
        Ok(())
    }

    fn get_ptt(&mut self, rig: &mut DummyRig, vfo: Vfo, _port: &mut dyn Port) -> Result<Ptt> {
        rig.ensure_open()?;
        rig.vfo_index(vfo)?;
        Ok(rig.ptt)
    }

    fn model_name(&self, model: ModelId) -> Option<&'static str> {
        SimModelDatabase::by_id(model).map(|m| m.model)
    }

    fn models(&mut self) -> Vec<ModelId> {
        SimModelDatabase::ids().collect()
    }

    fn configure(&mut self, config: &BridgeConfig) {
        debug!(level = ?config.debug_level, "simulated library configured");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigbridge_core::ReadMode;

    /// Port that accepts everything and counts opens and closes
    #[derive(Default)]
    struct NullPort {
        opens: usize,
        closes: usize,
    }

    impl Port for NullPort {
        fn open(&mut self, _: &PortSettings) -> Result<()> {
            self.opens += 1;
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            self.closes += 1;
            Ok(())
        }

        fn write_block(&mut self, buf: &[u8]) -> Result<usize> {
            Ok(buf.len())
        }

        fn read_block(&mut self, _: &mut [u8], _: ReadMode) -> Result<usize> {
            Ok(0)
        }
    }

    fn open_rig(model: ModelId) -> (DummyBackend, DummyRig, NullPort) {
        let mut backend = DummyBackend::new();
        let mut port = NullPort::default();
        let mut rig = backend.init(model).unwrap();
        backend.open(&mut rig, &PortSettings::new(), &mut port).unwrap();
        (backend, rig, port)
    }

    #[test]
    fn test_unknown_model() {
        let mut backend = DummyBackend::new();
        assert!(backend.init(9999).is_none());
        assert_eq!(backend.constructed(), 0);
    }

    #[test]
    fn test_initial_state_from_config() {
        let (mut backend, mut rig, mut port) = open_rig(1);
        assert_eq!(backend.get_freq(&mut rig, Vfo::CURR, &mut port).unwrap(), 14_250_000.0);
        assert_eq!(
            backend.get_mode(&mut rig, Vfo::CURR, &mut port).unwrap(),
            (Mode::USB, 2_400)
        );
        assert_eq!(backend.get_ptt(&mut rig, Vfo::CURR, &mut port).unwrap(), Ptt::OFF);
    }

    #[test]
    fn test_open_and_close_use_port() {
        let (mut backend, mut rig, mut port) = open_rig(1);
        assert_eq!(port.opens, 1);
        assert!(rig.is_open());

        backend.close(&mut rig, &mut port).unwrap();
        assert_eq!(port.closes, 1);
        assert!(!rig.is_open());
    }

    #[test]
    fn test_closed_rig_rejects_control_calls() {
        let mut backend = DummyBackend::new();
        let mut port = NullPort::default();
        let mut rig = backend.init(1).unwrap();

        let err = backend.get_freq(&mut rig, Vfo::A, &mut port).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert!(backend.set_freq(&mut rig, Vfo::A, 7e6, &mut port).is_err());
        assert!(backend.close(&mut rig, &mut port).is_err());
        assert_eq!(port.closes, 0);
    }

    #[test]
    fn test_double_open_rejected() {
        let (mut backend, mut rig, mut port) = open_rig(1);
        assert!(backend.open(&mut rig, &PortSettings::new(), &mut port).is_err());
        assert_eq!(port.opens, 1);
    }

    #[test]
    fn test_frequency_out_of_range() {
        let (mut backend, mut rig, mut port) = open_rig(1);
        let err = backend.set_freq(&mut rig, Vfo::A, 1_000.0, &mut port).unwrap_err();
        assert_eq!(err.status(), -1);
        assert_eq!(rig.frequency_hz(), 14_250_000.0);
    }

    #[test]
    fn test_vfos_are_independent() {
        let (mut backend, mut rig, mut port) = open_rig(1);
        backend.set_freq(&mut rig, Vfo::A, 7_074_000.0, &mut port).unwrap();
        backend.set_freq(&mut rig, Vfo::B, 10_136_000.0, &mut port).unwrap();

        assert_eq!(backend.get_freq(&mut rig, Vfo::A, &mut port).unwrap(), 7_074_000.0);
        assert_eq!(backend.get_freq(&mut rig, Vfo::B, &mut port).unwrap(), 10_136_000.0);
        assert_eq!(backend.get_freq(&mut rig, Vfo::CURR, &mut port).unwrap(), 7_074_000.0);
    }

    #[test]
    fn test_no_vfo_model_collapses_vfos() {
        let (mut backend, mut rig, mut port) = open_rig(6);
        backend.set_freq(&mut rig, Vfo::A, 7_074_000.0, &mut port).unwrap();
        backend.set_freq(&mut rig, Vfo::B, 10_136_000.0, &mut port).unwrap();

        assert_eq!(backend.get_freq(&mut rig, Vfo::A, &mut port).unwrap(), 10_136_000.0);
        // Any VFO value is accepted
        assert!(backend.get_freq(&mut rig, Vfo::MEM, &mut port).is_ok());
    }

    #[test]
    fn test_unsupported_vfo() {
        let (mut backend, mut rig, mut port) = open_rig(1);
        let err = backend.get_freq(&mut rig, Vfo::MEM, &mut port).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Vfo);
    }

    #[test]
    fn test_passband_special_values() {
        let (mut backend, mut rig, mut port) = open_rig(1);

        backend.set_mode(&mut rig, Vfo::A, Mode::CW, PASSBAND_NORMAL, &mut port).unwrap();
        assert_eq!(backend.get_mode(&mut rig, Vfo::A, &mut port).unwrap(), (Mode::CW, 500));

        backend.set_mode(&mut rig, Vfo::A, Mode::CWR, PASSBAND_NOCHANGE, &mut port).unwrap();
        assert_eq!(backend.get_mode(&mut rig, Vfo::A, &mut port).unwrap(), (Mode::CWR, 500));

        backend.set_mode(&mut rig, Vfo::A, Mode::USB, 1_800, &mut port).unwrap();
        assert_eq!(backend.get_mode(&mut rig, Vfo::A, &mut port).unwrap(), (Mode::USB, 1_800));
    }

    #[test]
    fn test_unsupported_mode() {
        let (mut backend, mut rig, mut port) = open_rig(1);
        assert!(backend.set_mode(&mut rig, Vfo::A, Mode::FAX, 0, &mut port).is_err());
    }

    #[test]
    fn test_ptt_released_on_close() {
        let (mut backend, mut rig, mut port) = open_rig(1);
        backend.set_ptt(&mut rig, Vfo::CURR, Ptt::ON, &mut port).unwrap();
        assert!(rig.ptt().is_transmitting());

        backend.close(&mut rig, &mut port).unwrap();
        assert_eq!(rig.ptt(), Ptt::OFF);
    }

    #[test]
    fn test_unknown_ptt_rejected_by_library() {
        let (mut backend, mut rig, mut port) = open_rig(1);
        backend.set_ptt(&mut rig, Vfo::CURR, Ptt::ON_DATA, &mut port).unwrap();

        let err = backend.set_ptt(&mut rig, Vfo::CURR, Ptt::from_raw(4), &mut port).unwrap_err();
        assert_eq!(err.status(), -1);
        assert_eq!(rig.ptt(), Ptt::ON_DATA);
    }

    #[test]
    fn test_cleanup_counts() {
        let (mut backend, rig, _) = open_rig(1);
        backend.cleanup(rig).unwrap();
        assert_eq!(backend.constructed(), 1);
        assert_eq!(backend.released(), 1);
    }

    #[test]
    fn test_model_enumeration() {
        let mut backend = DummyBackend::new();
        assert_eq!(backend.models(), vec![1, 6]);
        assert_eq!(backend.model_name(6), Some("Dummy No VFO"));
        assert_eq!(backend.model_name(3), None);
    }

    #[test]
    fn test_sim_config_json() {
        let config: SimConfig =
            serde_json::from_str(r#"{"initial_frequency_hz":7074000.0,"initial_mode":"CW"}"#)
                .unwrap();
        assert_eq!(config.initial_width_hz, 2_400);
        assert_eq!(config.mode(), Mode::CW);

        let bogus = SimConfig {
            initial_mode: "SSTV".to_string(),
            ..SimConfig::default()
        };
        assert_eq!(bogus.mode(), Mode::USB);
    }
}
