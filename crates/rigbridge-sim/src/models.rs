//! Simulated model catalog
//!
//! Static descriptions of the rigs the simulated library can construct.

use rigbridge_core::{Freq, Mode, ModelId, PassbandWidth};

/// Capabilities of a simulated model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimModel {
    /// Model name
    pub model: &'static str,
    /// Supported operating modes
    pub modes: &'static [Mode],
    /// Lowest tunable frequency in Hz
    pub min_frequency_hz: Freq,
    /// Highest tunable frequency in Hz
    pub max_frequency_hz: Freq,
    /// Whether VFO A and B are tracked independently
    pub has_vfo: bool,
}

impl SimModel {
    /// Whether `freq` is inside the tunable range
    pub fn tunes(&self, freq: Freq) -> bool {
        (self.min_frequency_hz..=self.max_frequency_hz).contains(&freq)
    }

    /// Whether `mode` is supported
    pub fn supports(&self, mode: Mode) -> bool {
        self.modes.contains(&mode)
    }
}

/// Default passband for a mode, in Hz
pub fn normal_passband(mode: Mode) -> PassbandWidth {
    match mode {
        Mode::CW | Mode::CWR => 500,
        Mode::RTTY | Mode::RTTYR => 300,
        Mode::AM => 6_000,
        Mode::FM | Mode::PKTFM => 15_000,
        Mode::WFM => 230_000,
        _ => 2_400,
    }
}

/// Model ids known to the simulated library
pub struct SimModelDatabase;

impl SimModelDatabase {
    /// Look up a model by id
    pub fn by_id(id: ModelId) -> Option<&'static SimModel> {
        SIM_MODELS
            .iter()
            .find(|(model_id, _)| *model_id == id)
            .map(|(_, model)| model)
    }

    /// All model ids, in catalog order
    pub fn ids() -> impl Iterator<Item = ModelId> {
        SIM_MODELS.iter().map(|(id, _)| *id)
    }
}

static MODES_DUMMY: &[Mode] = &[
    Mode::AM,
    Mode::CW,
    Mode::USB,
    Mode::LSB,
    Mode::RTTY,
    Mode::FM,
    Mode::WFM,
    Mode::CWR,
    Mode::RTTYR,
    Mode::PKTLSB,
    Mode::PKTUSB,
    Mode::PKTFM,
];

static SIM_MODELS: &[(ModelId, SimModel)] = &[
    (
        1,
        SimModel {
            model: "Dummy",
            modes: MODES_DUMMY,
            min_frequency_hz: 150_000.0,
            max_frequency_hz: 1_500_000_000.0,
            has_vfo: true,
        },
    ),
    (
        6,
        SimModel {
            model: "Dummy No VFO",
            modes: MODES_DUMMY,
            min_frequency_hz: 150_000.0,
            max_frequency_hz: 1_500_000_000.0,
            has_vfo: false,
        },
    ),
];
