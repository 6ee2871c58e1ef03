//! Control-surface value types
//!
//! These mirror the wrapped library's native types closely enough that host
//! integers can be reinterpreted bit-for-bit, while still giving Rust callers
//! named constants.

use std::fmt;

/// Rig model identifier (`rig_model_t`)
pub type ModelId = u32;

/// Frequency in Hz (`freq_t`)
pub type Freq = f64;

/// Passband width in Hz (`pbwidth_t`)
pub type PassbandWidth = i64;

/// Use the rig's normal passband for the selected mode
pub const PASSBAND_NORMAL: PassbandWidth = 0;

/// Leave the passband unchanged
pub const PASSBAND_NOCHANGE: PassbandWidth = -1;

/// VFO selector (`vfo_t`)
///
/// The value is a bit set defined by the wrapped library; unknown bits are
/// carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vfo(pub u32);

impl Vfo {
    /// No VFO specified
    pub const NONE: Vfo = Vfo(0);
    /// VFO A
    pub const A: Vfo = Vfo(1 << 0);
    /// VFO B
    pub const B: Vfo = Vfo(1 << 1);
    /// VFO C
    pub const C: Vfo = Vfo(1 << 2);
    /// Sub receiver
    pub const SUB: Vfo = Vfo(1 << 25);
    /// Main receiver
    pub const MAIN: Vfo = Vfo(1 << 26);
    /// Memory channel
    pub const MEM: Vfo = Vfo(1 << 28);
    /// Currently selected VFO
    pub const CURR: Vfo = Vfo(1 << 29);

    /// Reinterpret a host integer as a VFO selector
    pub fn from_raw(raw: i32) -> Self {
        Vfo(raw as u32)
    }

    /// Host integer representation
    pub fn as_raw(self) -> i32 {
        self.0 as i32
    }

    /// Human-readable name for the well-known selectors
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::NONE => Some("None"),
            Self::A => Some("VFOA"),
            Self::B => Some("VFOB"),
            Self::C => Some("VFOC"),
            Self::SUB => Some("Sub"),
            Self::MAIN => Some("Main"),
            Self::MEM => Some("MEM"),
            Self::CURR => Some("currVFO"),
            _ => None,
        }
    }
}

impl fmt::Display for Vfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:08X}", self.0),
        }
    }
}

/// Operating mode bit (`rmode_t`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mode(pub u64);

impl Mode {
    pub const NONE: Mode = Mode(0);
    pub const AM: Mode = Mode(1 << 0);
    pub const CW: Mode = Mode(1 << 1);
    pub const USB: Mode = Mode(1 << 2);
    pub const LSB: Mode = Mode(1 << 3);
    pub const RTTY: Mode = Mode(1 << 4);
    pub const FM: Mode = Mode(1 << 5);
    pub const WFM: Mode = Mode(1 << 6);
    pub const CWR: Mode = Mode(1 << 7);
    pub const RTTYR: Mode = Mode(1 << 8);
    pub const AMS: Mode = Mode(1 << 9);
    pub const PKTLSB: Mode = Mode(1 << 10);
    pub const PKTUSB: Mode = Mode(1 << 11);
    pub const PKTFM: Mode = Mode(1 << 12);
    pub const ECSSUSB: Mode = Mode(1 << 13);
    pub const ECSSLSB: Mode = Mode(1 << 14);
    pub const FAX: Mode = Mode(1 << 15);
    pub const SAM: Mode = Mode(1 << 16);
    pub const SAL: Mode = Mode(1 << 17);
    pub const SAH: Mode = Mode(1 << 18);
    pub const DSB: Mode = Mode(1 << 19);
    pub const FMN: Mode = Mode(1 << 21);
    pub const PKTAM: Mode = Mode(1 << 22);

    const NAMES: &'static [(Mode, &'static str)] = &[
        (Self::AM, "AM"),
        (Self::CW, "CW"),
        (Self::USB, "USB"),
        (Self::LSB, "LSB"),
        (Self::RTTY, "RTTY"),
        (Self::FM, "FM"),
        (Self::WFM, "WFM"),
        (Self::CWR, "CWR"),
        (Self::RTTYR, "RTTYR"),
        (Self::AMS, "AMS"),
        (Self::PKTLSB, "PKTLSB"),
        (Self::PKTUSB, "PKTUSB"),
        (Self::PKTFM, "PKTFM"),
        (Self::ECSSUSB, "ECSSUSB"),
        (Self::ECSSLSB, "ECSSLSB"),
        (Self::FAX, "FAX"),
        (Self::SAM, "SAM"),
        (Self::SAL, "SAL"),
        (Self::SAH, "SAH"),
        (Self::DSB, "DSB"),
        (Self::FMN, "FMN"),
        (Self::PKTAM, "PKTAM"),
    ];

    /// Widen a host integer to a mode, sign-extending like a C cast
    pub fn from_raw(raw: i32) -> Self {
        Mode(raw as i64 as u64)
    }

    /// Narrow to the host's integer width
    pub fn as_raw(self) -> i32 {
        self.0 as i32
    }

    /// Library name of a single mode bit
    pub fn name(self) -> Option<&'static str> {
        Self::NAMES
            .iter()
            .find(|(mode, _)| *mode == self)
            .map(|(_, name)| *name)
    }

    /// Look up a mode by its library name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(mode, _)| *mode)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:X}", self.0),
        }
    }
}

/// Push-to-talk state (`ptt_t`)
///
/// Host values are carried through unchecked; the wrapped library decides
/// which ones it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ptt(pub i32);

impl Ptt {
    /// Receive
    pub const OFF: Ptt = Ptt(0);
    /// Transmit
    pub const ON: Ptt = Ptt(1);
    /// Transmit, microphone audio source
    pub const ON_MIC: Ptt = Ptt(2);
    /// Transmit, data audio source
    pub const ON_DATA: Ptt = Ptt(3);

    /// Reinterpret a host integer as a PTT state
    pub fn from_raw(raw: i32) -> Self {
        Ptt(raw)
    }

    /// Host integer representation
    pub fn as_raw(self) -> i32 {
        self.0
    }

    /// One of the states the library defines
    pub fn is_known(self) -> bool {
        (Self::OFF.0..=Self::ON_DATA.0).contains(&self.0)
    }

    /// Whether the rig is transmitting
    pub fn is_transmitting(self) -> bool {
        self != Self::OFF
    }
}
