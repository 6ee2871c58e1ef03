//! Transport configuration for a rig handle
//!
//! Mirrors the serial parameters the wrapped library keeps per port. Only the
//! destination path and baud rate are caller-controlled; framing is fixed at
//! 8N1 with no handshaking.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Size of the fixed path field, including the terminating NUL (`HAMLIB_FILPATHLEN`)
pub const FILPATHLEN: usize = 512;

/// Data bits applied by [`PortSettings::configure`]
pub const DEFAULT_DATA_BITS: u8 = 8;

/// Stop bits applied by [`PortSettings::configure`]
pub const DEFAULT_STOP_BITS: u8 = 1;

/// Serial parity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
    Mark,
    Space,
}

impl Parity {
    /// Name used by the wrapped library's configuration tokens
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Odd => "Odd",
            Self::Even => "Even",
            Self::Mark => "Mark",
            Self::Space => "Space",
        }
    }
}

/// Serial flow control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Handshake {
    #[default]
    None,
    XonXoff,
    Hardware,
}

impl Handshake {
    /// Name used by the wrapped library's configuration tokens
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::XonXoff => "XONXOFF",
            Self::Hardware => "Hardware",
        }
    }
}

/// Per-handle transport settings
#[derive(Clone, PartialEq, Eq)]
pub struct PortSettings {
    pathname: [u8; FILPATHLEN],
    /// Baud rate, stored exactly as given
    pub rate: i32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: Parity,
    pub handshake: Handshake,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            pathname: [0; FILPATHLEN],
            rate: 0,
            data_bits: DEFAULT_DATA_BITS,
            stop_bits: DEFAULT_STOP_BITS,
            parity: Parity::None,
            handshake: Handshake::None,
        }
    }
}

impl PortSettings {
    /// Create settings with an empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Set path and baud, and reset framing to 8N1 without handshaking
    ///
    /// Returns `true` if the path did not fit and was truncated.
    pub fn configure(&mut self, path: &str, baud: i32) -> bool {
        let truncated = self.set_pathname(path);
        self.rate = baud;
        self.data_bits = DEFAULT_DATA_BITS;
        self.stop_bits = DEFAULT_STOP_BITS;
        self.parity = Parity::None;
        self.handshake = Handshake::None;
        truncated
    }

    /// Copy `path` into the fixed path field
    ///
    /// At most `FILPATHLEN - 1` bytes are copied and the remainder of the
    /// field is zeroed, so the stored path is always NUL-terminated. Copying
    /// stops at an embedded NUL. Returns `true` if bytes were dropped.
    pub fn set_pathname(&mut self, path: &str) -> bool {
        let bytes = path.as_bytes();
        let bytes = match bytes.iter().position(|b| *b == 0) {
            Some(nul) => &bytes[..nul],
            None => bytes,
        };
        let len = bytes.len().min(FILPATHLEN - 1);

        self.pathname = [0; FILPATHLEN];
        self.pathname[..len].copy_from_slice(&bytes[..len]);

        let truncated = len < bytes.len();
        if truncated {
            tracing::warn!(
                requested = bytes.len(),
                stored = len,
                "port path truncated to fit {FILPATHLEN}-byte field"
            );
        }
        truncated
    }

    /// Stored path bytes, without the terminating NUL
    pub fn pathname_bytes(&self) -> &[u8] {
        let end = self
            .pathname
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(FILPATHLEN);
        &self.pathname[..end]
    }

    /// Stored path as text
    ///
    /// Truncation can split a multi-byte character; such a tail is replaced
    /// rather than dropped.
    pub fn pathname(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.pathname_bytes())
    }

    /// The whole fixed-size field, including the NUL padding
    pub fn raw_pathname(&self) -> &[u8; FILPATHLEN] {
        &self.pathname
    }
}

impl fmt::Debug for PortSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortSettings")
            .field("pathname", &self.pathname())
            .field("rate", &self.rate)
            .field("data_bits", &self.data_bits)
            .field("stop_bits", &self.stop_bits)
            .field("parity", &self.parity)
            .field("handshake", &self.handshake)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_short_path() {
        let mut port = PortSettings::new();
        let truncated = port.configure("/dev/ttyUSB0", 38400);

        assert!(!truncated);
        assert_eq!(port.pathname(), "/dev/ttyUSB0");
        assert_eq!(port.rate, 38400);
        assert_eq!(port.raw_pathname()[12], 0);
    }

    #[test]
    fn test_configure_forces_framing() {
        let mut port = PortSettings::new();
        port.data_bits = 7;
        port.stop_bits = 2;
        port.parity = Parity::Even;
        port.handshake = Handshake::Hardware;

        port.configure("serial", 4800);

        assert_eq!(port.data_bits, 8);
        assert_eq!(port.stop_bits, 1);
        assert_eq!(port.parity, Parity::None);
        assert_eq!(port.handshake, Handshake::None);
    }

    #[test]
    fn test_long_path_is_truncated_and_terminated() {
        let mut port = PortSettings::new();
        let long = "x".repeat(FILPATHLEN + 100);

        assert!(port.configure(&long, 9600));
        assert_eq!(port.pathname_bytes().len(), FILPATHLEN - 1);
        assert_eq!(port.raw_pathname()[FILPATHLEN - 1], 0);
    }

    #[test]
    fn test_exact_fit_is_not_truncated() {
        let mut port = PortSettings::new();
        let path = "p".repeat(FILPATHLEN - 1);
        assert!(!port.set_pathname(&path));
        assert_eq!(port.pathname(), path);
    }

    #[test]
    fn test_shorter_path_clears_previous_tail() {
        let mut port = PortSettings::new();
        port.set_pathname("/dev/ttyUSB10");
        port.set_pathname("/dev/a");
        assert_eq!(port.pathname(), "/dev/a");
        assert!(port.raw_pathname()[6..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_embedded_nul_stops_copy() {
        let mut port = PortSettings::new();
        port.set_pathname("abc\0def");
        assert_eq!(port.pathname(), "abc");
    }

    #[test]
    fn test_baud_stored_unchanged() {
        let mut port = PortSettings::new();
        port.configure("x", -5);
        assert_eq!(port.rate, -5);
        port.configure("x", 0);
        assert_eq!(port.rate, 0);
    }

    #[test]
    fn test_token_names() {
        assert_eq!(Parity::None.name(), "None");
        assert_eq!(Handshake::XonXoff.name(), "XONXOFF");
    }
}
