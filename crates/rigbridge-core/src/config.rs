//! Bridge configuration

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::error::{Result, RigError};

/// Diagnostic verbosity, matching the wrapped library's `rig_debug_level_e`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DebugLevel {
    /// No output
    None = 0,
    /// Serious bugs only
    Bug = 1,
    /// Errors
    Err = 2,
    /// Warnings and errors
    #[default]
    Warn = 3,
    /// Per-call diagnostics
    Verbose = 4,
    /// Per-byte tracing
    Trace = 5,
}

impl DebugLevel {
    /// Decode the library's integer level; values above the range clamp to `Trace`
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            i32::MIN..=0 => Self::None,
            1 => Self::Bug,
            2 => Self::Err,
            3 => Self::Warn,
            4 => Self::Verbose,
            _ => Self::Trace,
        }
    }

    /// Equivalent `tracing` filter
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Self::None => LevelFilter::OFF,
            Self::Bug | Self::Err => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Verbose => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

/// Settings applied to a [`crate::Bridge`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Diagnostic verbosity
    #[serde(default)]
    pub debug_level: DebugLevel,
    /// Load every model backend before enumerating models
    #[serde(default = "default_true")]
    pub load_all_backends: bool,
}

fn default_true() -> bool {
    true
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            debug_level: DebugLevel::default(),
            load_all_backends: true,
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON configuration; missing fields take their defaults
    ///
    /// The document must be a JSON object. Derived deserialization would
    /// also accept an array, which here would silently reset every field.
    pub fn from_json(json: &str) -> Result<Self> {
        let invalid =
            |e: serde_json::Error| RigError::Config(format!("invalid bridge config: {e}"));
        let value: serde_json::Value = serde_json::from_str(json).map_err(invalid)?;
        if !value.is_object() {
            return Err(RigError::Config(
                "invalid bridge config: expected a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(invalid)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| RigError::Config(e.to_string()))
    }
}
