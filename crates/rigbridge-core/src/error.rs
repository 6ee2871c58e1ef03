//! Error types and Hamlib-compatible status codes
//!
//! Every failure that crosses the flat export surface is a negative integer
//! taken from the wrapped library's fixed error enumeration. Inside Rust the
//! richer [`RigError`] is used so that host-specific failure detail is not lost
//! before it reaches the boundary.

use std::fmt;

use thiserror::Error;

use crate::types::ModelId;

/// Hamlib status codes (`enum rig_errcode_e`)
///
/// The discriminant is the positive magnitude; on the wire the code is
/// negated (see [`ErrorCode::status`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// Completed successfully (`RIG_OK`)
    Ok = 0,
    /// Invalid parameter (`RIG_EINVAL`)
    InvalidArgument = 1,
    /// Invalid configuration (`RIG_ECONF`)
    Config = 2,
    /// Memory shortage (`RIG_ENOMEM`)
    NoMemory = 3,
    /// Function not implemented (`RIG_ENIMPL`)
    NotImplemented = 4,
    /// Communication timed out (`RIG_ETIMEOUT`)
    Timeout = 5,
    /// I/O error (`RIG_EIO`)
    Io = 6,
    /// Internal library error (`RIG_EINTERNAL`)
    Internal = 7,
    /// Protocol error (`RIG_EPROTO`)
    Protocol = 8,
    /// Command rejected by the rig (`RIG_ERJCTED`)
    Rejected = 9,
    /// Argument truncated (`RIG_ETRUNC`)
    Truncated = 10,
    /// Function not available (`RIG_ENAVAIL`)
    NotAvailable = 11,
    /// VFO not targetable (`RIG_ENTARGET`)
    NotTargetable = 12,
    /// Error talking on the bus (`RIG_BUSERROR`)
    BusError = 13,
    /// Collision on the bus (`RIG_BUSBUSY`)
    BusBusy = 14,
    /// Invalid pointer or argument (`RIG_EARG`)
    Arg = 15,
    /// Invalid VFO (`RIG_EVFO`)
    Vfo = 16,
    /// Argument out of domain of function (`RIG_EDOM`)
    Domain = 17,
    /// Function deprecated (`RIG_EDEPRECATED`)
    Deprecated = 18,
    /// Security error (`RIG_ESECURITY`)
    Security = 19,
    /// Rig not powered on (`RIG_EPOWER`)
    Power = 20,
}

impl ErrorCode {
    const ALL: [ErrorCode; 21] = [
        Self::Ok,
        Self::InvalidArgument,
        Self::Config,
        Self::NoMemory,
        Self::NotImplemented,
        Self::Timeout,
        Self::Io,
        Self::Internal,
        Self::Protocol,
        Self::Rejected,
        Self::Truncated,
        Self::NotAvailable,
        Self::NotTargetable,
        Self::BusError,
        Self::BusBusy,
        Self::Arg,
        Self::Vfo,
        Self::Domain,
        Self::Deprecated,
        Self::Security,
        Self::Power,
    ];

    /// Negative status value as returned across the export surface
    pub fn status(self) -> i32 {
        -(self as i32)
    }

    /// Decode a status value returned by the wrapped library
    ///
    /// Accepts either sign, since some library paths return the positive
    /// magnitude. Returns `None` for codes outside the enumeration.
    pub fn from_status(status: i32) -> Option<Self> {
        let magnitude = status.checked_abs()?;
        Self::ALL.iter().copied().find(|c| *c as i32 == magnitude)
    }

    /// Short description, matching the library's `rigerror()` wording
    pub fn description(self) -> &'static str {
        match self {
            Self::Ok => "Command completed successfully",
            Self::InvalidArgument => "Invalid parameter",
            Self::Config => "Invalid configuration",
            Self::NoMemory => "Memory shortage",
            Self::NotImplemented => "Feature not implemented",
            Self::Timeout => "Communication timed out",
            Self::Io => "IO error",
            Self::Internal => "Internal Hamlib error",
            Self::Protocol => "Protocol error",
            Self::Rejected => "Command rejected by the rig",
            Self::Truncated => "Command performed, but arg truncated",
            Self::NotAvailable => "Function not available",
            Self::NotTargetable => "VFO not targetable",
            Self::BusError => "Error talking on the bus",
            Self::BusBusy => "Collision on the bus",
            Self::Arg => "NULL RIG handle or invalid pointer parameter",
            Self::Vfo => "Invalid VFO",
            Self::Domain => "Argument out of domain of func",
            Self::Deprecated => "Function deprecated",
            Self::Security => "Security error",
            Self::Power => "Rig not powered on",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// The four host-supplied transport operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOp {
    Open,
    Close,
    Write,
    Read,
}

impl HostOp {
    /// All operations, in registration order
    pub const ALL: [HostOp; 4] = [Self::Open, Self::Close, Self::Write, Self::Read];

    /// Lowercase operation name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Write => "write",
            Self::Read => "read",
        }
    }
}

impl fmt::Display for HostOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors produced by the bridge
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RigError {
    /// A required handle, pointer or value was absent or out of range
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Missing callback, or an operation attempted before full registration
    #[error("configuration error: {0}")]
    Config(String),

    /// A host callback reported failure; `code` is the host's own value
    #[error("host {op} callback failed with code {code}")]
    HostIo { op: HostOp, code: i32 },

    /// Status returned by the wrapped library, passed through unchanged
    #[error("rig library error {0}: {desc}", desc = describe_status(.0))]
    Backend(i32),

    /// The wrapped library could not construct a rig for this model
    #[error("failed to initialize rig model {0}")]
    InitFailed(ModelId),

    /// Model id or model index not known to the wrapped library
    #[error("unknown rig model {0}")]
    UnknownModel(ModelId),
}

impl RigError {
    /// Create a configuration error for a missing host callback
    pub fn missing_callback(op: HostOp) -> Self {
        Self::Config(format!("host {op} callback not set"))
    }

    /// Library error carrying a known code
    pub fn backend(code: ErrorCode) -> Self {
        Self::Backend(code.status())
    }

    /// Status code class of this error
    ///
    /// Library statuses outside the known enumeration are classed as
    /// [`ErrorCode::Internal`]; [`RigError::status`] still returns them as-is.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) | Self::UnknownModel(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::Config,
            Self::InitFailed(_) => ErrorCode::Internal,
            Self::HostIo { .. } => ErrorCode::Io,
            Self::Backend(status) => ErrorCode::from_status(*status).unwrap_or(ErrorCode::Internal),
        }
    }

    /// Status value for the flat export surface
    pub fn status(&self) -> i32 {
        match self {
            Self::Backend(status) => *status,
            _ => self.code().status(),
        }
    }

    /// Host callback code, when the error came from a host callback
    pub fn host_code(&self) -> Option<i32> {
        match self {
            Self::HostIo { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Interpret a status value returned by the wrapped library
    ///
    /// Only `RIG_OK` is success. Any other value, including codes newer than
    /// [`ErrorCode`] and positive magnitudes, is kept verbatim.
    pub fn check(status: i32) -> Result<()> {
        if status == ErrorCode::Ok.status() {
            return Ok(());
        }
        Err(Self::Backend(status))
    }
}

fn describe_status(status: &i32) -> &'static str {
    ErrorCode::from_status(*status).map_or("unknown status", ErrorCode::description)
}

/// Result alias used throughout the bridge
pub type Result<T> = std::result::Result<T, RigError>;

/// Flatten a result to a status code (`0` on success)
pub fn status_of<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => ErrorCode::Ok.status(),
        Err(e) => e.status(),
    }
}
