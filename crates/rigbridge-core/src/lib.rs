//! Rig Bridge Core
//!
//! This crate sits between a rig-control library and a host environment that
//! owns the actual transport (for example a browser serial or network API).
//!
//! - **Host callbacks**: the host registers open/close/write/read functions
//!   that stand in for a serial port
//! - **I/O interception**: every byte the library would exchange with a
//!   serial device is routed through those callbacks instead
//! - **Control surface**: frequency, mode, PTT and transport configuration as
//!   simply-typed operations returning the library's status codes
//!
//! # Architecture
//!
//! A [`Bridge`] is an explicit context object holding one set of
//! [`HostCallbacks`] and one [`RigBackend`] (the wrapped library). Control
//! operations hand the backend a [`Port`] built over the bridge's callbacks, so
//! all transport I/O goes through one policy (see [`io`]). Errors are
//! [`RigError`] values that flatten to the library's negative status codes.
//!
//! # Example
//!
//! ```rust,ignore
//! use rigbridge_core::{Bridge, HostCallbacks, Vfo};
//!
//! let mut bridge = Bridge::new(backend);
//! *bridge.callbacks_mut() = HostCallbacks::new()
//!     .with_open(|path, baud| host_open(path, baud))
//!     .with_close(|| host_close())
//!     .with_write(|buf| host_write(buf))
//!     .with_read(|buf| host_read(buf));
//!
//! let mut rig = bridge.construct(1)?;
//! bridge.set_transport_config(&mut rig, "web-serial:0", 38400);
//! bridge.open(&mut rig)?;
//! bridge.set_freq(&mut rig, Vfo::CURR, 14_074_000.0)?;
//! ```

pub mod backend;
pub mod bridge;
pub mod callbacks;
pub mod config;
pub mod error;
pub mod io;
pub mod port;
pub mod types;

pub use backend::RigBackend;
pub use bridge::{Bridge, RigHandle};
pub use callbacks::{CloseCallback, HostCallbacks, OpenCallback, ReadCallback, WriteCallback};
pub use config::{BridgeConfig, DebugLevel};
pub use error::{status_of, ErrorCode, HostOp, Result, RigError};
pub use io::{HostPort, Port, ReadMode};
pub use port::{Handshake, Parity, PortSettings, FILPATHLEN};
pub use types::{Freq, Mode, ModelId, PassbandWidth, Ptt, Vfo, PASSBAND_NOCHANGE, PASSBAND_NORMAL};
