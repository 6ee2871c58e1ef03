//! Rig Bridge Simulation Library
//!
//! This crate provides a stand-in for both sides of the bridge so it can be
//! exercised without a radio or a browser. It includes:
//!
//! - **DummyBackend**: an in-memory rig library modelled on the wrapped
//!   library's dummy rigs
//! - **MockHost**: a scripted host transport that records callback traffic
//!   and serves canned read data
//!
//! # Example
//!
//! ```rust
//! use rigbridge_core::{Bridge, Mode, Vfo};
//! use rigbridge_sim::{DummyBackend, MockHost};
//!
//! let host = MockHost::new();
//! let mut bridge = Bridge::new(DummyBackend::new());
//! *bridge.callbacks_mut() = host.callbacks();
//!
//! let mut rig = bridge.construct(1).unwrap();
//! bridge.set_transport_config(&mut rig, "web-serial:0", 38400);
//! bridge.open(&mut rig).unwrap();
//! bridge.set_mode(&mut rig, Vfo::CURR, Mode::CW, 0).unwrap();
//!
//! assert_eq!(host.opens()[0].baud, 38400);
//! ```

pub mod dummy;
pub mod host;
pub mod models;

pub use dummy::{DummyBackend, DummyRig, SimConfig};
pub use host::{MockHost, OpenRecord};
pub use models::{SimModel, SimModelDatabase};
