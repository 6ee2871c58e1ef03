//! Rig Bridge C ABI
//!
//! Flat, simply-typed exports for hosts that can only call C functions, such
//! as JavaScript driving a WebAssembly build. The host registers its transport
//! with `hamlib_set_callbacks`, then constructs and drives rigs with the
//! `wasm_rig_*` functions. Every status is the wrapped library's integer code.
//!
//! All exports share one process-wide [`Library`]; the implementations in
//! [`surface`] take an explicit bridge and are usable on their own.
//!
//! By default rigs come from the simulated backend in `rigbridge-sim`. With
//! the `hamlib` feature the crate links against the Hamlib C library and
//! provides the `port_write`/`port_read_generic` symbols that library calls
//! for transport I/O.

use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError, TryLockError};

use rigbridge_core::{Bridge, BridgeConfig, RigBackend, RigHandle};
use tracing::debug;

pub mod callbacks;
pub mod exports;
#[cfg(feature = "hamlib")]
pub mod hamlib;
pub mod logging;
pub mod memory;
pub mod scope;
pub mod surface;

/// Library backing the exports
#[cfg(feature = "hamlib")]
pub type DefaultBackend = hamlib::HamlibBackend;

/// Library backing the exports
#[cfg(not(feature = "hamlib"))]
pub type DefaultBackend = rigbridge_sim::DummyBackend;

/// The handle type behind the opaque rig pointers
pub type Rig = RigHandle<<DefaultBackend as RigBackend>::Rig>;

/// Process-wide state behind the exports
pub struct Library {
    pub bridge: Bridge<DefaultBackend>,
    pub names: surface::ModelNames,
}

static LIBRARY: LazyLock<Mutex<Library>> = LazyLock::new(|| {
    let config = BridgeConfig::default();
    logging::init(config.debug_level);
    debug!(?config, "initializing rig bridge");
    Mutex::new(Library {
        bridge: Bridge::with_config(DefaultBackend::default(), config),
        names: surface::ModelNames::default(),
    })
});

/// Lock the process-wide state
///
/// A panic while the lock was held leaves the state usable, so poisoning is
/// ignored. The lock is not reentrant and every export holds it while host
/// callbacks run, so calling an export from inside a callback deadlocks.
pub fn library() -> MutexGuard<'static, Library> {
    LIBRARY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Lock the process-wide state unless it is already held
///
/// Code running inside a host callback can use this to look at the bridge
/// without deadlocking; it gets `None` while an export is in progress.
pub fn try_library() -> Option<MutexGuard<'static, Library>> {
    match LIBRARY.try_lock() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    }
}
