//! Diagnostic logging for the exported library
//!
//! A host loading this library has no `main` to install a subscriber, so the
//! first export that needs logging installs one: a `fmt` layer on stderr
//! behind a filter whose level can be changed at runtime from the host.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use rigbridge_core::DebugLevel;
use tracing::subscriber::Interest;
use tracing::{Level, Metadata};
use tracing_subscriber::layer::{Context, Filter, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Crates that belong to this project (for filtering)
const PROJECT_CRATES: &[&str] = &["rigbridge_core", "rigbridge_sim", "rigbridge_ffi"];

/// Shared level for dynamic filtering
///
/// Stores a [`DebugLevel`] as its integer value for lock-free updates.
pub struct DebugLevelState {
    level: AtomicU8,
}

impl DebugLevelState {
    /// Create state with the given initial level
    pub fn new(level: DebugLevel) -> Self {
        Self {
            level: AtomicU8::new(level as u8),
        }
    }

    /// Update the filter level (atomic store)
    pub fn set_level(&self, level: DebugLevel) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// Current filter level (atomic load)
    pub fn level(&self) -> DebugLevel {
        DebugLevel::from_raw(i32::from(self.level.load(Ordering::Relaxed)))
    }

    /// Whether events at `level` pass the current level
    pub fn allows(&self, level: Level) -> bool {
        self.level().level_filter() >= level
    }
}

fn is_project_target(target: &str) -> bool {
    PROJECT_CRATES.iter().any(|name| target.starts_with(name))
}

/// Filter that checks project crate membership and the dynamic level
pub struct BridgeFilter {
    state: Arc<DebugLevelState>,
}

impl BridgeFilter {
    /// Create a filter over shared state
    pub fn new(state: Arc<DebugLevelState>) -> Self {
        Self { state }
    }
}

impl<S> Filter<S> for BridgeFilter {
    fn enabled(&self, meta: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        is_project_target(meta.target()) && self.state.allows(*meta.level())
    }

    fn callsite_enabled(&self, meta: &'static Metadata<'static>) -> Interest {
        if is_project_target(meta.target()) {
            // Level is dynamic, so decide per event
            Interest::sometimes()
        } else {
            Interest::never()
        }
    }
}

static STATE: OnceLock<Arc<DebugLevelState>> = OnceLock::new();

/// Install the stderr subscriber once
///
/// With `RUST_LOG` set, its directives apply as well and the runtime level
/// starts fully open; otherwise the runtime level starts at `initial`.
/// Installation quietly does nothing if the process already has a global
/// subscriber.
pub fn init(initial: DebugLevel) -> Arc<DebugLevelState> {
    STATE
        .get_or_init(|| {
            let env_filter = EnvFilter::try_from_default_env().ok();
            let level = if env_filter.is_some() {
                DebugLevel::Trace
            } else {
                initial
            };
            let state = Arc::new(DebugLevelState::new(level));

            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(BridgeFilter::new(state.clone()));

            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init();

            state
        })
        .clone()
}

/// Change the runtime level, installing the subscriber if needed
pub fn set_level(level: DebugLevel) {
    init(level).set_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_roundtrip() {
        let state = DebugLevelState::new(DebugLevel::Warn);
        assert_eq!(state.level(), DebugLevel::Warn);
        state.set_level(DebugLevel::Trace);
        assert_eq!(state.level(), DebugLevel::Trace);
    }

    #[test]
    fn test_level_gates_events() {
        let state = DebugLevelState::new(DebugLevel::Warn);
        assert!(state.allows(Level::ERROR));
        assert!(state.allows(Level::WARN));
        assert!(!state.allows(Level::DEBUG));

        state.set_level(DebugLevel::None);
        assert!(!state.allows(Level::ERROR));

        state.set_level(DebugLevel::Trace);
        assert!(state.allows(Level::TRACE));
    }

    #[test]
    fn test_project_targets() {
        assert!(is_project_target("rigbridge_core::io"));
        assert!(is_project_target("rigbridge_ffi"));
        assert!(!is_project_target("hyper::client"));
    }

    #[test]
    fn test_init_is_idempotent() {
        let first = init(DebugLevel::Err);
        let second = init(DebugLevel::Trace);
        assert!(Arc::ptr_eq(&first, &second));
    }
}
