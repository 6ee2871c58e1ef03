//! Active port for library-initiated I/O
//!
//! The wrapped C library performs transport I/O by calling link-time symbols
//! with no reference to the bridge that started the operation. While a
//! bridge call is inside the library, the [`Port`] it was handed is parked
//! here so those symbols can reach the right host callbacks without taking
//! the bridge lock a second time.

use std::cell::Cell;
use std::ptr::NonNull;

use rigbridge_core::Port;

thread_local! {
    static ACTIVE: Cell<Option<NonNull<dyn Port + 'static>>> = const { Cell::new(None) };
}

/// Restores the previous slot value when dropped, including on unwind
struct Restore(Option<NonNull<dyn Port + 'static>>);

impl Drop for Restore {
    fn drop(&mut self) {
        ACTIVE.with(|slot| slot.set(self.0.take()));
    }
}

/// Run `f` with `port` as this thread's active port
pub fn with_active_port<R>(port: &mut dyn Port, f: impl FnOnce() -> R) -> R {
    let ptr: NonNull<dyn Port + '_> = NonNull::from(port);
    // SAFETY: only the lifetime bound is erased. The pointer is reachable
    // only until `_restore` drops at the end of this function, and `port`
    // stays mutably borrowed until then.
    let ptr: NonNull<dyn Port + 'static> = unsafe { std::mem::transmute(ptr) };

    let previous = ACTIVE.with(|slot| slot.replace(Some(ptr)));
    let _restore = Restore(previous);
    f()
}

/// Run `f` against the active port, if any
///
/// The slot is emptied while `f` runs, so a nested lookup from inside `f`
/// finds no port instead of aliasing it.
pub fn with_port<R>(f: impl FnOnce(&mut dyn Port) -> R) -> Option<R> {
    let mut ptr = ACTIVE.with(Cell::take)?;
    let _restore = Restore(Some(ptr));
    // SAFETY: the pointer was installed by `with_active_port`, whose borrow
    // is still live, and it was taken out of the slot so no other reference
    // to the port exists during `f`.
    let port = unsafe { ptr.as_mut() };
    Some(f(port))
}

/// Whether this thread currently has an active port
pub fn is_active() -> bool {
    ACTIVE.with(|slot| slot.get().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigbridge_core::{PortSettings, ReadMode, Result};

    #[derive(Default)]
    struct CountingPort {
        writes: usize,
    }

    impl Port for CountingPort {
        fn open(&mut self, _: &PortSettings) -> Result<()> {
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }

        fn write_block(&mut self, buf: &[u8]) -> Result<usize> {
            self.writes += 1;
            Ok(buf.len())
        }

        fn read_block(&mut self, _: &mut [u8], _: ReadMode) -> Result<usize> {
            Ok(0)
        }
    }

    #[test]
    fn test_no_port_outside_scope() {
        assert!(!is_active());
        assert!(with_port(|port| port.write_block(b"x")).is_none());
    }

    #[test]
    fn test_port_reachable_inside_scope() {
        let mut port = CountingPort::default();
        let written = with_active_port(&mut port, || {
            assert!(is_active());
            with_port(|p| p.write_block(b"FA;"))
        });
        assert_eq!(written, Some(Ok(3)));
        assert_eq!(port.writes, 1);
        assert!(!is_active());
    }

    #[test]
    fn test_nested_lookup_sees_no_port() {
        let mut port = CountingPort::default();
        with_active_port(&mut port, || {
            let inner = with_port(|_| with_port(|_| ()));
            assert_eq!(inner, Some(None));
            // Restored after the outer lookup returns
            assert!(is_active());
        });
    }

    #[test]
    fn test_scopes_nest() {
        let mut outer = CountingPort::default();
        let mut inner = CountingPort::default();
        with_active_port(&mut outer, || {
            with_active_port(&mut inner, || with_port(|p| p.write_block(b"a")));
            with_port(|p| p.write_block(b"b"));
        });
        assert_eq!(outer.writes, 1);
        assert_eq!(inner.writes, 1);
    }
}
