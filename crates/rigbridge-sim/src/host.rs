//! Scripted host transport
//!
//! [`MockHost`] stands in for the host environment that owns the real
//! transport. It records every open, close and write, serves queued read
//! data, and can be told to fail any callback with a chosen code. Clones
//! share state, so a test keeps one clone for inspection while the bridge
//! owns callbacks built from another.
//!
//! # Example
//!
//! ```
//! use rigbridge_core::{Bridge, HostOp};
//! use rigbridge_sim::{DummyBackend, MockHost};
//!
//! let host = MockHost::new();
//! let mut bridge = Bridge::new(DummyBackend::new());
//! *bridge.callbacks_mut() = host.callbacks();
//!
//! host.fail(HostOp::Write, -5);
//! assert_eq!(bridge.write_block(b"FA;").unwrap_err().status(), -6);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rigbridge_core::{
    CloseCallback, HostCallbacks, HostOp, OpenCallback, ReadCallback, WriteCallback,
};
use tracing::trace;

/// An `open` call as seen by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRecord {
    /// Transport path
    pub path: String,
    /// Baud rate
    pub baud: i32,
}

#[derive(Debug, Default)]
struct HostState {
    opens: Vec<OpenRecord>,
    closes: usize,
    writes: Vec<Vec<u8>>,
    reads: usize,
    /// Pending read data; a partially consumed chunk stays at the front
    read_queue: VecDeque<Vec<u8>>,
    /// Canned responses queued when a matching write arrives
    responses: VecDeque<(Vec<u8>, Vec<u8>)>,
    failures: HashMap<HostOp, i32>,
    write_limit: Option<usize>,
}

/// Shared, scripted host transport
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    state: Arc<Mutex<HostState>>,
}

impl MockHost {
    /// Create a host that accepts everything and has no data to read
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every later `op` callback return `code`
    pub fn fail(&self, op: HostOp, code: i32) {
        self.state().failures.insert(op, code);
    }

    /// Stop failing `op`
    pub fn recover(&self, op: HostOp) {
        self.state().failures.remove(&op);
    }

    /// Accept at most `limit` bytes per write
    pub fn limit_writes(&self, limit: usize) {
        self.state().write_limit = Some(limit);
    }

    /// Queue bytes for later reads
    pub fn queue_read(&self, data: &[u8]) {
        self.state().read_queue.push_back(data.to_vec());
    }

    /// Queue `response` for reading once `request` has been written
    ///
    /// Responses are matched in order; a write that does not match the next
    /// request queues nothing.
    pub fn respond(&self, request: &[u8], response: &[u8]) {
        self.state()
            .responses
            .push_back((request.to_vec(), response.to_vec()));
    }

    /// Every open call so far
    pub fn opens(&self) -> Vec<OpenRecord> {
        self.state().opens.clone()
    }

    /// Number of close calls so far
    pub fn closes(&self) -> usize {
        self.state().closes
    }

    /// Buffers passed to write calls so far, including failed ones
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state().writes.clone()
    }

    /// All written bytes, concatenated
    pub fn written(&self) -> Vec<u8> {
        self.state().writes.concat()
    }

    /// Number of read calls so far
    pub fn reads(&self) -> usize {
        self.state().reads
    }

    /// Bytes queued but not yet read
    pub fn pending_read(&self) -> usize {
        self.state().read_queue.iter().map(Vec::len).sum()
    }

    /// Total number of callback invocations of any kind
    pub fn calls(&self) -> usize {
        let state = self.state();
        state.opens.len() + state.closes + state.writes.len() + state.reads
    }

    /// Open callback bound to this host
    pub fn open_callback(&self) -> OpenCallback {
        let host = self.clone();
        Box::new(move |path: &str, baud: i32| {
            let mut state = host.state();
            state.opens.push(OpenRecord {
                path: path.to_string(),
                baud,
            });
            trace!(path, baud, "mock host open");
            state.failures.get(&HostOp::Open).copied().unwrap_or(0)
        })
    }

    /// Close callback bound to this host
    pub fn close_callback(&self) -> CloseCallback {
        let host = self.clone();
        Box::new(move || {
            let mut state = host.state();
            state.closes += 1;
            state.failures.get(&HostOp::Close).copied().unwrap_or(0)
        })
    }

    /// Write callback bound to this host
    pub fn write_callback(&self) -> WriteCallback {
        let host = self.clone();
        Box::new(move |buf: &[u8]| {
            let mut state = host.state();
            state.writes.push(buf.to_vec());
            if let Some(code) = state.failures.get(&HostOp::Write) {
                return *code;
            }

            let matches = state
                .responses
                .front()
                .is_some_and(|(request, _)| request.as_slice() == buf);
            if matches {
                if let Some((_, response)) = state.responses.pop_front() {
                    state.read_queue.push_back(response);
                }
            }

            let accepted = state.write_limit.map_or(buf.len(), |limit| buf.len().min(limit));
            trace!(requested = buf.len(), accepted, "mock host write");
            i32::try_from(accepted).unwrap_or(i32::MAX)
        })
    }

    /// Read callback bound to this host
    pub fn read_callback(&self) -> ReadCallback {
        let host = self.clone();
        Box::new(move |buf: &mut [u8]| {
            let mut state = host.state();
            state.reads += 1;
            if let Some(code) = state.failures.get(&HostOp::Read) {
                return *code;
            }

            let Some(chunk) = state.read_queue.front_mut() else {
                return 0;
            };
            let count = chunk.len().min(buf.len());
            buf[..count].copy_from_slice(&chunk[..count]);
            chunk.drain(..count);
            if chunk.is_empty() {
                state.read_queue.pop_front();
            }
            trace!(count, "mock host read");
            i32::try_from(count).unwrap_or(i32::MAX)
        })
    }

    /// All four callbacks bound to this host
    pub fn callbacks(&self) -> HostCallbacks {
        self.callbacks_for(&HostOp::ALL)
    }

    /// Callbacks for `ops` only; the other slots stay empty
    pub fn callbacks_for(&self, ops: &[HostOp]) -> HostCallbacks {
        let mut callbacks = HostCallbacks::new();
        for op in ops {
            callbacks = match op {
                HostOp::Open => callbacks.with_open(self.open_callback()),
                HostOp::Close => callbacks.with_close(self.close_callback()),
                HostOp::Write => callbacks.with_write(self.write_callback()),
                HostOp::Read => callbacks.with_read(self.read_callback()),
            };
        }
        callbacks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_open_and_close() {
        let host = MockHost::new();
        let mut open = host.open_callback();
        let mut close = host.close_callback();

        assert_eq!(open("web-serial:0", 9600), 0);
        assert_eq!(close(), 0);
        assert_eq!(
            host.opens(),
            vec![OpenRecord {
                path: "web-serial:0".to_string(),
                baud: 9600
            }]
        );
        assert_eq!(host.closes(), 1);
    }

    #[test]
    fn test_read_serves_queue_in_chunks() {
        let host = MockHost::new();
        host.queue_read(b"FA00014074000;");
        let mut read = host.read_callback();

        let mut buf = [0u8; 4];
        assert_eq!(read(&mut buf), 4);
        assert_eq!(&buf, b"FA00");
        assert_eq!(host.pending_read(), 10);

        let mut rest = [0u8; 32];
        assert_eq!(read(&mut rest), 10);
        assert_eq!(&rest[..10], b"014074000;");
        assert_eq!(read(&mut rest), 0);
    }

    #[test]
    fn test_failure_injection() {
        let host = MockHost::new();
        let mut write = host.write_callback();

        host.fail(HostOp::Write, -42);
        assert_eq!(write(b"abc"), -42);
        host.recover(HostOp::Write);
        assert_eq!(write(b"abc"), 3);
        assert_eq!(host.writes().len(), 2);
    }

    #[test]
    fn test_short_writes() {
        let host = MockHost::new();
        host.limit_writes(2);
        let mut write = host.write_callback();
        assert_eq!(write(b"abcdef"), 2);
        assert_eq!(host.written(), b"abcdef");
    }

    #[test]
    fn test_response_follows_matching_write() {
        let host = MockHost::new();
        host.respond(b"FA;", b"FA00007074000;");
        let mut write = host.write_callback();

        write(b"IF;");
        assert_eq!(host.pending_read(), 0);
        write(b"FA;");
        assert_eq!(host.pending_read(), 14);
    }

    #[test]
    fn test_callback_subsets() {
        let host = MockHost::new();
        assert!(host.callbacks().is_complete());

        let partial = host.callbacks_for(&[HostOp::Close, HostOp::Read]);
        assert_eq!(partial.missing(), vec![HostOp::Open, HostOp::Write]);
        assert_eq!(host.callbacks_for(&[]).missing().len(), 4);
    }

    #[test]
    fn test_clones_share_state() {
        let host = MockHost::new();
        let mut write = host.clone().write_callback();
        write(b"x");
        assert_eq!(host.calls(), 1);
    }
}
