//! Host callback registry
//!
//! The host supplies four functions that stand in for a serial port. The
//! registry only stores them; absence of a callback is detected lazily by
//! whichever I/O path needs it (see [`crate::io`]).

use std::fmt;

use crate::error::HostOp;

/// Open the host transport: `(path, baud) -> status`
pub type OpenCallback = Box<dyn FnMut(&str, i32) -> i32 + Send>;

/// Close the host transport: `() -> status`
pub type CloseCallback = Box<dyn FnMut() -> i32 + Send>;

/// Write bytes: negative on error, otherwise bytes accepted
pub type WriteCallback = Box<dyn FnMut(&[u8]) -> i32 + Send>;

/// Read bytes: negative on error, otherwise bytes read
pub type ReadCallback = Box<dyn FnMut(&mut [u8]) -> i32 + Send>;

/// Four host callback slots
#[derive(Default)]
pub struct HostCallbacks {
    pub(crate) open: Option<OpenCallback>,
    pub(crate) close: Option<CloseCallback>,
    pub(crate) write: Option<WriteCallback>,
    pub(crate) read: Option<ReadCallback>,
}

impl HostCallbacks {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all four slots
    ///
    /// Every slot is overwritten, so passing `None` clears a previously
    /// registered callback. Nothing is validated here.
    pub fn register(
        &mut self,
        open: Option<OpenCallback>,
        close: Option<CloseCallback>,
        write: Option<WriteCallback>,
        read: Option<ReadCallback>,
    ) {
        self.open = open;
        self.close = close;
        self.write = write;
        self.read = read;
        tracing::debug!(registered = ?self.registered(), "host callbacks registered");
    }

    /// Builder-style open callback
    pub fn with_open(mut self, f: impl FnMut(&str, i32) -> i32 + Send + 'static) -> Self {
        self.open = Some(Box::new(f));
        self
    }

    /// Builder-style close callback
    pub fn with_close(mut self, f: impl FnMut() -> i32 + Send + 'static) -> Self {
        self.close = Some(Box::new(f));
        self
    }

    /// Builder-style write callback
    pub fn with_write(mut self, f: impl FnMut(&[u8]) -> i32 + Send + 'static) -> Self {
        self.write = Some(Box::new(f));
        self
    }

    /// Builder-style read callback
    pub fn with_read(mut self, f: impl FnMut(&mut [u8]) -> i32 + Send + 'static) -> Self {
        self.read = Some(Box::new(f));
        self
    }

    /// Whether the slot for `op` is filled
    pub fn has(&self, op: HostOp) -> bool {
        match op {
            HostOp::Open => self.open.is_some(),
            HostOp::Close => self.close.is_some(),
            HostOp::Write => self.write.is_some(),
            HostOp::Read => self.read.is_some(),
        }
    }

    /// All four callbacks are present
    pub fn is_complete(&self) -> bool {
        HostOp::ALL.iter().all(|op| self.has(*op))
    }

    /// Operations that currently have a callback
    pub fn registered(&self) -> Vec<HostOp> {
        HostOp::ALL.into_iter().filter(|op| self.has(*op)).collect()
    }

    /// Operations that are still missing a callback
    pub fn missing(&self) -> Vec<HostOp> {
        HostOp::ALL.into_iter().filter(|op| !self.has(*op)).collect()
    }
}

impl fmt::Debug for HostCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCallbacks")
            .field("open", &self.open.is_some())
            .field("close", &self.close.is_some())
            .field("write", &self.write.is_some())
            .field("read", &self.read.is_some())
            .finish()
    }
}
