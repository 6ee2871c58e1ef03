//! Transport I/O routed through host callbacks
//!
//! [`Port`] is the seam a rig backend performs all transport I/O through.
//! [`HostPort`] is the implementation that forwards to the registered host
//! callbacks, applying one policy to every operation:
//!
//! - missing callback: configuration error
//! - negative callback result: I/O error carrying the host's code
//! - otherwise: the callback's value, unchanged
//!
//! There is no retry, no short-write looping and no buffering here.

use tracing::{debug, error, trace, warn};

use crate::callbacks::HostCallbacks;
use crate::error::{HostOp, Result, RigError};
use crate::port::PortSettings;

/// Which read entry point the wrapped library used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReadMode {
    /// Generic byte-oriented read
    #[default]
    Block,
    /// Direct read that bypasses the library's own buffering
    Direct,
}

impl ReadMode {
    /// Map the library's `direct` flag
    pub fn from_direct_flag(direct: i32) -> Self {
        if direct != 0 {
            Self::Direct
        } else {
            Self::Block
        }
    }
}

/// Transport operations available to a rig backend
pub trait Port {
    /// Open the transport with the handle's settings
    fn open(&mut self, settings: &PortSettings) -> Result<()>;

    /// Close the transport
    fn close(&mut self) -> Result<()>;

    /// Write `buf`, returning the number of bytes accepted
    ///
    /// A short count is reported as-is.
    fn write_block(&mut self, buf: &[u8]) -> Result<usize>;

    /// Read into `buf`, returning the number of bytes read
    ///
    /// Zero means no data was available before the host gave up.
    fn read_block(&mut self, buf: &mut [u8], mode: ReadMode) -> Result<usize>;
}

/// [`Port`] backed by host callbacks
pub struct HostPort<'a> {
    callbacks: &'a mut HostCallbacks,
}

impl<'a> HostPort<'a> {
    /// Route I/O through `callbacks`
    pub fn new(callbacks: &'a mut HostCallbacks) -> Self {
        Self { callbacks }
    }

    /// Generic read entry point
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.read_with_mode(buf, ReadMode::Block)
    }

    /// Direct read entry point
    pub fn read_direct(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.read_with_mode(buf, ReadMode::Direct)
    }

    fn read_with_mode(&mut self, buf: &mut [u8], mode: ReadMode) -> Result<usize> {
        trace!(?mode, max = buf.len(), "reading via host callback");

        let Some(read) = self.callbacks.read.as_mut() else {
            error!(?mode, "host read callback not set");
            return Err(RigError::missing_callback(HostOp::Read));
        };

        let result = read(buf);
        let count = check_transfer(HostOp::Read, result, buf.len())?;
        debug!(?mode, count, "read via host callback");
        Ok(count)
    }
}

/// Apply the shared result policy to a host transfer callback
///
/// A count larger than the buffer cannot be honest and is treated as a
/// host failure.
fn check_transfer(op: HostOp, result: i32, capacity: usize) -> Result<usize> {
    let Ok(count) = usize::try_from(result) else {
        error!(%op, code = result, "host callback failed");
        return Err(RigError::HostIo { op, code: result });
    };
    if count > capacity {
        error!(%op, count, capacity, "host callback overran the buffer");
        return Err(RigError::HostIo { op, code: result });
    }
    Ok(count)
}

/// Apply the shared result policy to a host open/close callback
fn check_status(op: HostOp, result: i32) -> Result<()> {
    if result < 0 {
        warn!(%op, code = result, "host callback failed");
        return Err(RigError::HostIo { op, code: result });
    }
    Ok(())
}

impl Port for HostPort<'_> {
    fn open(&mut self, settings: &PortSettings) -> Result<()> {
        let path = settings.pathname();
        debug!(%path, baud = settings.rate, "opening host transport");

        let Some(open) = self.callbacks.open.as_mut() else {
            error!("host open callback not set");
            return Err(RigError::missing_callback(HostOp::Open));
        };

        check_status(HostOp::Open, open(&*path, settings.rate))
    }

    fn close(&mut self) -> Result<()> {
        debug!("closing host transport");

        let Some(close) = self.callbacks.close.as_mut() else {
            error!("host close callback not set");
            return Err(RigError::missing_callback(HostOp::Close));
        };

        check_status(HostOp::Close, close())
    }

    fn write_block(&mut self, buf: &[u8]) -> Result<usize> {
        trace!(count = buf.len(), "writing via host callback");

        let Some(write) = self.callbacks.write.as_mut() else {
            error!("host write callback not set");
            return Err(RigError::missing_callback(HostOp::Write));
        };

        let result = write(buf);
        let count = check_transfer(HostOp::Write, result, buf.len())?;
        debug!(requested = buf.len(), accepted = count, "wrote via host callback");
        Ok(count)
    }

    fn read_block(&mut self, buf: &mut [u8], mode: ReadMode) -> Result<usize> {
        self.read_with_mode(buf, mode)
    }
}
