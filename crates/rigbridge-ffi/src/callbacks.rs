//! C function pointers supplied by the host
//!
//! The host registers plain `extern "C"` functions. Each one is wrapped in a
//! closure of the matching [`rigbridge_core::callbacks`] type so the rest of
//! the bridge never sees a raw pointer.

use std::ffi::CString;

use libc::{c_char, c_int, c_uchar, size_t};
use rigbridge_core::{CloseCallback, HostCallbacks, OpenCallback, ReadCallback, WriteCallback};

/// `int open(const char *pathname, int baud_rate)`
pub type OpenFn = unsafe extern "C" fn(pathname: *const c_char, baud_rate: c_int) -> c_int;
/// `int close(void)`
pub type CloseFn = unsafe extern "C" fn() -> c_int;
/// `int write(const unsigned char *buffer, size_t count)`
pub type WriteFn = unsafe extern "C" fn(buffer: *const c_uchar, count: size_t) -> c_int;
/// `int read(unsigned char *buffer, size_t max_count)`
pub type ReadFn = unsafe extern "C" fn(buffer: *mut c_uchar, max_count: size_t) -> c_int;

/// Wrap a host open function
pub fn wrap_open(open: OpenFn) -> OpenCallback {
    Box::new(move |path: &str, baud: i32| {
        // Paths come from a NUL-terminated field, so an interior NUL cannot occur
        let path = CString::new(path).unwrap_or_default();
        // SAFETY: the host registered `open` for exactly this signature and
        // `path` outlives the call
        unsafe { open(path.as_ptr(), baud) }
    })
}

/// Wrap a host close function
pub fn wrap_close(close: CloseFn) -> CloseCallback {
    // SAFETY: the host registered `close` for exactly this signature
    Box::new(move || unsafe { close() })
}

/// Wrap a host write function
///
/// The host receives the caller's buffer pointer and length unchanged.
pub fn wrap_write(write: WriteFn) -> WriteCallback {
    // SAFETY: `buf` is a live slice for the duration of the call
    Box::new(move |buf: &[u8]| unsafe { write(buf.as_ptr(), buf.len()) })
}

/// Wrap a host read function
pub fn wrap_read(read: ReadFn) -> ReadCallback {
    // SAFETY: `buf` is a live, writable slice for the duration of the call
    Box::new(move |buf: &mut [u8]| unsafe { read(buf.as_mut_ptr(), buf.len()) })
}

/// Build a full registration from nullable host function pointers
pub fn from_raw(
    open: Option<OpenFn>,
    close: Option<CloseFn>,
    write: Option<WriteFn>,
    read: Option<ReadFn>,
) -> HostCallbacks {
    let mut callbacks = HostCallbacks::new();
    callbacks.register(
        open.map(wrap_open),
        close.map(wrap_close),
        write.map(wrap_write),
        read.map(wrap_read),
    );
    callbacks
}
