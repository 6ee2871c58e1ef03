//! Scratch storage for hosts without direct memory access
//!
//! A JavaScript host cannot take the address of a local, so it allocates
//! output slots here, passes them to the get-style exports and frees them
//! afterwards. Allocation goes through the C allocator so the host may also
//! release the slots with its own `free`.

use std::mem::size_of;

use libc::{c_int, c_void};

/// Allocate one uninitialized `f64` slot; null if the allocator fails
pub fn alloc_double() -> *mut f64 {
    // SAFETY: malloc has no preconditions; a null result is passed through
    unsafe { libc::malloc(size_of::<f64>()).cast() }
}

/// Allocate one uninitialized `c_int` slot; null if the allocator fails
pub fn alloc_int() -> *mut c_int {
    // SAFETY: malloc has no preconditions; a null result is passed through
    unsafe { libc::malloc(size_of::<c_int>()).cast() }
}

/// Release a slot from [`alloc_double`] or [`alloc_int`]
///
/// # Safety
///
/// `ptr` must be null or a pointer obtained from the C allocator that has
/// not been freed yet.
pub unsafe fn free(ptr: *mut c_void) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: upheld by the caller
    unsafe { libc::free(ptr) }
}
