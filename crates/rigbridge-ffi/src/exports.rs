//! Flat C exports
//!
//! Each export locks the process-wide [`Library`](crate::Library) and
//! delegates to [`crate::surface`]. Handles are opaque `Rig` pointers owned
//! by the host from `wasm_rig_init` until `wasm_rig_cleanup`; passing any
//! other non-null pointer is undefined behavior. Output pointers must be
//! null or valid for one write of the pointed-to type.

#![allow(clippy::missing_safety_doc)]

use libc::{c_char, c_int, c_uchar, c_void, size_t};
use rigbridge_core::ReadMode;

use crate::callbacks::{self, CloseFn, OpenFn, ReadFn, WriteFn};
use crate::{library, memory, scope, surface, Library, Rig};

/// Register the host transport; null entries leave that slot empty
///
/// The callbacks run while the calling export holds the process-wide lock.
/// They must not call back into any `hamlib_*` or `wasm_*` export, which
/// would deadlock; see [`crate::try_library`].
#[no_mangle]
pub extern "C" fn hamlib_set_callbacks(
    open: Option<OpenFn>,
    close: Option<CloseFn>,
    write: Option<WriteFn>,
    read: Option<ReadFn>,
) {
    *library().bridge.callbacks_mut() = callbacks::from_raw(open, close, write, read);
}

/// Construct a rig for `model_id`; null if callbacks are missing or the
/// library cannot build the model
#[no_mangle]
pub extern "C" fn wasm_rig_init(model_id: c_int) -> *mut Rig {
    surface::rig_init(&mut library().bridge, model_id)
}

#[no_mangle]
pub unsafe extern "C" fn wasm_rig_open(rig: *mut Rig) -> c_int {
    surface::rig_open(&mut library().bridge, rig)
}

#[no_mangle]
pub unsafe extern "C" fn wasm_rig_close(rig: *mut Rig) -> c_int {
    surface::rig_close(&mut library().bridge, rig)
}

#[no_mangle]
pub unsafe extern "C" fn wasm_rig_cleanup(rig: *mut Rig) -> c_int {
    surface::rig_cleanup(&mut library().bridge, rig)
}

#[no_mangle]
pub unsafe extern "C" fn wasm_rig_set_freq(rig: *mut Rig, vfo: c_int, freq: f64) -> c_int {
    surface::set_freq(&mut library().bridge, rig, vfo, freq)
}

#[no_mangle]
pub unsafe extern "C" fn wasm_rig_get_freq(rig: *mut Rig, vfo: c_int, freq: *mut f64) -> c_int {
    surface::get_freq(&mut library().bridge, rig, vfo, freq)
}

#[no_mangle]
pub unsafe extern "C" fn wasm_rig_set_mode(
    rig: *mut Rig,
    vfo: c_int,
    mode: c_int,
    width: c_int,
) -> c_int {
    surface::set_mode(&mut library().bridge, rig, vfo, mode, width)
}

#[no_mangle]
pub unsafe extern "C" fn wasm_rig_get_mode(
    rig: *mut Rig,
    vfo: c_int,
    mode: *mut c_int,
    width: *mut c_int,
) -> c_int {
    surface::get_mode(&mut library().bridge, rig, vfo, mode, width)
}

#[no_mangle]
pub unsafe extern "C" fn wasm_rig_set_ptt(rig: *mut Rig, vfo: c_int, ptt: c_int) -> c_int {
    surface::set_ptt(&mut library().bridge, rig, vfo, ptt)
}

#[no_mangle]
pub unsafe extern "C" fn wasm_rig_get_ptt(rig: *mut Rig, vfo: c_int, ptt: *mut c_int) -> c_int {
    surface::get_ptt(&mut library().bridge, rig, vfo, ptt)
}

/// Set the transport path and baud used by the next `wasm_rig_open`
#[no_mangle]
pub unsafe extern "C" fn wasm_rig_set_conf(rig: *mut Rig, path: *const c_char, baud: c_int) {
    surface::set_conf(&library().bridge, rig, path, baud)
}

/// Display name of a model; the pointer stays valid for the life of the process
#[no_mangle]
pub extern "C" fn wasm_rig_get_model_name(model_id: c_int) -> *const c_char {
    let mut guard = library();
    let Library { bridge, names } = &mut *guard;
    names.get(bridge, model_id)
}

#[no_mangle]
pub extern "C" fn wasm_rig_get_model_count() -> c_int {
    surface::model_count(&mut library().bridge)
}

/// Model id at `index` in the library's enumeration order
#[no_mangle]
pub extern "C" fn wasm_rig_get_model_id(index: c_int) -> c_int {
    surface::model_id(&mut library().bridge, index)
}

/// Set the diagnostic level (0 = none .. 5 = trace)
#[no_mangle]
pub extern "C" fn wasm_rig_set_debug(level: c_int) {
    surface::set_debug(&mut library().bridge, level)
}

/// Apply a JSON bridge configuration
#[no_mangle]
pub unsafe extern "C" fn wasm_bridge_configure(json: *const c_char) -> c_int {
    surface::configure(&mut library().bridge, json)
}

/// Write through the host callbacks
///
/// Inside a library call the port serving that call is used; otherwise the
/// process-wide bridge's callbacks are. `port` is the library's own port
/// structure and is not inspected.
#[no_mangle]
pub unsafe extern "C" fn wasm_write_block_override(
    _port: *mut c_void,
    buf: *const c_uchar,
    count: size_t,
) -> c_int {
    if let Some(status) = scope::with_port(|port| surface::write_block(port, buf, count)) {
        return status;
    }
    let mut guard = library();
    surface::write_block(&mut guard.bridge.port(), buf, count)
}

/// Read through the host callbacks; see [`wasm_write_block_override`]
#[no_mangle]
pub unsafe extern "C" fn wasm_read_block_override(
    _port: *mut c_void,
    buf: *mut c_uchar,
    count: size_t,
) -> c_int {
    let mode = ReadMode::Block;
    if let Some(status) = scope::with_port(|port| surface::read_block(port, buf, count, mode)) {
        return status;
    }
    let mut guard = library();
    surface::read_block(&mut guard.bridge.port(), buf, count, mode)
}

/// Allocate one `double` output slot
#[no_mangle]
pub extern "C" fn wasm_alloc_double() -> *mut f64 {
    memory::alloc_double()
}

/// Allocate one `int` output slot
#[no_mangle]
pub extern "C" fn wasm_alloc_int() -> *mut c_int {
    memory::alloc_int()
}

/// Release a slot from `wasm_alloc_double` or `wasm_alloc_int`; null is ignored
#[no_mangle]
pub unsafe extern "C" fn wasm_free(ptr: *mut c_void) {
    memory::free(ptr)
}
