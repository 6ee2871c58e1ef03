//! Export implementations over an explicit bridge
//!
//! Every flat export is a thin wrapper that locks the process-wide bridge
//! and calls one of these. Keeping them generic over the backend lets them
//! run against local bridges as well.
//!
//! All of them share one guard: a null handle or null output pointer returns
//! the invalid-argument status before the wrapped library is involved.
//! Outputs are written only when the library call succeeds.

use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::ptr;

use libc::{c_char, c_int, c_uchar, size_t};
use rigbridge_core::{
    status_of, Bridge, BridgeConfig, DebugLevel, ErrorCode, Mode, ModelId, PassbandWidth, Port,
    Ptt, ReadMode, Result, RigBackend, RigError, RigHandle, Vfo,
};
use tracing::{debug, warn};

use crate::logging;

const UNKNOWN_MODEL: &CStr = c"Unknown";

fn invalid_argument(op: &'static str) -> c_int {
    warn!(op, "null handle or output pointer");
    RigError::InvalidArgument(op).status()
}

/// Byte count as the C return type
fn count_status(count: usize) -> c_int {
    c_int::try_from(count).unwrap_or(c_int::MAX)
}

/// Flatten a result, handing a success value to `store`
fn deliver<T>(result: Result<T>, store: impl FnOnce(T)) -> c_int {
    let status = status_of(&result);
    if let Ok(value) = result {
        store(value);
    }
    status
}

fn status(result: Result<()>) -> c_int {
    status_of(&result)
}

/// Construct a rig; null on a missing callback or library failure
pub fn rig_init<B: RigBackend>(bridge: &mut Bridge<B>, model: c_int) -> *mut RigHandle<B::Rig> {
    // Model ids are unsigned in the library; a negative id wraps and matches nothing
    match bridge.construct(model as ModelId) {
        Ok(handle) => Box::into_raw(Box::new(handle)),
        Err(e) => {
            debug!(model, error = %e, "rig init failed");
            ptr::null_mut()
        }
    }
}

/// # Safety
///
/// `rig` must be null or a live handle from [`rig_init`] on the same bridge.
pub unsafe fn rig_open<B: RigBackend>(
    bridge: &mut Bridge<B>,
    rig: *mut RigHandle<B::Rig>,
) -> c_int {
    // SAFETY: upheld by the caller
    let Some(rig) = (unsafe { rig.as_mut() }) else {
        return invalid_argument("rig_open");
    };
    status(bridge.open(rig))
}

/// # Safety
///
/// `rig` must be null or a live handle from [`rig_init`] on the same bridge.
pub unsafe fn rig_close<B: RigBackend>(
    bridge: &mut Bridge<B>,
    rig: *mut RigHandle<B::Rig>,
) -> c_int {
    // SAFETY: upheld by the caller
    let Some(rig) = (unsafe { rig.as_mut() }) else {
        return invalid_argument("rig_close");
    };
    status(bridge.close(rig))
}

/// Release a handle; it is invalid afterwards whatever the status
///
/// # Safety
///
/// `rig` must be null or a live handle from [`rig_init`] on the same bridge.
pub unsafe fn rig_cleanup<B: RigBackend>(
    bridge: &mut Bridge<B>,
    rig: *mut RigHandle<B::Rig>,
) -> c_int {
    if rig.is_null() {
        return invalid_argument("rig_cleanup");
    }
    // SAFETY: non-null and, per the caller, allocated by `rig_init`
    let handle = unsafe { Box::from_raw(rig) };
    status(bridge.cleanup(*handle))
}

/// # Safety
///
/// `rig` must be null or a live handle from [`rig_init`] on the same bridge.
pub unsafe fn set_freq<B: RigBackend>(
    bridge: &mut Bridge<B>,
    rig: *mut RigHandle<B::Rig>,
    vfo: c_int,
    freq: f64,
) -> c_int {
    // SAFETY: upheld by the caller
    let Some(rig) = (unsafe { rig.as_mut() }) else {
        return invalid_argument("rig_set_freq");
    };
    status(bridge.set_freq(rig, Vfo::from_raw(vfo), freq))
}

/// # Safety
///
/// `rig` must be null or a live handle from [`rig_init`] on the same bridge,
/// and `freq` must be null or valid for writing one `f64`.
pub unsafe fn get_freq<B: RigBackend>(
    bridge: &mut Bridge<B>,
    rig: *mut RigHandle<B::Rig>,
    vfo: c_int,
    freq: *mut f64,
) -> c_int {
    // SAFETY: upheld by the caller
    let Some(rig) = (unsafe { rig.as_mut() }) else {
        return invalid_argument("rig_get_freq");
    };
    if freq.is_null() {
        return invalid_argument("rig_get_freq");
    }
    // SAFETY: non-null and writable per the caller
    deliver(bridge.get_freq(rig, Vfo::from_raw(vfo)), |f| unsafe { freq.write(f) })
}

/// # Safety
///
/// `rig` must be null or a live handle from [`rig_init`] on the same bridge.
pub unsafe fn set_mode<B: RigBackend>(
    bridge: &mut Bridge<B>,
    rig: *mut RigHandle<B::Rig>,
    vfo: c_int,
    mode: c_int,
    width: c_int,
) -> c_int {
    // SAFETY: upheld by the caller
    let Some(rig) = (unsafe { rig.as_mut() }) else {
        return invalid_argument("rig_set_mode");
    };
    status(bridge.set_mode(
        rig,
        Vfo::from_raw(vfo),
        Mode::from_raw(mode),
        PassbandWidth::from(width),
    ))
}

/// Mode and passband are narrowed to `c_int` like a C cast
///
/// # Safety
///
/// `rig` must be null or a live handle from [`rig_init`] on the same bridge,
/// and `mode` and `width` must each be null or valid for writing one `c_int`.
pub unsafe fn get_mode<B: RigBackend>(
    bridge: &mut Bridge<B>,
    rig: *mut RigHandle<B::Rig>,
    vfo: c_int,
    mode: *mut c_int,
    width: *mut c_int,
) -> c_int {
    // SAFETY: upheld by the caller
    let Some(rig) = (unsafe { rig.as_mut() }) else {
        return invalid_argument("rig_get_mode");
    };
    if mode.is_null() || width.is_null() {
        return invalid_argument("rig_get_mode");
    }
    deliver(bridge.get_mode(rig, Vfo::from_raw(vfo)), |(m, w)| {
        // SAFETY: both non-null and writable per the caller
        unsafe {
            mode.write(m.as_raw());
            width.write(w as c_int);
        }
    })
}

/// # Safety
///
/// `rig` must be null or a live handle from [`rig_init`] on the same bridge.
pub unsafe fn set_ptt<B: RigBackend>(
    bridge: &mut Bridge<B>,
    rig: *mut RigHandle<B::Rig>,
    vfo: c_int,
    ptt: c_int,
) -> c_int {
    // SAFETY: upheld by the caller
    let Some(rig) = (unsafe { rig.as_mut() }) else {
        return invalid_argument("rig_set_ptt");
    };
    status(bridge.set_ptt(rig, Vfo::from_raw(vfo), Ptt::from_raw(ptt)))
}

/// # Safety
///
/// `rig` must be null or a live handle from [`rig_init`] on the same bridge,
/// and `ptt` must be null or valid for writing one `c_int`.
pub unsafe fn get_ptt<B: RigBackend>(
    bridge: &mut Bridge<B>,
    rig: *mut RigHandle<B::Rig>,
    vfo: c_int,
    ptt: *mut c_int,
) -> c_int {
    // SAFETY: upheld by the caller
    let Some(rig) = (unsafe { rig.as_mut() }) else {
        return invalid_argument("rig_get_ptt");
    };
    if ptt.is_null() {
        return invalid_argument("rig_get_ptt");
    }
    // SAFETY: non-null and writable per the caller
    deliver(bridge.get_ptt(rig, Vfo::from_raw(vfo)), |p| unsafe { ptt.write(p.as_raw()) })
}

/// Set path and baud for the next open; null arguments are ignored
///
/// # Safety
///
/// `rig` must be null or a live handle from [`rig_init`] on the same bridge,
/// and `path` must be null or a NUL-terminated string.
pub unsafe fn set_conf<B: RigBackend>(
    bridge: &Bridge<B>,
    rig: *mut RigHandle<B::Rig>,
    path: *const c_char,
    baud: c_int,
) {
    // SAFETY: upheld by the caller
    let Some(rig) = (unsafe { rig.as_mut() }) else {
        warn!("rig_set_conf called without a rig");
        return;
    };
    if path.is_null() {
        warn!("rig_set_conf called without a path");
        return;
    }
    // SAFETY: non-null and NUL-terminated per the caller
    let path = unsafe { CStr::from_ptr(path) }.to_string_lossy();
    bridge.set_transport_config(rig, &path, baud);
}

/// NUL-terminated model names handed out to the host
///
/// Each name is allocated once and kept for the life of the cache, so the
/// returned pointers stay valid.
#[derive(Debug, Default)]
pub struct ModelNames {
    names: HashMap<ModelId, CString>,
}

impl ModelNames {
    /// Name of `model`, or `"Unknown"`
    pub fn get<B: RigBackend>(&mut self, bridge: &Bridge<B>, model: c_int) -> *const c_char {
        let model = model as ModelId;
        if let Some(name) = self.names.get(&model) {
            return name.as_ptr();
        }

        let Some(name) = bridge.model_name(model).and_then(|n| CString::new(n).ok()) else {
            return UNKNOWN_MODEL.as_ptr();
        };
        self.names.entry(model).or_insert(name).as_ptr()
    }
}

/// Number of models the library can construct
pub fn model_count<B: RigBackend>(bridge: &mut Bridge<B>) -> c_int {
    count_status(bridge.model_count())
}

/// Model id at `index`, or the invalid-argument status
pub fn model_id<B: RigBackend>(bridge: &mut Bridge<B>, index: c_int) -> c_int {
    let Ok(index) = usize::try_from(index) else {
        return RigError::InvalidArgument("model index").status();
    };
    match bridge.model_id_at(index) {
        Ok(id) => c_int::try_from(id).unwrap_or_else(|_| RigError::UnknownModel(id).status()),
        Err(e) => e.status(),
    }
}

/// Change the diagnostic level of the bridge and the library
pub fn set_debug<B: RigBackend>(bridge: &mut Bridge<B>, level: c_int) {
    let level = DebugLevel::from_raw(level);
    logging::set_level(level);
    bridge.set_config(BridgeConfig {
        debug_level: level,
        ..bridge.config().clone()
    });
}

/// Apply a JSON configuration
///
/// # Safety
///
/// `json` must be null or a NUL-terminated string.
pub unsafe fn configure<B: RigBackend>(bridge: &mut Bridge<B>, json: *const c_char) -> c_int {
    if json.is_null() {
        return invalid_argument("bridge_configure");
    }
    // SAFETY: non-null and NUL-terminated per the caller
    let Ok(json) = (unsafe { CStr::from_ptr(json) }).to_str() else {
        return RigError::Config("configuration is not UTF-8".to_string()).status();
    };

    match BridgeConfig::from_json(json) {
        Ok(config) => {
            logging::set_level(config.debug_level);
            bridge.set_config(config);
            ErrorCode::Ok.status()
        }
        Err(e) => {
            warn!(error = %e, "rejected bridge configuration");
            e.status()
        }
    }
}

/// Write through `port`, returning the byte count or a negative status
///
/// # Safety
///
/// `buf` must be null with `count == 0`, or valid for reading `count` bytes.
pub unsafe fn write_block<P: Port + ?Sized>(
    port: &mut P,
    buf: *const c_uchar,
    count: size_t,
) -> c_int {
    let buf = if buf.is_null() {
        if count != 0 {
            return invalid_argument("write_block");
        }
        &[][..]
    } else {
        // SAFETY: upheld by the caller
        unsafe { std::slice::from_raw_parts(buf, count) }
    };

    match port.write_block(buf) {
        Ok(n) => count_status(n),
        Err(e) => e.status(),
    }
}

/// Read through `port`, returning the byte count or a negative status
///
/// # Safety
///
/// `buf` must be null with `count == 0`, or valid for writing `count` bytes.
pub unsafe fn read_block<P: Port + ?Sized>(
    port: &mut P,
    buf: *mut c_uchar,
    count: size_t,
    mode: ReadMode,
) -> c_int {
    let buf = if buf.is_null() {
        if count != 0 {
            return invalid_argument("read_block");
        }
        &mut [][..]
    } else {
        // SAFETY: upheld by the caller
        unsafe { std::slice::from_raw_parts_mut(buf, count) }
    };

    match port.read_block(buf, mode) {
        Ok(n) => count_status(n),
        Err(e) => e.status(),
    }
}
