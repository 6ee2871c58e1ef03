//! Hamlib as the wrapped library
//!
//! Hamlib performs transport I/O through its internal `port_write` and
//! `port_read_generic`. This module defines both symbols so that, when the
//! crate is linked in place of Hamlib's `iofunc.c`, every byte goes through
//! the host callbacks. Each Hamlib call that may do I/O runs inside
//! [`scope::with_active_port`], which is how the overrides find the port of
//! the bridge that made the call.
//!
//! Transport settings are handed to Hamlib through its configuration token
//! API rather than by writing into `struct rig_state`.

use std::collections::HashSet;
use std::ffi::{CStr, CString};
use std::ptr::NonNull;

use libc::{c_char, c_int, c_long, c_uint, c_void, size_t, ssize_t};
use rigbridge_core::{
    BridgeConfig, Freq, Mode, ModelId, PassbandWidth, Port, PortSettings, Ptt,
    ReadMode, Result, RigBackend, RigError, Vfo,
};
use tracing::{debug, error, trace, warn};

use crate::scope;

/// Opaque `RIG`
#[repr(C)]
pub struct RawRig {
    _private: [u8; 0],
}

/// Leading fields of `struct rig_caps`, which are stable across Hamlib 4.x
#[repr(C)]
pub struct RigCapsHead {
    pub rig_model: c_uint,
    pub model_name: *const c_char,
    pub mfg_name: *const c_char,
}

type ListCallback = unsafe extern "C" fn(caps: *const RigCapsHead, data: *mut c_void) -> c_int;

#[link(name = "hamlib")]
extern "C" {
    fn rig_init(model: c_uint) -> *mut RawRig;
    fn rig_open(rig: *mut RawRig) -> c_int;
    fn rig_close(rig: *mut RawRig) -> c_int;
    fn rig_cleanup(rig: *mut RawRig) -> c_int;
    fn rig_set_freq(rig: *mut RawRig, vfo: c_uint, freq: f64) -> c_int;
    fn rig_get_freq(rig: *mut RawRig, vfo: c_uint, freq: *mut f64) -> c_int;
    fn rig_set_mode(rig: *mut RawRig, vfo: c_uint, mode: u64, width: c_long) -> c_int;
    fn rig_get_mode(rig: *mut RawRig, vfo: c_uint, mode: *mut u64, width: *mut c_long) -> c_int;
    fn rig_set_ptt(rig: *mut RawRig, vfo: c_uint, ptt: c_int) -> c_int;
    fn rig_get_ptt(rig: *mut RawRig, vfo: c_uint, ptt: *mut c_int) -> c_int;
    fn rig_get_caps(model: c_uint) -> *const RigCapsHead;
    fn rig_list_foreach(cfunc: ListCallback, data: *mut c_void) -> c_int;
    fn rig_load_all_backends() -> c_int;
    fn rig_token_lookup(rig: *mut RawRig, name: *const c_char) -> c_long;
    fn rig_set_conf(rig: *mut RawRig, token: c_long, val: *const c_char) -> c_int;
    fn rig_set_debug(level: c_int);
}

/// `RIG_CONF_END`, returned by `rig_token_lookup` for an unknown name
const TOKEN_NOT_FOUND: c_long = 0;

/// A rig constructed by Hamlib
#[derive(Debug)]
pub struct HamlibRig {
    raw: NonNull<RawRig>,
}

impl HamlibRig {
    fn as_ptr(&self) -> *mut RawRig {
        self.raw.as_ptr()
    }

    /// Set one configuration token by name
    fn set_conf(&mut self, name: &CStr, value: &str) -> Result<()> {
        let value = CString::new(value)
            .map_err(|_| RigError::Config(format!("{name:?} value contains NUL")))?;
        // SAFETY: live handle and NUL-terminated strings
        let token = unsafe { rig_token_lookup(self.as_ptr(), name.as_ptr()) };
        if token == TOKEN_NOT_FOUND {
            return Err(RigError::Config(format!("unknown token {name:?}")));
        }
        trace!(?name, value = ?value, "rig_set_conf");
        // SAFETY: live handle, token from the lookup above
        RigError::check(unsafe { rig_set_conf(self.as_ptr(), token, value.as_ptr()) })
    }

    /// Hand `settings` to Hamlib's port configuration
    fn apply_settings(&mut self, settings: &PortSettings) -> Result<()> {
        self.set_conf(c"rig_pathname", &settings.pathname())?;
        self.set_conf(c"serial_speed", &settings.rate.to_string())?;
        self.set_conf(c"data_bits", &settings.data_bits.to_string())?;
        self.set_conf(c"stop_bits", &settings.stop_bits.to_string())?;
        self.set_conf(c"serial_parity", settings.parity.name())?;
        self.set_conf(c"serial_handshake", settings.handshake.name())
    }
}

/// Run a Hamlib call with `port` as the transport
fn call(port: &mut dyn Port, f: impl FnOnce() -> c_int) -> Result<()> {
    RigError::check(scope::with_active_port(port, f))
}

/// [`RigBackend`] over the Hamlib C library
#[derive(Debug)]
pub struct HamlibBackend {
    load_all: bool,
    backends_loaded: bool,
}

impl HamlibBackend {
    /// Create a backend that loads every rig backend before enumerating
    pub fn new() -> Self {
        Self {
            load_all: true,
            backends_loaded: false,
        }
    }

    fn ensure_backends(&mut self) {
        if self.load_all && !self.backends_loaded {
            // SAFETY: no preconditions
            let status = unsafe { rig_load_all_backends() };
            if status < 0 {
                warn!(status, "failed to load all rig backends");
            }
            self.backends_loaded = true;
        }
    }
}

impl Default for HamlibBackend {
    fn default() -> Self {
        Self::new()
    }
}

unsafe extern "C" fn collect_model(caps: *const RigCapsHead, data: *mut c_void) -> c_int {
    // SAFETY: `data` is the Vec passed to rig_list_foreach in `models`
    let models = unsafe { &mut *data.cast::<Vec<ModelId>>() };
    // SAFETY: Hamlib passes a valid caps pointer or null
    if let Some(caps) = unsafe { caps.as_ref() } {
        models.push(caps.rig_model);
    }
    // Non-zero continues the iteration
    1
}

impl RigBackend for HamlibBackend {
    type Rig = HamlibRig;

    fn init(&mut self, model: ModelId) -> Option<HamlibRig> {
        self.ensure_backends();
        // SAFETY: no preconditions; null signals failure
        let raw = NonNull::new(unsafe { rig_init(model) });
        if raw.is_none() {
            error!(model, "rig_init failed");
        }
        raw.map(|raw| HamlibRig { raw })
    }

    fn open(
        &mut self,
        rig: &mut HamlibRig,
        settings: &PortSettings,
        port: &mut dyn Port,
    ) -> Result<()> {
        rig.apply_settings(settings)?;
        port.open(settings)?;

        let raw = rig.as_ptr();
        // SAFETY: live handle
        let result = call(port, || unsafe { rig_open(raw) });
        if result.is_err() {
            if let Err(e) = port.close() {
                warn!(error = %e, "host close after failed open");
            }
        }
        result
    }

    fn close(&mut self, rig: &mut HamlibRig, port: &mut dyn Port) -> Result<()> {
        let raw = rig.as_ptr();
        // SAFETY: live handle
        call(port, || unsafe { rig_close(raw) })?;
        port.close()
    }

    fn cleanup(&mut self, rig: HamlibRig) -> Result<()> {
        // SAFETY: live handle, consumed here
        RigError::check(unsafe { rig_cleanup(rig.as_ptr()) })
    }

    fn set_freq(
        &mut self,
        rig: &mut HamlibRig,
        vfo: Vfo,
        freq: Freq,
        port: &mut dyn Port,
    ) -> Result<()> {
        let raw = rig.as_ptr();
        // SAFETY: live handle
        call(port, || unsafe { rig_set_freq(raw, vfo.0, freq) })
    }

    fn get_freq(&mut self, rig: &mut HamlibRig, vfo: Vfo, port: &mut dyn Port) -> Result<Freq> {
        let raw = rig.as_ptr();
        let mut freq = 0.0;
        // SAFETY: live handle and a local out-parameter
        call(port, || unsafe { rig_get_freq(raw, vfo.0, &mut freq) })?;
        Ok(freq)
    }

    fn set_mode(
        &mut self,
        rig: &mut HamlibRig,
        vfo: Vfo,
        mode: Mode,
        width: PassbandWidth,
        port: &mut dyn Port,
    ) -> Result<()> {
        let raw = rig.as_ptr();
        let width = c_long::try_from(width)
            .map_err(|_| RigError::InvalidArgument("passband width out of range"))?;
        // SAFETY: live handle
        call(port, || unsafe { rig_set_mode(raw, vfo.0, mode.0, width) })
    }

    fn get_mode(
        &mut self,
        rig: &mut HamlibRig,
        vfo: Vfo,
        port: &mut dyn Port,
    ) -> Result<(Mode, PassbandWidth)> {
        let raw = rig.as_ptr();
        let mut mode = 0u64;
        let mut width: c_long = 0;
        // SAFETY: live handle and local out-parameters
        call(port, || unsafe { rig_get_mode(raw, vfo.0, &mut mode, &mut width) })?;
        Ok((Mode(mode), PassbandWidth::from(width)))
    }

    fn set_ptt(
        &mut self,
        rig: &mut HamlibRig,
        vfo: Vfo,
        ptt: Ptt,
        port: &mut dyn Port,
    ) -> Result<()> {
        let raw = rig.as_ptr();
        // SAFETY: live handle
        call(port, || unsafe { rig_set_ptt(raw, vfo.0, ptt.as_raw()) })
    }

    fn get_ptt(&mut self, rig: &mut HamlibRig, vfo: Vfo, port: &mut dyn Port) -> Result<Ptt> {
        let raw = rig.as_ptr();
        let mut ptt: c_int = 0;
        // SAFETY: live handle and a local out-parameter
        call(port, || unsafe { rig_get_ptt(raw, vfo.0, &mut ptt) })?;
        Ok(Ptt::from_raw(ptt))
    }

    fn model_name(&self, model: ModelId) -> Option<&'static str> {
        // SAFETY: caps are static data owned by Hamlib
        let caps = unsafe { rig_get_caps(model).as_ref() }?;
        if caps.model_name.is_null() {
            return None;
        }
        // SAFETY: non-null static NUL-terminated string
        unsafe { CStr::from_ptr(caps.model_name) }.to_str().ok()
    }

    fn models(&mut self) -> Vec<ModelId> {
        self.ensure_backends();
        let mut models: Vec<ModelId> = Vec::new();
        // SAFETY: `collect_model` only touches `models`, which outlives the call
        let status = unsafe {
            rig_list_foreach(collect_model, (&mut models as *mut Vec<ModelId>).cast())
        };
        if status < 0 {
            warn!(status, "rig_list_foreach failed");
        }
        // Hamlib's registry is a hash table; report each model once in id order
        let mut seen = HashSet::new();
        models.retain(|m| seen.insert(*m));
        models.sort_unstable();
        models
    }

    fn configure(&mut self, config: &BridgeConfig) {
        self.load_all = config.load_all_backends;
        // SAFETY: no preconditions
        unsafe { rig_set_debug(config.debug_level as c_int) };
        debug!(?config, "configured hamlib backend");
    }
}

/// Write override used by Hamlib's `write_block`
///
/// Returns the byte count, or -1 on any failure.
#[no_mangle]
pub unsafe extern "C" fn port_write(
    _p: *mut c_void,
    buf: *const c_void,
    count: size_t,
) -> ssize_t {
    let buf: &[u8] = if count == 0 {
        &[]
    } else if buf.is_null() {
        return -1;
    } else {
        // SAFETY: Hamlib passes a buffer of `count` bytes
        unsafe { std::slice::from_raw_parts(buf.cast(), count) }
    };

    match scope::with_port(|port| port.write_block(buf)) {
        Some(Ok(n)) => ssize_t::try_from(n).unwrap_or(ssize_t::MAX),
        Some(Err(e)) => {
            debug!(error = %e, "port_write failed");
            -1
        }
        None => {
            error!("port_write outside a bridge call");
            -1
        }
    }
}

/// Read override used by Hamlib's read paths
///
/// Returns the byte count, or -1 on any failure.
#[no_mangle]
pub unsafe extern "C" fn port_read_generic(
    _p: *mut c_void,
    buf: *mut c_void,
    count: size_t,
    direct: c_int,
) -> ssize_t {
    let buf: &mut [u8] = if count == 0 {
        &mut []
    } else if buf.is_null() {
        return -1;
    } else {
        // SAFETY: Hamlib passes a writable buffer of `count` bytes
        unsafe { std::slice::from_raw_parts_mut(buf.cast(), count) }
    };
    let mode = ReadMode::from_direct_flag(direct);

    match scope::with_port(|port| port.read_block(buf, mode)) {
        Some(Ok(n)) => ssize_t::try_from(n).unwrap_or(ssize_t::MAX),
        Some(Err(e)) => {
            debug!(error = %e, ?mode, "port_read_generic failed");
            -1
        }
        None => {
            error!("port_read_generic outside a bridge call");
            -1
        }
    }
}
