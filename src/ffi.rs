//! Foreign function interface.
//!
//! Every call takes a trailing `status` slot that receives
//! [`DEINTERLACE_STATUS_OK`] or [`DEINTERLACE_STATUS_ERROR`].  On error
//! the message is available from [`deinterlace_last_error`] until the
//! next failing call on the same registry.
//!
//! Engines are addressed by the fixed handles [`DEINTERLACE_HANDLE_16`]
//! and [`DEINTERLACE_HANDLE_32`], one per sample width.  Each owns its
//! own plugins.

use std::convert::TryFrom;
use std::ffi::{CStr, CString};
use std::path::PathBuf;
use std::ptr;
use std::slice;

use libc::{c_char, c_int, c_uint, c_ulong, c_ulonglong, c_void, size_t};
use log::error;

use crate::plugin::PluginManager;
use crate::sample::frame_len;
use crate::{Algorithm, DeinterlaceError, DeinterlaceResult, Deinterlacer, Sample};

pub const DEINTERLACE_STATUS_OK: c_int = 1;
pub const DEINTERLACE_STATUS_ERROR: c_int = 2;

pub const DEINTERLACE_HANDLE_16: c_ulong = 16;
pub const DEINTERLACE_HANDLE_32: c_ulong = 32;

/// Dummy opaque structure, equivalent to Registry.
pub struct CRegistry;

/// State behind a [`CRegistry`] pointer.
pub struct Registry {
    engine16: Deinterlacer<u16>,
    engine32: Deinterlacer<u32>,
    last_error: CString,
    last_names: CString,
}

enum Engine<'a> {
    U16(&'a mut Deinterlacer<u16>),
    U32(&'a mut Deinterlacer<u32>),
}

// Expand `$body` once per sample width.
macro_rules! with_engine {
    ($engine:expr, $e:ident => $body:expr) => {
        match $engine {
            Engine::U16($e) => $body,
            Engine::U32($e) => $body,
        }
    };
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            engine16: Deinterlacer::new(),
            engine32: Deinterlacer::new(),
            last_error: CString::default(),
            last_names: CString::default(),
        }
    }

    fn engine(&mut self, handle: c_ulong) -> DeinterlaceResult<Engine<'_>> {
        match handle {
            DEINTERLACE_HANDLE_16 => Ok(Engine::U16(&mut self.engine16)),
            DEINTERLACE_HANDLE_32 => Ok(Engine::U32(&mut self.engine32)),
            _ => Err(DeinterlaceError::invalid(format!(
                "invalid engine handle {}",
                handle
            ))),
        }
    }

    fn set_error(&mut self, err: &DeinterlaceError) {
        let msg = err.to_string().replace('\0', " ");
        error!("{}", msg);
        self.last_error = CString::new(msg).unwrap_or_default();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

unsafe fn set_status(status: *mut c_int, value: c_int) {
    if !status.is_null() {
        *status = value;
    }
}

/// Run `f` against the registry, mapping its result onto `status`.
///
/// Returns `fallback` on failure.
unsafe fn with_registry<R, F>(reg: *mut CRegistry, status: *mut c_int, fallback: R, f: F) -> R
where
    F: FnOnce(&mut Registry) -> DeinterlaceResult<R>,
{
    let reg = match (reg as *mut Registry).as_mut() {
        Some(reg) => reg,
        None => {
            error!("null registry");
            set_status(status, DEINTERLACE_STATUS_ERROR);
            return fallback;
        }
    };

    match f(reg) {
        Ok(value) => {
            set_status(status, DEINTERLACE_STATUS_OK);
            value
        }
        Err(err) => {
            reg.set_error(&err);
            set_status(status, DEINTERLACE_STATUS_ERROR);
            fallback
        }
    }
}

unsafe fn frame_mut<'a, T: Sample>(
    buf: *mut c_void,
    columns: c_uint,
    rows: c_uint,
) -> DeinterlaceResult<&'a mut [T]> {
    if buf.is_null() {
        return Err(DeinterlaceError::invalid("null frame buffer"));
    }
    let len = frame_len(columns as usize, rows as usize)?;
    Ok(slice::from_raw_parts_mut(buf as *mut T, len))
}

unsafe fn arg_slice<'a>(args: *const c_uint, len: size_t) -> DeinterlaceResult<&'a [u32]> {
    if len == 0 {
        return Ok(&[]);
    }
    if args.is_null() {
        return Err(DeinterlaceError::invalid("null argument list"));
    }
    Ok(slice::from_raw_parts(args, len))
}

unsafe fn str_arg<'a>(s: *const c_char, what: &str) -> DeinterlaceResult<&'a str> {
    if s.is_null() {
        return Err(DeinterlaceError::invalid(format!("null {}", what)));
    }
    CStr::from_ptr(s)
        .to_str()
        .map_err(|_| DeinterlaceError::invalid(format!("{} is not valid UTF-8", what)))
}

/// Allocate a new registry holding one engine per sample width.
#[no_mangle]
pub unsafe extern "C" fn deinterlace_registry_new(status: *mut c_int) -> *mut CRegistry {
    set_status(status, DEINTERLACE_STATUS_OK);
    Box::into_raw(Box::new(Registry::new())) as *mut CRegistry
}

/// Free a registry, unloading all of its plugins.
#[no_mangle]
pub unsafe extern "C" fn deinterlace_registry_free(reg: *mut CRegistry) {
    if reg.is_null() {
        return;
    }

    let _reg = Box::from_raw(reg as *mut Registry);
}

/// The engine handle for a sample width of 16 or 32 bits.
#[no_mangle]
pub unsafe extern "C" fn deinterlace_get_instance(
    reg: *mut CRegistry,
    bits_per_sample: c_uint,
    status: *mut c_int,
) -> c_ulong {
    with_registry(reg, status, 0, |_| match bits_per_sample {
        16 => Ok(DEINTERLACE_HANDLE_16),
        32 => Ok(DEINTERLACE_HANDLE_32),
        _ => Err(DeinterlaceError::invalid(format!(
            "unsupported sample width {}",
            bits_per_sample
        ))),
    })
}

/// Deinterlace a frame with a built-in algorithm.
#[no_mangle]
pub unsafe extern "C" fn deinterlace_run(
    reg: *mut CRegistry,
    handle: c_ulong,
    buf: *mut c_void,
    columns: c_uint,
    rows: c_uint,
    algorithm: c_uint,
    args: *const c_uint,
    args_len: size_t,
    status: *mut c_int,
) {
    with_registry(reg, status, (), |r| {
        let algorithm = Algorithm::try_from(algorithm)?;
        let args = arg_slice(args, args_len)?;
        let (w, h) = (columns as usize, rows as usize);

        with_engine!(r.engine(handle)?, e => {
            e.run(frame_mut(buf, columns, rows)?, w, h, algorithm, args)
        })
    })
}

/// Deinterlace a frame with a plugin algorithm.
#[no_mangle]
pub unsafe extern "C" fn deinterlace_run_custom(
    reg: *mut CRegistry,
    handle: c_ulong,
    buf: *mut c_void,
    columns: c_uint,
    rows: c_uint,
    algorithm: *const c_char,
    args: *const c_uint,
    args_len: size_t,
    status: *mut c_int,
) {
    with_registry(reg, status, (), |r| {
        let algorithm = str_arg(algorithm, "algorithm name")?;
        let args = arg_slice(args, args_len)?;
        let (w, h) = (columns as usize, rows as usize);

        with_engine!(r.engine(handle)?, e => {
            e.run_custom(frame_mut(buf, columns, rows)?, w, h, algorithm, args)
        })
    })
}

/// Load the plugins in `dir` into one engine.
///
/// A null `dir` uses `DEINTERLACE_PLUGIN_DIR`.  Returns 1 if the engine
/// has any plugin loaded afterwards, 0 otherwise.
#[no_mangle]
pub unsafe extern "C" fn deinterlace_find_plugins(
    reg: *mut CRegistry,
    handle: c_ulong,
    dir: *const c_char,
    status: *mut c_int,
) -> c_int {
    with_registry(reg, status, 0, |r| {
        let dir = if dir.is_null() {
            PluginManager::default_dir().ok_or_else(|| {
                DeinterlaceError::invalid("no plugin directory given and DEINTERLACE_PLUGIN_DIR is unset")
            })?
        } else {
            PathBuf::from(str_arg(dir, "plugin directory")?)
        };

        let loaded = with_engine!(r.engine(handle)?, e => e.find_plugins(&dir)?);
        Ok(loaded as c_int)
    })
}

/// Number of plugins loaded into one engine.
#[no_mangle]
pub unsafe extern "C" fn deinterlace_plugin_count(
    reg: *mut CRegistry,
    handle: c_ulong,
    status: *mut c_int,
) -> c_uint {
    with_registry(reg, status, 0, |r| {
        let count = with_engine!(r.engine(handle)?, e => e.plugins().count());
        Ok(count as c_uint)
    })
}

/// Number of algorithms advertised by a plugin, or 0 if none are loaded.
#[no_mangle]
pub unsafe extern "C" fn deinterlace_plugin_name_count(
    reg: *mut CRegistry,
    handle: c_ulong,
    index: c_uint,
    status: *mut c_int,
) -> c_uint {
    with_registry(reg, status, 0, |r| {
        let count = with_engine!(r.engine(handle)?, e => {
            e.plugins().plugin(index as usize)?.map_or(0, |p| p.count())
        });
        Ok(count as c_uint)
    })
}

/// Comma-separated algorithm names advertised by a plugin.
///
/// The string stays valid until the next call of this function on the
/// same registry.
#[no_mangle]
pub unsafe extern "C" fn deinterlace_plugin_name_list(
    reg: *mut CRegistry,
    handle: c_ulong,
    index: c_uint,
    status: *mut c_int,
) -> *const c_char {
    with_registry(reg, status, ptr::null(), |r| {
        let names = with_engine!(r.engine(handle)?, e => {
            e.plugins()
                .plugin(index as usize)?
                .map(|p| p.name_list().to_string())
                .unwrap_or_default()
        });

        r.last_names = CString::new(names)
            .map_err(|_| DeinterlaceError::invalid("plugin name contains a NUL byte"))?;
        Ok(r.last_names.as_ptr())
    })
}

/// Exclusive upper bound of sample values for one engine.
#[no_mangle]
pub unsafe extern "C" fn deinterlace_max_value(
    reg: *mut CRegistry,
    handle: c_ulong,
    status: *mut c_int,
) -> c_ulonglong {
    with_registry(reg, status, 0, |r| {
        let max = with_engine!(r.engine(handle)?, e => e.max_value());
        Ok(max as c_ulonglong)
    })
}

/// The message of the last failed call, or null for a null registry.
#[no_mangle]
pub unsafe extern "C" fn deinterlace_last_error(reg: *mut CRegistry) -> *const c_char {
    match (reg as *mut Registry).as_ref() {
        Some(reg) => reg.last_error.as_ptr(),
        None => ptr::null(),
    }
}
