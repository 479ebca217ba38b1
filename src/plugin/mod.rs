//! Externally supplied deinterlace algorithms.
//!
//! A plugin is a shared library exporting two C entry points:
//!
//! - [`CREATE_SYMBOL`]: returns a new provider instance as an opaque
//!   pointer, built with [`plugin_into_raw`].
//! - [`DESTROY_SYMBOL`]: releases an instance returned by the former.
//!
//! Providers implement [`DeinterlacePlugin`].  The [`declare_plugin!`]
//! macro emits both entry points for a provider type.
//!
//! Instances cross the library boundary as Rust trait objects, so a
//! plugin must be built with the same compiler and the same version of
//! this crate as the host.
//!
//! [`declare_plugin!`]: crate::declare_plugin

use std::ffi::c_void;

use crate::DeinterlaceResult;

pub use self::manager::{PluginManager, PLUGIN_DIR_ENV};
pub use self::names::NameList;

mod manager;
mod names;

/// Name of the exported factory entry point.
pub const CREATE_SYMBOL: &str = "deinterlace_plugin_create";

/// Name of the exported destructor entry point.
pub const DESTROY_SYMBOL: &str = "deinterlace_plugin_destroy";

/// Signature of [`CREATE_SYMBOL`].
pub type CreateFn = unsafe extern "C" fn() -> *mut c_void;

/// Signature of [`DESTROY_SYMBOL`].
pub type DestroyFn = unsafe extern "C" fn(*mut c_void);

/// Mutable frame handed to a plugin, tagged with its sample width.
#[derive(Debug)]
pub enum SampleBufMut<'a> {
    U16(&'a mut [u16]),
    U32(&'a mut [u32]),
}

impl<'a> SampleBufMut<'a> {
    pub fn bits_per_sample(&self) -> u32 {
        match self {
            SampleBufMut::U16(_) => 16,
            SampleBufMut::U32(_) => 32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SampleBufMut::U16(buf) => buf.len(),
            SampleBufMut::U32(buf) => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Contract implemented by every plugin provider.
pub trait DeinterlacePlugin: Send {
    /// Reorder `buf` in place using the named algorithm.
    ///
    /// `arg` is the first algorithm argument given to the engine, or 0.
    /// Fails if `algorithm` is not one of this provider's names or the
    /// geometry is invalid for it.
    fn run(
        &self,
        buf: SampleBufMut<'_>,
        columns: usize,
        rows: usize,
        algorithm: &str,
        arg: u32,
    ) -> DeinterlaceResult<()>;

    /// Algorithm names supported by this provider.
    ///
    /// Must return the same list on every call.
    fn name_list(&self) -> &NameList;

    fn count(&self) -> usize {
        self.name_list().len()
    }
}

/// Convert a provider into the opaque pointer returned by [`CREATE_SYMBOL`].
pub fn plugin_into_raw(plugin: Box<dyn DeinterlacePlugin>) -> *mut c_void {
    Box::into_raw(Box::new(plugin)) as *mut c_void
}

/// Take back ownership of a provider.
///
/// # Safety
///
/// `ptr` must come from [`plugin_into_raw`] and must not be used afterwards.
pub unsafe fn plugin_from_raw(ptr: *mut c_void) -> Box<dyn DeinterlacePlugin> {
    *Box::from_raw(ptr as *mut Box<dyn DeinterlacePlugin>)
}

/// Borrow a provider behind an opaque pointer.
///
/// # Safety
///
/// `ptr` must come from [`plugin_into_raw`] and outlive `'a`.
unsafe fn plugin_ref<'a>(ptr: *mut c_void) -> &'a dyn DeinterlacePlugin {
    &**(ptr as *const Box<dyn DeinterlacePlugin>)
}

/// Export the plugin entry points for a provider type.
///
/// # Example
///
/// ```ignore
/// deinterlace::declare_plugin!(FlipPlugin, FlipPlugin::new);
/// ```
#[macro_export]
macro_rules! declare_plugin {
    ($plugin:ty, $constructor:path) => {
        #[no_mangle]
        pub extern "C" fn deinterlace_plugin_create() -> *mut ::std::ffi::c_void {
            let plugin: $plugin = $constructor();
            let boxed: ::std::boxed::Box<dyn $crate::plugin::DeinterlacePlugin> =
                ::std::boxed::Box::new(plugin);
            $crate::plugin::plugin_into_raw(boxed)
        }

        #[no_mangle]
        pub unsafe extern "C" fn deinterlace_plugin_destroy(ptr: *mut ::std::ffi::c_void) {
            if !ptr.is_null() {
                drop($crate::plugin::plugin_from_raw(ptr));
            }
        }
    };
}
