//! Plugin discovery, loading and teardown.

use std::env;
use std::ffi::{c_void, OsStr};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use libloading::Library;
use log::{debug, info, warn};

use super::{plugin_ref, CreateFn, DeinterlacePlugin, DestroyFn, NameList};
use super::{CREATE_SYMBOL, DESTROY_SYMBOL};
use crate::{DeinterlaceError, DeinterlaceResult, Sample};

/// Environment variable naming the default plugin directory.
pub const PLUGIN_DIR_ENV: &str = "DEINTERLACE_PLUGIN_DIR";

/// One loaded provider.
///
/// Dropping the record destroys the provider through its own destructor
/// entry point, then unloads the library.
struct PluginRecord {
    instance: *mut c_void,
    destroy: DestroyFn,
    /// Library handle, or factory address for in-process providers.
    key: usize,
    // Unloaded only after `drop` has destroyed `instance`.
    _library: Option<Library>,
}

// SAFETY: the record exclusively owns `instance`, and providers are `Send`.
unsafe impl Send for PluginRecord {}

impl PluginRecord {
    fn provider(&self) -> &dyn DeinterlacePlugin {
        // SAFETY: `instance` came from the factory and lives until drop.
        unsafe { plugin_ref(self.instance) }
    }
}

impl Drop for PluginRecord {
    fn drop(&mut self) {
        // SAFETY: `instance` came from the factory paired with `destroy`,
        // and the library is still mapped.
        unsafe { (self.destroy)(self.instance) };
    }
}

/// Owner of all providers loaded for one engine.
#[derive(Default)]
pub struct PluginManager {
    records: Vec<PluginRecord>,
}

impl PluginManager {
    pub fn new() -> Self {
        PluginManager {
            records: Vec::new(),
        }
    }

    /// The directory named by `DEINTERLACE_PLUGIN_DIR`, if set.
    pub fn default_dir() -> Option<PathBuf> {
        env::var_os(PLUGIN_DIR_ENV).map(PathBuf::from)
    }

    /// Load every plugin library in `dir`.
    ///
    /// Candidates are the files carrying the platform's shared library
    /// extension, loaded in file name order.  A candidate that fails to
    /// load aborts the scan.  A library lacking either entry point is
    /// unloaded and skipped.  A library already loaded is not added
    /// twice.
    ///
    /// Returns whether any plugin is loaded afterwards.
    ///
    /// # Safety
    ///
    /// Loading a library runs its initialisers, and the entry points are
    /// trusted to have the documented signatures.
    pub unsafe fn find_plugins(&mut self, dir: impl AsRef<Path>) -> DeinterlaceResult<bool> {
        let dir = dir.as_ref();
        let mut candidates = Vec::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            // Follows symlinks, so a link to a directory is not a candidate.
            if !path.is_file() {
                continue;
            }

            if path.extension() == Some(OsStr::new(env::consts::DLL_EXTENSION)) {
                candidates.push(path);
            }
        }
        candidates.sort();

        debug!("{} plugin candidate(s) in {}", candidates.len(), dir.display());
        for path in candidates {
            self.load(&path)?;
        }

        Ok(self.is_loaded())
    }

    /// Load a single plugin library.
    ///
    /// Returns `Ok(false)` if the library is not a plugin or is already
    /// loaded.
    ///
    /// # Safety
    ///
    /// See [`PluginManager::find_plugins`].
    pub unsafe fn load(&mut self, path: &Path) -> DeinterlaceResult<bool> {
        let library = Library::new(path)
            .map_err(|err| DeinterlaceError::LibraryLoad(path.to_path_buf(), err))?;

        let entry_points = match (
            library.get::<CreateFn>(CREATE_SYMBOL.as_bytes()),
            library.get::<DestroyFn>(DESTROY_SYMBOL.as_bytes()),
        ) {
            (Ok(create), Ok(destroy)) => Some((*create, *destroy)),
            _ => None,
        };

        let (create, destroy) = match entry_points {
            Some(entry_points) => entry_points,
            None => {
                warn!("{} does not export the plugin entry points", path.display());
                return Ok(false);
            }
        };

        let (library, key) = library_key(library);
        if self.contains_key(key) {
            warn!("{} is already loaded", path.display());
            return Ok(false);
        }

        if !self.attach(create, destroy, key, Some(library)) {
            warn!("{} returned no plugin instance", path.display());
            return Ok(false);
        }

        if let Some(record) = self.records.last() {
            info!(
                "loaded deinterlace plugin {} ({})",
                path.display(),
                record.provider().name_list()
            );
        }
        Ok(true)
    }

    /// Attach a provider linked into the current process.
    ///
    /// The entry points are used exactly as for a loaded library.
    /// Registering the same factory twice is a no-op returning `false`.
    ///
    /// # Safety
    ///
    /// `create` must return a pointer built with
    /// [`plugin_into_raw`](super::plugin_into_raw), or null, and `destroy`
    /// must release it.
    pub unsafe fn register(&mut self, create: CreateFn, destroy: DestroyFn) -> bool {
        let key = create as usize;
        if self.contains_key(key) {
            return false;
        }
        self.attach(create, destroy, key, None)
    }

    unsafe fn attach(
        &mut self,
        create: CreateFn,
        destroy: DestroyFn,
        key: usize,
        library: Option<Library>,
    ) -> bool {
        let instance = create();
        if instance.is_null() {
            return false;
        }

        self.records.push(PluginRecord {
            instance,
            destroy,
            key,
            _library: library,
        });
        true
    }

    fn contains_key(&self, key: usize) -> bool {
        self.records.iter().any(|r| r.key == key)
    }

    pub fn is_loaded(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// The provider at `index`, in load order.
    ///
    /// Returns `Ok(None)` when nothing is loaded.
    pub fn plugin(&self, index: usize) -> DeinterlaceResult<Option<&dyn DeinterlacePlugin>> {
        if !self.is_loaded() {
            return Ok(None);
        }

        self.records
            .get(index)
            .map(|r| Some(r.provider()))
            .ok_or_else(|| DeinterlaceError::IndexOutOfRange(index, self.records.len()))
    }

    pub fn plugins(&self) -> impl Iterator<Item = &dyn DeinterlacePlugin> {
        self.records.iter().map(PluginRecord::provider)
    }

    /// Every algorithm name advertised by the loaded providers.
    pub fn plugin_names(&self) -> NameList {
        self.plugins()
            .flat_map(|p| p.name_list().iter())
            .collect()
    }

    /// Run `algorithm` with the first provider advertising it.
    pub fn run<T: Sample>(
        &self,
        buf: &mut [T],
        columns: usize,
        rows: usize,
        algorithm: &str,
        arg: u32,
    ) -> DeinterlaceResult<()> {
        if !self.is_loaded() {
            return Err(DeinterlaceError::NoPluginsLoaded);
        }

        let provider = self
            .plugins()
            .find(|p| p.name_list().contains(algorithm))
            .ok_or_else(|| DeinterlaceError::AlgorithmNotFound(algorithm.to_string()))?;

        debug!("running plugin algorithm {} on {}x{} frame", algorithm, columns, rows);
        provider.run(T::buf_mut(buf), columns, rows, algorithm, arg)
    }
}

impl fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginManager")
            .field("plugins", &self.records.len())
            .finish()
    }
}

/// Identify a library by its OS handle.
///
/// Loading the same file twice yields the same handle.
#[cfg(unix)]
fn library_key(library: Library) -> (Library, usize) {
    use libloading::os::unix;

    let raw = unix::Library::from(library).into_raw();
    // SAFETY: `raw` was just released by `into_raw`.
    let library = unsafe { unix::Library::from_raw(raw) };
    (library.into(), raw as usize)
}

#[cfg(windows)]
fn library_key(library: Library) -> (Library, usize) {
    use libloading::os::windows;

    let raw = windows::Library::from(library).into_raw();
    // SAFETY: `raw` was just released by `into_raw`.
    let library = unsafe { windows::Library::from_raw(raw) };
    (library.into(), raw as usize)
}
