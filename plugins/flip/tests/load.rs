//! Scanning a directory holding the flip plugin as a real shared library.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use deinterlace::plugin::PluginManager;
use deinterlace::{DeinterlaceError, Deinterlacer, ErrorKind};
use tempfile::tempdir;

fn lib_file(stem: &str) -> String {
    format!("{}{}.{}", env::consts::DLL_PREFIX, stem, env::consts::DLL_EXTENSION)
}

/// A library built by cargo alongside this test executable.
fn built_library(stem: &str) -> PathBuf {
    let exe = env::current_exe().unwrap();
    let name = lib_file(stem);

    exe.ancestors()
        .skip(1)
        .take(2)
        .map(|dir| dir.join(&name))
        .find(|path| path.is_file())
        .unwrap_or_else(|| panic!("{} not built next to {}", name, exe.display()))
}

fn install(dir: &Path, stem: &str) {
    fs::copy(built_library(stem), dir.join(lib_file(stem))).unwrap();
}

#[test]
fn test_scan_single_plugin() {
    let dir = tempdir().unwrap();
    install(dir.path(), "deinterlace_flip");

    let mut manager = PluginManager::new();
    assert!(unsafe { manager.find_plugins(dir.path()) }.unwrap());
    assert!(manager.is_loaded());
    assert_eq!(manager.count(), 1);

    let plugin = manager.plugin(0).unwrap().unwrap();
    assert_eq!(plugin.count(), 3);
    assert!(plugin.name_list().contains("FLIP_HORIZONTAL"));

    match manager.plugin(1) {
        Err(err) => assert_eq!(err.kind(), ErrorKind::OutOfRange),
        Ok(_) => panic!("index 1 should be out of range"),
    }

    // Same file, same handle: not loaded twice.
    assert!(unsafe { manager.find_plugins(dir.path()) }.unwrap());
    assert_eq!(manager.count(), 1);

    drop(manager);
    dir.close().unwrap();
}

#[test]
fn test_scan_skips_library_without_entry_points() {
    let dir = tempdir().unwrap();
    // The host library exports no plugin entry points.
    install(dir.path(), "deinterlace");

    let mut manager = PluginManager::new();
    assert!(!unsafe { manager.find_plugins(dir.path()) }.unwrap());
    assert_eq!(manager.count(), 0);

    // Sorted first, skipped, and the scan carries on to the plugin.
    install(dir.path(), "deinterlace_flip");
    assert!(unsafe { manager.find_plugins(dir.path()) }.unwrap());
    assert_eq!(manager.count(), 1);
    assert_eq!(manager.plugin_names().to_string(), "FLIP_HORIZONTAL,FLIP_VERTICAL,ROTATE_180");
}

#[test]
fn test_run_custom_and_teardown() {
    let dir = tempdir().unwrap();
    install(dir.path(), "deinterlace_flip");

    let mut engine16 = Deinterlacer::<u16>::new();
    let mut engine32 = Deinterlacer::<u32>::new();
    assert!(unsafe { engine16.find_plugins(dir.path()) }.unwrap());
    assert!(unsafe { engine32.find_plugins(dir.path()) }.unwrap());
    assert_eq!(engine16.plugins().count(), 1);
    assert_eq!(engine32.plugins().count(), 1);

    let mut buf = [0u16, 1, 2, 3, 4, 5];
    engine16.run_custom(&mut buf, 3, 2, "FLIP_HORIZONTAL", &[]).unwrap();
    assert_eq!(buf, [2, 1, 0, 5, 4, 3]);

    let mut buf = [0u32, 1, 2, 3];
    engine32.run_custom(&mut buf, 2, 2, "ROTATE_180", &[]).unwrap();
    assert_eq!(buf, [3, 2, 1, 0]);

    match engine16.run_custom(&mut [0u16; 4], 2, 2, "NOPE", &[]) {
        Err(DeinterlaceError::AlgorithmNotFound(name)) => assert_eq!(name, "NOPE"),
        other => panic!("unexpected result: {:?}", other),
    }

    // Providers are destroyed and the libraries unloaded, so the
    // directory can be removed on every platform.
    drop(engine16);
    drop(engine32);
    dir.close().unwrap();
}
