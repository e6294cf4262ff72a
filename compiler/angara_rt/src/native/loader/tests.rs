use pretty_assertions::assert_eq;

use super::*;

#[test]
fn platform_file_names() {
    let names = ModuleLoader::file_names("fs");
    if cfg!(target_os = "windows") {
        assert_eq!(names, vec!["fs.dll".to_string()]);
    } else if cfg!(target_os = "macos") {
        assert_eq!(names[0], "libfs.dylib");
    } else {
        assert_eq!(names, vec!["libfs.so".to_string()]);
    }
}

#[test]
fn module_names_must_be_identifiers() {
    let loader = ModuleLoader::default();
    for name in ["", "../etc", "a/b", "name.so", "sp ace"] {
        let err = loader.locate(name).err();
        assert!(
            matches!(err, Some(LoadError::InvalidModuleName { .. })),
            "{name:?} accepted"
        );
    }
}

#[test]
fn missing_module_lists_searched_paths() {
    let loader = ModuleLoader::new(vec!["/nonexistent/a".into(), "/nonexistent/b".into()]);
    let err = loader
        .load("nosuchmodule")
        .err()
        .unwrap_or_else(|| panic!("module should not load"));
    assert_eq!(
        err.to_string(),
        "native module `nosuchmodule` not found (searched /nonexistent/a, /nonexistent/b)"
    );
}

#[test]
fn empty_search_path() {
    let err = ModuleLoader::default().locate("fs").err();
    assert_eq!(
        err.map(|e| e.to_string()).as_deref(),
        Some("native module `fs` not found (searched no directories)")
    );
}

#[test]
fn search_paths_come_from_config() {
    let config = RuntimeConfig {
        log_filter: None,
        module_path: vec!["/opt/angara/lib".into()],
    };
    let mut loader = ModuleLoader::from_config(&config);
    loader.add_search_path("/usr/lib/angara");
    assert_eq!(
        loader.search_paths(),
        &[PathBuf::from("/opt/angara/lib"), PathBuf::from("/usr/lib/angara")]
    );
}

#[test]
fn opening_a_non_library_fails() {
    let err = Library::open(Path::new("/nonexistent/libnothing.so")).err();
    assert!(matches!(err, Some(LoadError::Open { .. })));
}

#[test]
fn init_symbol_name() {
    assert_eq!(init_symbol("fs"), "Angara_fs_Init");
}
