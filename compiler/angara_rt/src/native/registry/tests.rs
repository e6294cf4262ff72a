use pretty_assertions::assert_eq;

use super::*;
use crate::native::FuncDef;
use crate::value::Value;

extern "C-unwind" fn nop(_argc: i32, _args: *const Value) -> Value {
    Value::NIL
}

fn module(name: &str) -> NativeModule {
    let mut module = NativeModule::new(name);
    module
        .add_function("nop", "->n", nop)
        .unwrap_or_else(|e| panic!("{e}"));
    module
}

#[test]
fn registered_modules_are_found() {
    let mut registry = ModuleRegistry::default();
    assert!(registry.is_empty());
    registry.register(module("path"));
    registry.register(module("fs"));

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.names(), vec!["fs".to_string(), "path".to_string()]);
    let path = registry.require("path").unwrap_or_else(|e| panic!("{e}"));
    assert!(path.function("nop").is_some());
    assert!(registry.get("json").is_none());
}

#[test]
fn unknown_module_reports_known_names() {
    let mut registry = ModuleRegistry::new(ModuleLoader::new(vec!["/nonexistent".into()]));
    registry.register(module("path"));

    let err = registry
        .require("pth")
        .err()
        .unwrap_or_else(|| panic!("pth should not resolve"));
    match err {
        LoadError::UnknownModule { name, known } => {
            assert_eq!(name, "pth");
            assert_eq!(known, vec!["path".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_names_are_not_unknown_modules() {
    let mut registry = ModuleRegistry::default();
    let err = registry.require("../x").err();
    assert!(matches!(err, Some(LoadError::InvalidModuleName { .. })));
}

#[test]
fn register_replaces_same_name() {
    let mut registry = ModuleRegistry::default();
    registry.register(module("fs"));
    registry.register(NativeModule::new("fs"));
    assert_eq!(registry.len(), 1);
    assert!(registry.get("fs").is_some_and(|m| m.functions().is_empty()));
}

static EXPORTS: [FuncDef; 2] = [
    FuncDef {
        name: c"nop".as_ptr(),
        function: Some(nop),
        signature: c"->n".as_ptr(),
        class: std::ptr::null(),
    },
    FuncDef::END,
];

unsafe extern "C" fn init_static(_out_count: *mut i32) -> *const FuncDef {
    EXPORTS.as_ptr()
}

#[test]
fn static_modules_register_through_init() {
    let mut registry = ModuleRegistry::default();
    // SAFETY: init_static follows the init contract
    unsafe { registry.register_static("builtin", init_static) }.unwrap_or_else(|e| panic!("{e}"));
    assert!(registry
        .get("builtin")
        .is_some_and(|m| m.function("nop").is_some()));
    assert!(registry.loader().search_paths().is_empty());
}
