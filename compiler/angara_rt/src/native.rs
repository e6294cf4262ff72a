//! Native module ABI.
//!
//! A native module is a shared library (or statically linked object)
//! exporting `Angara_<name>_Init`. The init function returns a table of
//! [`FuncDef`] descriptors terminated by an entry with a null name. Each
//! entry is either a plain function or, when `class` is set, a class whose
//! `function` is its constructor.
//!
//! The host copies everything it needs out of the table once, at load time,
//! and parses every signature string then. After that the descriptors are
//! not read again.
//!
//! Native code works with Values through the exports in [`host`] and
//! follows the same ownership rules as the runtime: arguments are borrowed,
//! the returned Value is owned by the caller.

use std::ffi::{c_char, c_void};

use crate::value::Value;

pub mod host;
mod loader;
mod module;
mod registry;
mod signature;

pub use loader::{LoadError, ModuleLoader};
pub use module::{CallError, NativeClass, NativeFunction, NativeModule};
pub use registry::ModuleRegistry;
pub use signature::{Signature, SignatureError, SignatureErrorKind, TypeTag};

/// A native function or method. Methods get the receiver as `args[0]`.
///
/// `"C-unwind"` so that a throw from inside can reach a Rust handler.
pub type NativeFn = extern "C-unwind" fn(argc: i32, args: *const Value) -> Value;

/// Releases the opaque data of a native instance.
pub type Finalizer = extern "C" fn(data: *mut c_void);

/// `Angara_<name>_Init`. Writes the entry count to `out_count` and returns
/// the descriptor table.
pub type InitFn = unsafe extern "C" fn(out_count: *mut i32) -> *const FuncDef;

#[repr(C)]
pub struct FuncDef {
    pub name: *const c_char,
    pub function: Option<NativeFn>,
    pub signature: *const c_char,
    /// Non-null for class entries.
    pub class: *const ClassDef,
}

#[repr(C)]
pub struct ClassDef {
    pub name: *const c_char,
    pub finalizer: Option<Finalizer>,
    /// Terminated by an entry with a null name.
    pub methods: *const MethodDef,
}

#[repr(C)]
pub struct MethodDef {
    pub name: *const c_char,
    pub function: Option<NativeFn>,
    pub signature: *const c_char,
}

// SAFETY: descriptor tables are immutable static data
unsafe impl Sync for FuncDef {}
// SAFETY: descriptor tables are immutable static data
unsafe impl Sync for ClassDef {}
// SAFETY: descriptor tables are immutable static data
unsafe impl Sync for MethodDef {}

impl FuncDef {
    /// Table terminator.
    pub const END: FuncDef = FuncDef {
        name: std::ptr::null(),
        function: None,
        signature: std::ptr::null(),
        class: std::ptr::null(),
    };
}

impl MethodDef {
    /// Method list terminator.
    pub const END: MethodDef = MethodDef {
        name: std::ptr::null(),
        function: None,
        signature: std::ptr::null(),
    };
}

/// Name of the init symbol for `module`.
pub fn init_symbol(module: &str) -> String {
    format!("Angara_{module}_Init")
}
