//! C-ABI functions exported to native modules and generated code.
//!
//! Functions here are `#[no_mangle] extern "C"` entry points over the Rust
//! API. Pointer arguments come from native code that follows the module
//! contract; null pointers are tolerated and treated as empty input.
//! `angara_throw_error` lives with the rest of the exception machinery.

use std::borrow::Cow;
use std::ffi::{c_char, c_void, CStr};

use super::Finalizer;
use crate::class::{instance_native_data, native_class, native_instance_new};
use crate::list::{list_get, list_len, list_new, list_push, list_set};
use crate::object::{decref, incref};
use crate::record::{record_get, record_new, record_set};
use crate::string::{alloc_bytes, string_c_ptr, string_from_owned, string_len, string_new};
use crate::value::Value;

fn c_text<'a>(text: *const c_char) -> Cow<'a, str> {
    if text.is_null() {
        return Cow::Borrowed("");
    }
    // SAFETY: callers pass NUL-terminated strings
    unsafe { CStr::from_ptr(text) }.to_string_lossy()
}

fn c_bytes<'a>(text: *const c_char) -> &'a [u8] {
    if text.is_null() {
        return &[];
    }
    // SAFETY: callers pass NUL-terminated strings that outlive the call
    unsafe { CStr::from_ptr(text) }.to_bytes()
}

// ── Primitives ──────────────────────────────────────────────────────────

#[no_mangle]
pub extern "C" fn angara_create_nil() -> Value {
    Value::NIL
}

#[no_mangle]
pub extern "C" fn angara_create_bool(b: bool) -> Value {
    Value::bool(b)
}

#[no_mangle]
pub extern "C" fn angara_create_i64(n: i64) -> Value {
    Value::int(n)
}

#[no_mangle]
pub extern "C" fn angara_create_f64(f: f64) -> Value {
    Value::float(f)
}

// ── Reference counting ──────────────────────────────────────────────────

#[no_mangle]
pub extern "C" fn angara_incref(value: Value) {
    incref(value);
}

#[no_mangle]
pub extern "C" fn angara_decref(value: Value) {
    decref(value);
}

// ── Strings ─────────────────────────────────────────────────────────────

/// Buffer of `len + 1` bytes for [`angara_string_from_owned`].
#[no_mangle]
pub extern "C" fn angara_alloc_bytes(len: usize) -> *mut u8 {
    alloc_bytes(len)
}

/// New String copying `len` bytes from `bytes`.
#[no_mangle]
pub extern "C" fn angara_string_from_copy(bytes: *const u8, len: usize) -> Value {
    if bytes.is_null() || len == 0 {
        return string_new(&[]);
    }
    // SAFETY: caller passes `len` readable bytes
    string_new(unsafe { std::slice::from_raw_parts(bytes, len) })
}

/// New String adopting a buffer from [`angara_alloc_bytes`].
#[no_mangle]
pub extern "C" fn angara_string_from_owned(bytes: *mut u8, len: usize) -> Value {
    if bytes.is_null() {
        return string_new(&[]);
    }
    // SAFETY: the contract requires `bytes` to come from `angara_alloc_bytes(len)`
    unsafe { string_from_owned(bytes, len) }
}

/// NUL-terminated bytes of a String, or null.
#[no_mangle]
pub extern "C" fn angara_string_data(value: Value) -> *const u8 {
    string_c_ptr(value)
}

#[no_mangle]
pub extern "C" fn angara_string_len(value: Value) -> usize {
    string_len(value)
}

// ── Lists ───────────────────────────────────────────────────────────────

#[no_mangle]
pub extern "C" fn angara_list_new() -> Value {
    list_new()
}

#[no_mangle]
pub extern "C" fn angara_list_push(list: Value, value: Value) {
    list_push(list, value);
}

/// Element at `index`, owned by the caller; nil when out of bounds.
#[no_mangle]
pub extern "C" fn angara_list_get(list: Value, index: i64) -> Value {
    list_get(list, index)
}

#[no_mangle]
pub extern "C" fn angara_list_set(list: Value, index: i64, value: Value) {
    list_set(list, index, value);
}

#[no_mangle]
pub extern "C" fn angara_list_len(list: Value) -> i64 {
    i64::try_from(list_len(list)).unwrap_or(i64::MAX)
}

// ── Records ─────────────────────────────────────────────────────────────

#[no_mangle]
pub extern "C" fn angara_record_new() -> Value {
    record_new()
}

/// Value for `key`, borrowed; nil when absent.
#[no_mangle]
pub extern "C" fn angara_record_get(record: Value, key: *const c_char) -> Value {
    record_get(record, c_bytes(key))
}

#[no_mangle]
pub extern "C" fn angara_record_set(record: Value, key: *const c_char, value: Value) {
    record_set(record, c_bytes(key), value);
}

// ── Native instances ────────────────────────────────────────────────────

/// New instance of native class `class_name` wrapping `data`.
/// `finalizer` runs with `data` when the instance is destroyed.
#[no_mangle]
pub extern "C" fn angara_native_instance_new(
    class_name: *const c_char,
    data: *mut c_void,
    finalizer: Option<Finalizer>,
) -> Value {
    native_instance_new(native_class(&c_text(class_name)), data, finalizer)
}

/// Opaque data of a native instance, or null.
#[no_mangle]
pub extern "C" fn angara_native_instance_data(value: Value) -> *mut c_void {
    instance_native_data(value)
}

#[cfg(test)]
mod tests;
