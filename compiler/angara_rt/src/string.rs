//! Immutable byte strings.
//!
//! Bytes are owned, NUL-terminated for C consumers, and measured in bytes
//! rather than code points. The byte buffer is always a boxed slice of
//! `len + 1` bytes, which is also what [`alloc_bytes`] hands to native
//! modules that want to donate a buffer.

use std::ptr;

use crate::object::{alloc, HeapObject, Object, ObjectKind};
use crate::value::Value;

#[repr(C)]
pub struct AngaraString {
    header: Object,
    len: usize,
    bytes: *mut u8,
}

// SAFETY: repr(C), header first, built only through `from_boxed`
unsafe impl HeapObject for AngaraString {
    const KIND: ObjectKind = ObjectKind::String;
}

impl AngaraString {
    /// Take ownership of a `len + 1` byte buffer whose last byte is NUL.
    fn from_boxed(buf: Box<[u8]>) -> Self {
        debug_assert_eq!(buf.last(), Some(&0));
        let len = buf.len() - 1;
        AngaraString {
            header: Object::new(ObjectKind::String),
            len,
            bytes: Box::into_raw(buf).cast::<u8>(),
        }
    }

    fn as_bytes(&self) -> &[u8] {
        // SAFETY: `bytes` holds `len + 1` initialized bytes for our lifetime
        unsafe { std::slice::from_raw_parts(self.bytes, self.len) }
    }
}

impl Drop for AngaraString {
    fn drop(&mut self) {
        // SAFETY: `bytes` came from `Box::into_raw` of a `len + 1` slice
        unsafe {
            drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
                self.bytes,
                self.len + 1,
            )));
        }
    }
}

/// Allocate a zeroed `len + 1` byte buffer suitable for
/// [`string_from_owned`].
pub fn alloc_bytes(len: usize) -> *mut u8 {
    Box::into_raw(vec![0u8; len + 1].into_boxed_slice()).cast::<u8>()
}

/// New String holding a copy of `bytes`.
pub fn string_new(bytes: &[u8]) -> Value {
    let mut buf = Vec::with_capacity(bytes.len() + 1);
    buf.extend_from_slice(bytes);
    buf.push(0);
    alloc(AngaraString::from_boxed(buf.into_boxed_slice()))
}

/// New String holding a copy of `text`.
pub fn string_from(text: &str) -> Value {
    string_new(text.as_bytes())
}

/// New String adopting a buffer from [`alloc_bytes`].
///
/// # Safety
///
/// `bytes` must come from `alloc_bytes(len)` and must not be used afterwards.
pub unsafe fn string_from_owned(bytes: *mut u8, len: usize) -> Value {
    let mut buf = Box::from_raw(ptr::slice_from_raw_parts_mut(bytes, len + 1));
    buf[len] = 0;
    alloc(AngaraString::from_boxed(buf))
}

/// Borrow the bytes of a String value.
///
/// The slice is valid while the caller keeps a reference to `value`.
pub fn string_bytes(value: &Value) -> Option<&[u8]> {
    // SAFETY: kind checked by downcast; the object outlives the borrow
    value
        .downcast::<AngaraString>()
        .map(|s| unsafe { (*s).as_bytes() })
}

/// Pointer to the NUL-terminated bytes, or null for non-strings.
pub fn string_c_ptr(value: Value) -> *const u8 {
    // SAFETY: kind checked by downcast
    value
        .downcast::<AngaraString>()
        .map_or(ptr::null(), |s| unsafe { (*s).bytes.cast_const() })
}

/// Lossy UTF-8 copy of a String value.
pub fn string_to_rust(value: Value) -> Option<String> {
    string_bytes(&value).map(|b| String::from_utf8_lossy(b).into_owned())
}

/// Byte length; 0 for non-strings.
pub fn string_len(value: Value) -> usize {
    string_bytes(&value).map_or(0, <[u8]>::len)
}

/// Fresh String holding `a` followed by `b`; nil unless both are Strings.
pub fn string_concat(a: Value, b: Value) -> Value {
    match (string_bytes(&a), string_bytes(&b)) {
        (Some(a), Some(b)) => {
            let mut buf = Vec::with_capacity(a.len() + b.len());
            buf.extend_from_slice(a);
            buf.extend_from_slice(b);
            string_new(&buf)
        }
        _ => Value::NIL,
    }
}

/// Byte-wise equality of two Strings.
pub fn string_equals(a: Value, b: Value) -> bool {
    matches!((string_bytes(&a), string_bytes(&b)), (Some(a), Some(b)) if a == b)
}

#[cfg(test)]
mod tests;
