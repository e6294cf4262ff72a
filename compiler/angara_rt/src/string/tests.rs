use pretty_assertions::assert_eq;

use super::*;
use crate::object::{decref, live_objects};

#[test]
fn bytes_are_copied_and_nul_terminated() {
    let s = string_from("hello");
    assert_eq!(string_bytes(&s), Some(&b"hello"[..]));
    assert_eq!(string_len(s), 5);

    let ptr = string_c_ptr(s);
    // SAFETY: a String keeps len + 1 bytes
    let terminator = unsafe { *ptr.add(5) };
    assert_eq!(terminator, 0);
    decref(s);
}

#[test]
fn length_counts_bytes() {
    let s = string_from("héllo");
    assert_eq!(string_len(s), 6);
    assert_eq!(string_to_rust(s).as_deref(), Some("héllo"));
    decref(s);
}

#[test]
fn empty_string() {
    let s = string_new(&[]);
    assert_eq!(string_len(s), 0);
    assert_eq!(string_to_rust(s).as_deref(), Some(""));
    decref(s);
}

#[test]
fn non_strings_have_no_bytes() {
    assert_eq!(string_bytes(&Value::int(1)), None);
    assert!(string_c_ptr(Value::NIL).is_null());
    assert_eq!(string_len(Value::TRUE), 0);
}

#[test]
fn concat_makes_a_fresh_string() {
    let a = string_from("foo");
    let b = string_from("bar");
    let c = string_concat(a, b);
    assert_eq!(string_to_rust(c).as_deref(), Some("foobar"));
    assert!(!c.ptr_eq(a));
    decref(a);
    decref(b);
    decref(c);
}

#[test]
fn concat_with_non_string_is_nil() {
    let a = string_from("foo");
    assert!(string_concat(a, Value::int(1)).is_nil());
    decref(a);
}

#[test]
fn equality_is_bytewise() {
    let a = string_from("same");
    let b = string_from("same");
    let c = string_from("other");
    assert!(string_equals(a, b));
    assert!(!string_equals(a, c));
    assert!(!string_equals(a, Value::NIL));
    for v in [a, b, c] {
        decref(v);
    }
}

#[test]
fn owned_buffer_is_adopted() {
    let before = live_objects();
    let buf = alloc_bytes(3);
    // SAFETY: alloc_bytes(3) returned 4 writable bytes
    unsafe { std::ptr::copy_nonoverlapping(b"abc".as_ptr(), buf, 3) };
    // SAFETY: buf came from alloc_bytes(3)
    let s = unsafe { string_from_owned(buf, 3) };
    assert_eq!(string_c_ptr(s), buf.cast_const());
    assert_eq!(string_to_rust(s).as_deref(), Some("abc"));
    decref(s);
    assert_eq!(live_objects(), before);
}
