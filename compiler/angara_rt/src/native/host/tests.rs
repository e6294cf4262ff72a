use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;

use super::*;
use crate::display::repr;
use crate::object::{live_objects, refcount};
use crate::record::record_len;
use crate::string::string_to_rust;

#[test]
fn primitive_constructors() {
    assert!(angara_create_nil().is_nil());
    assert_eq!(angara_create_bool(true).as_bool(), Some(true));
    assert_eq!(angara_create_i64(-4).as_int(), Some(-4));
    assert_eq!(angara_create_f64(0.5).as_float(), Some(0.5));
}

#[test]
fn string_copy_and_read_back() {
    let before = live_objects();
    let s = angara_string_from_copy(b"native".as_ptr(), 6);
    assert_eq!(angara_string_len(s), 6);
    // SAFETY: String data is NUL-terminated
    let text = unsafe { CStr::from_ptr(angara_string_data(s).cast::<c_char>()) };
    assert_eq!(text.to_str().ok(), Some("native"));
    angara_decref(s);
    assert_eq!(live_objects(), before);
}

#[test]
fn donated_buffer_becomes_a_string() {
    let buf = angara_alloc_bytes(2);
    // SAFETY: the buffer holds 3 bytes
    unsafe {
        *buf = b'o';
        *buf.add(1) = b'k';
    }
    let s = angara_string_from_owned(buf, 2);
    assert_eq!(string_to_rust(s).as_deref(), Some("ok"));
    angara_decref(s);
}

#[test]
fn null_inputs_make_empty_strings() {
    let a = angara_string_from_copy(std::ptr::null(), 10);
    let b = angara_string_from_owned(std::ptr::null_mut(), 0);
    assert_eq!(angara_string_len(a), 0);
    assert_eq!(angara_string_len(b), 0);
    angara_decref(a);
    angara_decref(b);
}

#[test]
fn refcount_exports() {
    let s = angara_string_from_copy(b"x".as_ptr(), 1);
    angara_incref(s);
    assert_eq!(refcount(s), 2);
    angara_decref(s);
    angara_decref(s);
}

#[test]
fn list_exports() {
    let list = angara_list_new();
    angara_list_push(list, angara_create_i64(1));
    angara_list_push(list, angara_create_i64(2));
    angara_list_set(list, 0, angara_create_i64(10));
    assert_eq!(angara_list_len(list), 2);
    assert_eq!(angara_list_get(list, 0).as_int(), Some(10));
    assert!(angara_list_get(list, 7).is_nil());
    angara_decref(list);
}

#[test]
fn record_exports() {
    let rec = angara_record_new();
    angara_record_set(rec, c"n".as_ptr(), angara_create_i64(3));
    assert_eq!(angara_record_get(rec, c"n".as_ptr()).as_int(), Some(3));
    assert!(angara_record_get(rec, c"m".as_ptr()).is_nil());
    assert_eq!(repr(rec), "{n: 3}");
    angara_decref(rec);
}

#[test]
fn record_keys_match_exact_bytes() {
    let rec = angara_record_new();
    angara_record_set(rec, c"\xff".as_ptr(), angara_create_i64(1));
    angara_record_set(rec, c"\xfe".as_ptr(), angara_create_i64(2));
    assert_eq!(record_len(rec), 2);
    assert_eq!(angara_record_get(rec, c"\xff".as_ptr()).as_int(), Some(1));
    assert_eq!(angara_record_get(rec, c"\xfe".as_ptr()).as_int(), Some(2));
    angara_decref(rec);
}

static RELEASED: AtomicUsize = AtomicUsize::new(0);

extern "C" fn release(data: *mut c_void) {
    // SAFETY: data came from Box::into_raw below
    drop(unsafe { Box::from_raw(data.cast::<u32>()) });
    RELEASED.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn native_instance_round_trip() {
    let data = Box::into_raw(Box::new(99u32)).cast::<c_void>();
    let inst = angara_native_instance_new(c"Counter".as_ptr(), data, Some(release));
    assert_eq!(angara_native_instance_data(inst), data);
    assert_eq!(repr(inst), "<instance of Counter>");
    assert!(angara_native_instance_data(Value::int(1)).is_null());

    let start = RELEASED.load(Ordering::SeqCst);
    angara_decref(inst);
    assert_eq!(RELEASED.load(Ordering::SeqCst), start + 1);
}
