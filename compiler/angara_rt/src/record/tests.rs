use pretty_assertions::assert_eq;

use super::*;
use crate::display::repr;
use crate::list::list_len;
use crate::object::{live_objects, refcount};
use crate::string::string_from;

#[test]
fn set_and_get() {
    let before = live_objects();
    let rec = record_new();
    let name = string_from("ada");
    record_set(rec, "name", name);
    decref(name);
    record_set(rec, "age", Value::int(36));

    assert_eq!(record_get(rec, "age").as_int(), Some(36));
    assert!(record_get(rec, "name").is_string());
    assert!(record_get(rec, "missing").is_nil());
    assert_eq!(record_len(rec), 2);

    decref(rec);
    assert_eq!(live_objects(), before);
}

#[test]
fn overwrite_keeps_position_and_releases_old() {
    let rec = record_new();
    let old = string_from("old");
    record_set(rec, "a", old);
    record_set(rec, "b", Value::int(2));
    record_set(rec, "a", Value::int(1));

    assert_eq!(refcount(old), 1);
    assert_eq!(record_len(rec), 2);
    assert_eq!(repr(rec), "{a: 1, b: 2}");
    decref(old);
    decref(rec);
}

#[test]
fn keys_truncate_at_nul() {
    let rec = record_new();
    record_set(rec, "key\0ignored", Value::TRUE);
    assert!(record_has(rec, "key"));
    assert_eq!(record_get(rec, "key\0other").as_bool(), Some(true));
    decref(rec);
}

#[test]
fn non_utf8_keys_stay_distinct() {
    let rec = record_new();
    record_set(rec, b"\xff", Value::int(1));
    record_set(rec, b"\xfe", Value::int(2));

    assert_eq!(record_len(rec), 2);
    assert_eq!(record_get(rec, b"\xff").as_int(), Some(1));
    assert_eq!(record_get(rec, b"\xfe").as_int(), Some(2));
    assert!(!record_has(rec, "\u{fffd}"));
    decref(rec);
}

#[test]
fn remove_reports_presence() {
    let rec = record_new();
    record_set(rec, "x", Value::int(1));
    assert!(record_remove(rec, "x"));
    assert!(!record_remove(rec, "x"));
    assert!(!record_has(rec, "x"));
    decref(rec);
}

#[test]
fn keys_come_back_in_insertion_order() {
    let rec = record_new();
    record_set(rec, "z", Value::NIL);
    record_set(rec, "a", Value::NIL);
    let keys = record_keys(rec);
    assert_eq!(list_len(keys), 2);
    assert_eq!(repr(keys), "[z, a]");
    assert_eq!(
        record_get_index(rec, 1).map(|(k, _)| k).as_deref(),
        Some("a")
    );
    assert!(record_get_index(rec, 2).is_none());
    decref(keys);
    decref(rec);
}

#[test]
fn non_records_are_ignored() {
    let s = string_from("not a record");
    record_set(s, "k", s);
    assert_eq!(refcount(s), 1);
    assert!(record_get(Value::int(3), "k").is_nil());
    assert_eq!(record_len(Value::NIL), 0);
    decref(s);
}
