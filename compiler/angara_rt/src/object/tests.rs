use super::*;
use crate::list::{list_new, list_push};
use crate::string::string_from;

#[test]
fn new_objects_start_at_one() {
    let s = string_from("a");
    assert_eq!(refcount(s), 1);
    decref(s);
}

#[test]
fn primitives_ignore_refcounting() {
    incref(Value::int(3));
    decref(Value::int(3));
    decref(Value::NIL);
    assert_eq!(refcount(Value::float(1.0)), 0);
}

#[test]
fn incref_decref_balance() {
    let before = live_objects();
    let s = string_from("shared");
    incref(s);
    incref(s);
    assert_eq!(refcount(s), 3);
    decref(s);
    decref(s);
    assert_eq!(refcount(s), 1);
    assert_eq!(live_objects(), before + 1);
    decref(s);
    assert_eq!(live_objects(), before);
}

#[test]
fn destroying_a_container_releases_children() {
    let before = live_objects();
    let list = list_new();
    let s = string_from("child");
    list_push(list, s);
    decref(s);
    assert_eq!(refcount(s), 1);
    assert_eq!(live_objects(), before + 2);

    decref(list);
    assert_eq!(live_objects(), before);
}

#[test]
fn header_layout() {
    assert_eq!(std::mem::size_of::<ObjectKind>(), 4);
    assert_eq!(Object::new(ObjectKind::List).refcount, 1);
}
