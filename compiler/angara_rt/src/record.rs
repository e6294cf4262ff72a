//! Insertion-ordered string-keyed records.
//!
//! Keys are raw bytes compared exactly; they need not be UTF-8. Setting an
//! existing key replaces its value in place, so the key keeps the position
//! of its first insertion. `record_get` is a borrow: the caller must incref
//! the result to keep it.

use crate::list::{list_new, list_push};
use crate::object::{alloc, decref, incref, HeapObject, Object, ObjectKind};
use crate::string::string_new;
use crate::value::Value;

struct Entry {
    key: Box<[u8]>,
    value: Value,
}

#[repr(C)]
pub struct Record {
    header: Object,
    entries: Vec<Entry>,
}

// SAFETY: repr(C), header first, built only through `record_new`
unsafe impl HeapObject for Record {
    const KIND: ObjectKind = ObjectKind::Record;
}

impl Record {
    fn position(&self, key: &[u8]) -> Option<usize> {
        let key = key_bytes(key);
        self.entries.iter().position(|e| *e.key == *key)
    }
}

impl Drop for Record {
    fn drop(&mut self) {
        for entry in &self.entries {
            decref(entry.value);
        }
    }
}

fn with_record<R>(record: Value, f: impl FnOnce(&mut Record) -> R) -> Option<R> {
    // SAFETY: kind checked by downcast; single-threaded access
    record.downcast::<Record>().map(|r| f(unsafe { &mut *r }))
}

/// Keys stop at an interior NUL, like their C view would.
fn key_bytes(key: &[u8]) -> &[u8] {
    key.split(|b| *b == 0).next().unwrap_or_default()
}

pub fn record_new() -> Value {
    alloc(Record {
        header: Object::new(ObjectKind::Record),
        entries: Vec::new(),
    })
}

/// Bind `key` to `value`, taking a new reference to `value` and releasing
/// the one held for the previous value, if any.
pub fn record_set(record: Value, key: impl AsRef<[u8]>, value: Value) {
    if !record.is_record() {
        return;
    }
    let key = key.as_ref();
    incref(value);
    let replaced = with_record(record, |r| {
        match r.position(key) {
            Some(i) => Some(std::mem::replace(&mut r.entries[i].value, value)),
            None => {
                r.entries.push(Entry {
                    key: key_bytes(key).into(),
                    value,
                });
                None
            }
        }
    });
    if let Some(Some(old)) = replaced {
        decref(old);
    }
}

/// Borrowed value for `key`, or nil.
pub fn record_get(record: Value, key: impl AsRef<[u8]>) -> Value {
    with_record(record, |r| r.position(key.as_ref()).map(|i| r.entries[i].value))
        .flatten()
        .unwrap_or(Value::NIL)
}

pub fn record_has(record: Value, key: impl AsRef<[u8]>) -> bool {
    with_record(record, |r| r.position(key.as_ref()).is_some()).unwrap_or(false)
}

/// Remove `key`, releasing its value. Returns whether it was present.
pub fn record_remove(record: Value, key: impl AsRef<[u8]>) -> bool {
    let key = key.as_ref();
    let removed = with_record(record, |r| r.position(key).map(|i| r.entries.remove(i))).flatten();
    match removed {
        Some(entry) => {
            decref(entry.value);
            true
        }
        None => false,
    }
}

pub fn record_len(record: Value) -> usize {
    with_record(record, |r| r.entries.len()).unwrap_or(0)
}

/// Fresh list of the keys as Strings, in insertion order.
pub fn record_keys(record: Value) -> Value {
    let keys = with_record(record, |r| {
        r.entries
            .iter()
            .map(|e| e.key.clone())
            .collect::<Vec<_>>()
    })
    .unwrap_or_default();

    let list = list_new();
    for key in keys {
        let key = string_new(&key);
        list_push(list, key);
        decref(key);
    }
    list
}

/// Key (lossily decoded) and borrowed value of the entry at `index`, for
/// display.
pub fn record_get_index(record: Value, index: usize) -> Option<(String, Value)> {
    with_record(record, |r| {
        r.entries
            .get(index)
            .map(|e| (String::from_utf8_lossy(&e.key).into_owned(), e.value))
    })
    .flatten()
}

#[cfg(test)]
mod tests;
