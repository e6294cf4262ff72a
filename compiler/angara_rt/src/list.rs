//! Growable lists of Values.
//!
//! Elements are stored contiguously; every stored element holds one strong
//! reference. Capacity starts at 8 on the first push and doubles after that.
//! Getters that return an element incref it, so the caller owns the result.

use std::alloc::{handle_alloc_error, Layout};
use std::ptr;

use crate::object::{alloc, decref, incref, HeapObject, Object, ObjectKind};
use crate::value::Value;

const MIN_CAPACITY: usize = 8;

#[repr(C)]
pub struct List {
    header: Object,
    count: usize,
    capacity: usize,
    elements: *mut Value,
}

// SAFETY: repr(C), header first, built only through `List::empty`
unsafe impl HeapObject for List {
    const KIND: ObjectKind = ObjectKind::List;
}

impl List {
    fn empty() -> Self {
        List {
            header: Object::new(ObjectKind::List),
            count: 0,
            capacity: 0,
            elements: ptr::null_mut(),
        }
    }

    fn as_slice(&self) -> &[Value] {
        if self.elements.is_null() {
            return &[];
        }
        // SAFETY: the first `count` slots are initialized
        unsafe { std::slice::from_raw_parts(self.elements, self.count) }
    }

    fn grow(&mut self) {
        let new_capacity = if self.capacity == 0 {
            MIN_CAPACITY
        } else {
            self.capacity * 2
        };
        let Ok(new_layout) = Layout::array::<Value>(new_capacity) else {
            crate::fatal("list capacity overflow");
        };

        let raw = if self.elements.is_null() {
            // SAFETY: non-zero size layout
            unsafe { std::alloc::alloc(new_layout) }
        } else {
            // SAFETY: `elements` was allocated with the layout for `capacity`
            unsafe {
                std::alloc::realloc(
                    self.elements.cast::<u8>(),
                    Self::layout(self.capacity),
                    new_layout.size(),
                )
            }
        };
        if raw.is_null() {
            handle_alloc_error(new_layout);
        }

        self.elements = raw.cast::<Value>();
        self.capacity = new_capacity;
    }

    fn layout(capacity: usize) -> Layout {
        // Only called with capacities that already passed `Layout::array`.
        Layout::array::<Value>(capacity).unwrap_or_else(|_| Layout::new::<Value>())
    }

    fn push(&mut self, value: Value) {
        if self.count == self.capacity {
            self.grow();
        }
        // SAFETY: count < capacity after growing
        unsafe { self.elements.add(self.count).write(value) };
        self.count += 1;
    }

    fn slot(&mut self, index: i64) -> Option<&mut Value> {
        let index = usize::try_from(index).ok().filter(|&i| i < self.count)?;
        // SAFETY: index < count
        Some(unsafe { &mut *self.elements.add(index) })
    }
}

impl Drop for List {
    fn drop(&mut self) {
        for &value in self.as_slice() {
            decref(value);
        }
        if !self.elements.is_null() {
            // SAFETY: allocated with the layout for `capacity`
            unsafe { std::alloc::dealloc(self.elements.cast::<u8>(), Self::layout(self.capacity)) };
        }
    }
}

fn with_list<R>(list: Value, f: impl FnOnce(&mut List) -> R) -> Option<R> {
    // SAFETY: kind checked by downcast; single-threaded access
    list.downcast::<List>().map(|l| f(unsafe { &mut *l }))
}

pub fn list_new() -> Value {
    alloc(List::empty())
}

/// New list holding `elements` in order. Each element is incref'd.
pub fn list_with_elements(elements: &[Value]) -> Value {
    let list = list_new();
    for &value in elements {
        list_push(list, value);
    }
    list
}

/// Append `value`, taking a new reference to it.
pub fn list_push(list: Value, value: Value) {
    if !list.is_list() {
        return;
    }
    incref(value);
    with_list(list, |l| l.push(value));
}

/// Element at `index`, incref'd for the caller; nil when out of bounds.
pub fn list_get(list: Value, index: i64) -> Value {
    with_list(list, |l| l.slot(index).map(|v| *v))
        .flatten()
        .inspect(|&v| incref(v))
        .unwrap_or(Value::NIL)
}

/// Replace the element at `index`. Out of bounds is silently ignored.
pub fn list_set(list: Value, index: i64, value: Value) {
    let replaced = with_list(list, |l| l.slot(index).map(|slot| std::mem::replace(slot, value)));
    if let Some(Some(old)) = replaced {
        incref(value);
        decref(old);
    }
}

/// Element count; 0 for non-lists.
pub fn list_len(list: Value) -> usize {
    with_list(list, |l| l.count).unwrap_or(0)
}

pub fn list_capacity(list: Value) -> usize {
    with_list(list, |l| l.capacity).unwrap_or(0)
}

/// Remove and return the last element; the list's reference moves to the
/// caller. Nil when empty.
pub fn list_pop(list: Value) -> Value {
    with_list(list, |l| {
        if l.count == 0 {
            return Value::NIL;
        }
        l.count -= 1;
        // SAFETY: the old last slot is initialized
        unsafe { l.elements.add(l.count).read() }
    })
    .unwrap_or(Value::NIL)
}

/// Fresh list holding the elements of `a` then `b`.
pub fn list_concat(a: Value, b: Value) -> Value {
    let out = list_new();
    for value in list_elements(a).into_iter().chain(list_elements(b)) {
        list_push(out, value);
    }
    out
}

/// Snapshot of the elements without touching refcounts.
pub(crate) fn list_elements(list: Value) -> Vec<Value> {
    with_list(list, |l| l.as_slice().to_vec()).unwrap_or_default()
}
