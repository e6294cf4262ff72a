//! Heap object header and reference counting.
//
// Heap layout for every object kind:
//
//   +─────────────+──────────────────+──────────────────────+
//   | kind: u32   | refcount: usize  | kind-specific body   |
//   +─────────────+──────────────────+──────────────────────+
//   ^
//   object-ref payload of a Value
//
// Each body type is `#[repr(C)]` with the header as its first field, so a
// `*mut Object` casts to the concrete type once the kind has been checked.
// Bodies are allocated through `Box` and destroyed by rebuilding the `Box`;
// their `Drop` impls release the Values they own.
//
// Counts are plain (non-atomic): the object model is single-threaded.

use std::cell::Cell;

use tracing::{error, trace};

use crate::class::{Class, Closure, Instance};
use crate::list::List;
use crate::record::Record;
use crate::string::AngaraString;
use crate::value::Value;

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    String = 0,
    List = 1,
    Record = 2,
    Closure = 3,
    Class = 4,
    Instance = 5,
    /// Reserved, never constructed.
    Thread = 6,
    /// Reserved, never constructed.
    Mutex = 7,
}

/// Header shared by every heap object.
#[repr(C)]
#[derive(Debug)]
pub struct Object {
    pub kind: ObjectKind,
    pub refcount: usize,
}

#[cfg(target_pointer_width = "64")]
const _: () = assert!(std::mem::size_of::<Object>() == 16);

impl Object {
    pub(crate) fn new(kind: ObjectKind) -> Self {
        Object { kind, refcount: 1 }
    }
}

/// A `#[repr(C)]` object body whose first field is an [`Object`] header of
/// kind `KIND`.
///
/// # Safety
///
/// Implementors must be `#[repr(C)]` with the header first and must only
/// ever construct that header with `Object::new(Self::KIND)`.
pub(crate) unsafe trait HeapObject: Sized {
    const KIND: ObjectKind;
}

thread_local! {
    static LIVE_OBJECTS: Cell<usize> = const { Cell::new(0) };
}

/// Number of heap objects allocated on this thread and not yet destroyed.
pub fn live_objects() -> usize {
    LIVE_OBJECTS.with(Cell::get)
}

/// Move a body to the heap and return its first reference.
pub(crate) fn alloc<T: HeapObject>(body: T) -> Value {
    let ptr = Box::into_raw(Box::new(body));
    LIVE_OBJECTS.with(|n| n.set(n.get() + 1));
    trace!(kind = ?T::KIND, "alloc");
    Value::object(ptr.cast::<Object>())
}

/// Add a strong reference. No-op for primitives.
pub fn incref(value: Value) {
    if let Some(obj) = value.as_object() {
        // SAFETY: an object-ref Value points at a live header
        unsafe { (*obj).refcount += 1 };
    }
}

/// Drop a strong reference, destroying the object when it was the last.
/// No-op for primitives.
pub fn decref(value: Value) {
    let Some(obj) = value.as_object() else {
        return;
    };

    // SAFETY: an object-ref Value points at a live header
    let last = unsafe {
        debug_assert!((*obj).refcount > 0, "decref of a dead object");
        (*obj).refcount -= 1;
        (*obj).refcount == 0
    };

    if last {
        // SAFETY: refcount just reached zero, nobody else holds the object
        unsafe { destroy(obj) };
    }
}

/// Current strong count (0 for primitives).
pub fn refcount(value: Value) -> usize {
    // SAFETY: an object-ref Value points at a live header
    value.as_object().map_or(0, |obj| unsafe { (*obj).refcount })
}

/// Free an object whose refcount reached zero.
///
/// # Safety
///
/// `obj` must be a header produced by [`alloc`] with refcount zero.
unsafe fn destroy(obj: *mut Object) {
    let kind = (*obj).kind;
    trace!(?kind, "destroy");

    match kind {
        ObjectKind::String => drop(Box::from_raw(obj.cast::<AngaraString>())),
        ObjectKind::List => drop(Box::from_raw(obj.cast::<List>())),
        ObjectKind::Record => drop(Box::from_raw(obj.cast::<Record>())),
        ObjectKind::Closure => drop(Box::from_raw(obj.cast::<Closure>())),
        ObjectKind::Class => drop(Box::from_raw(obj.cast::<Class>())),
        ObjectKind::Instance => drop(Box::from_raw(obj.cast::<Instance>())),
        ObjectKind::Thread | ObjectKind::Mutex => {
            error!(?kind, "destroying a reserved object kind; leaking it");
            return;
        }
    }

    LIVE_OBJECTS.with(|n| n.set(n.get().saturating_sub(1)));
}

#[cfg(test)]
mod tests;
