//! The tagged runtime value.
//!
//! Every Angara expression evaluates to a [`Value`]: a 16-byte `#[repr(C)]`
//! pair of a `u32` tag and an 8-byte payload. Primitives live inline; heap
//! data is reached through an object reference whose lifetime is governed
//! by explicit reference counting (see [`crate::object`]).
//!
//! `Value` is `Copy` because it is a handle. Copying never touches the
//! refcount; `incref`/`decref` are the only operations that do.

use std::fmt;

use crate::object::{HeapObject, Object, ObjectKind};

/// Discriminant of a [`Value`].
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueTag {
    Nil = 0,
    Bool = 1,
    I64 = 2,
    F64 = 3,
    Object = 4,
}

/// Payload of a [`Value`]. Which field is live is decided by the tag.
#[repr(C)]
#[derive(Clone, Copy)]
pub union Payload {
    pub int: i64,
    pub float: f64,
    pub object: *mut Object,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct Value {
    pub tag: ValueTag,
    pub payload: Payload,
}

const _: () = assert!(std::mem::size_of::<Value>() == 16);
const _: () = assert!(std::mem::align_of::<Value>() == 8);

impl Value {
    pub const NIL: Value = Value {
        tag: ValueTag::Nil,
        payload: Payload { int: 0 },
    };

    pub const TRUE: Value = Value::bool(true);
    pub const FALSE: Value = Value::bool(false);

    #[inline]
    pub const fn bool(b: bool) -> Value {
        Value {
            tag: ValueTag::Bool,
            payload: Payload { int: b as i64 },
        }
    }

    #[inline]
    pub const fn int(n: i64) -> Value {
        Value {
            tag: ValueTag::I64,
            payload: Payload { int: n },
        }
    }

    #[inline]
    pub const fn float(f: f64) -> Value {
        Value {
            tag: ValueTag::F64,
            payload: Payload { float: f },
        }
    }

    /// Wrap a live heap object. The caller hands over the reference it holds.
    #[inline]
    pub(crate) fn object(ptr: *mut Object) -> Value {
        debug_assert!(!ptr.is_null());
        Value {
            tag: ValueTag::Object,
            payload: Payload { object: ptr },
        }
    }

    #[inline]
    pub fn tag(self) -> ValueTag {
        self.tag
    }

    #[inline]
    pub fn is_nil(self) -> bool {
        self.tag == ValueTag::Nil
    }

    #[inline]
    pub fn is_bool(self) -> bool {
        self.tag == ValueTag::Bool
    }

    #[inline]
    pub fn is_int(self) -> bool {
        self.tag == ValueTag::I64
    }

    #[inline]
    pub fn is_float(self) -> bool {
        self.tag == ValueTag::F64
    }

    #[inline]
    pub fn is_number(self) -> bool {
        matches!(self.tag, ValueTag::I64 | ValueTag::F64)
    }

    #[inline]
    pub fn is_object(self) -> bool {
        self.tag == ValueTag::Object
    }

    pub fn as_bool(self) -> Option<bool> {
        // SAFETY: the tag says `int` is live
        self.is_bool().then(|| unsafe { self.payload.int } != 0)
    }

    pub fn as_int(self) -> Option<i64> {
        // SAFETY: the tag says `int` is live
        self.is_int().then(|| unsafe { self.payload.int })
    }

    pub fn as_float(self) -> Option<f64> {
        // SAFETY: the tag says `float` is live
        self.is_float().then(|| unsafe { self.payload.float })
    }

    /// Numeric view with integers widened to `f64`.
    #[allow(clippy::cast_precision_loss, reason = "widening follows language semantics")]
    pub fn as_number(self) -> Option<f64> {
        match self.tag {
            ValueTag::I64 => self.as_int().map(|n| n as f64),
            ValueTag::F64 => self.as_float(),
            _ => None,
        }
    }

    pub fn as_object(self) -> Option<*mut Object> {
        // SAFETY: the tag says `object` is live
        self.is_object().then(|| unsafe { self.payload.object })
    }

    /// Kind of the referenced heap object, if any.
    pub fn kind(self) -> Option<ObjectKind> {
        // SAFETY: object references point at a live header while referenced
        self.as_object().map(|obj| unsafe { (*obj).kind })
    }

    pub fn is_kind(self, kind: ObjectKind) -> bool {
        self.kind() == Some(kind)
    }

    pub fn is_string(self) -> bool {
        self.is_kind(ObjectKind::String)
    }

    pub fn is_list(self) -> bool {
        self.is_kind(ObjectKind::List)
    }

    pub fn is_record(self) -> bool {
        self.is_kind(ObjectKind::Record)
    }

    pub fn is_closure(self) -> bool {
        self.is_kind(ObjectKind::Closure)
    }

    pub fn is_class(self) -> bool {
        self.is_kind(ObjectKind::Class)
    }

    pub fn is_instance(self) -> bool {
        self.is_kind(ObjectKind::Instance)
    }

    /// Typed pointer to the object body when the kind matches.
    pub(crate) fn downcast<T: HeapObject>(self) -> Option<*mut T> {
        if self.kind() == Some(T::KIND) {
            self.as_object().map(<*mut Object>::cast::<T>)
        } else {
            None
        }
    }

    /// Same heap object, or both nil.
    pub fn ptr_eq(self, other: Value) -> bool {
        match (self.as_object(), other.as_object()) {
            (Some(a), Some(b)) => std::ptr::eq(a, b),
            _ => self.is_nil() && other.is_nil(),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::NIL
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::float(f)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            ValueTag::Nil => f.write_str("Nil"),
            ValueTag::Bool => write!(f, "Bool({})", self.as_bool().unwrap_or_default()),
            ValueTag::I64 => write!(f, "I64({})", self.as_int().unwrap_or_default()),
            ValueTag::F64 => write!(f, "F64({})", self.as_float().unwrap_or_default()),
            ValueTag::Object => match (self.kind(), self.as_object()) {
                (Some(kind), Some(ptr)) => write!(f, "{kind:?}@{ptr:p}"),
                _ => f.write_str("Object"),
            },
        }
    }
}
