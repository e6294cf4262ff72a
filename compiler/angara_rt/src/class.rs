//! Closures, classes and instances.
//!
//! A class owns its method closures; each method closure points back at its
//! class without owning it. An instance owns one reference to its class and
//! to each of its field values. Cycles through instance fields are not
//! collected.

use std::cell::RefCell;
use std::ffi::{c_char, c_void, CStr, CString};
use std::ptr;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::exception::{raise_owned, throw_error};
use crate::native::{Finalizer, NativeFn};
use crate::object::{alloc, decref, incref, HeapObject, Object, ObjectKind};
use crate::string::string_from;
use crate::value::Value;

/// Entry point of a compiled script function. Receives its own closure so
/// generated code can reach captured state.
pub type ScriptEntry = extern "C-unwind" fn(closure: Value, argc: i32, args: *const Value) -> Value;

/// Static descriptor emitted by the code generator for each function.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ScriptFunction {
    pub name: *const c_char,
    /// Negative means variadic.
    pub arity: i32,
    pub entry: ScriptEntry,
}

enum Callable {
    Script(ScriptFunction),
    Native { function: NativeFn, arity: i32 },
}

#[repr(C)]
pub struct Closure {
    header: Object,
    name: CString,
    callable: Callable,
    /// Class this closure is a method of. Not owned.
    owner: *mut Class,
}

// SAFETY: repr(C), header first
unsafe impl HeapObject for Closure {
    const KIND: ObjectKind = ObjectKind::Closure;
}

impl Closure {
    fn arity(&self) -> i32 {
        match self.callable {
            Callable::Script(desc) => desc.arity,
            Callable::Native { arity, .. } => arity,
        }
    }

    pub(crate) fn is_native(&self) -> bool {
        matches!(self.callable, Callable::Native { .. })
    }

    pub(crate) fn name(&self) -> String {
        self.name.to_string_lossy().into_owned()
    }
}

#[repr(C)]
pub struct Class {
    header: Object,
    name: CString,
    methods: FxHashMap<String, Value>,
    /// Used for instances created without a finalizer of their own.
    finalizer: Option<Finalizer>,
}

// SAFETY: repr(C), header first
unsafe impl HeapObject for Class {
    const KIND: ObjectKind = ObjectKind::Class;
}

impl Class {
    pub(crate) fn name(&self) -> String {
        self.name.to_string_lossy().into_owned()
    }
}

impl Drop for Class {
    fn drop(&mut self) {
        for (_, method) in self.methods.drain() {
            if let Some(closure) = method.downcast::<Closure>() {
                // SAFETY: the class still holds a reference to the closure
                unsafe { (*closure).owner = ptr::null_mut() };
            }
            decref(method);
        }
    }
}

#[repr(C)]
pub struct Instance {
    header: Object,
    class: *mut Class,
    fields: FxHashMap<String, Value>,
    native_data: *mut c_void,
    finalizer: Option<Finalizer>,
}

// SAFETY: repr(C), header first
unsafe impl HeapObject for Instance {
    const KIND: ObjectKind = ObjectKind::Instance;
}

impl Instance {
    pub(crate) fn class_value(&self) -> Value {
        Value::object(self.class.cast::<Object>())
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        if let Some(finalizer) = self.finalizer {
            finalizer(self.native_data);
        }
        for (_, value) in self.fields.drain() {
            decref(value);
        }
        decref(self.class_value());
    }
}

fn c_name(name: &str) -> CString {
    CString::new(name.split('\0').next().unwrap_or_default()).unwrap_or_default()
}

// ── Closures ────────────────────────────────────────────────────────────

/// Closure over a native function. A negative `arity` accepts any count.
pub fn closure_new_native(name: &str, function: NativeFn, arity: i32) -> Value {
    alloc(Closure {
        header: Object::new(ObjectKind::Closure),
        name: c_name(name),
        callable: Callable::Native { function, arity },
        owner: ptr::null_mut(),
    })
}

/// Closure over a compiled script function.
pub fn closure_new_script(desc: &ScriptFunction) -> Value {
    let name = if desc.name.is_null() {
        CString::default()
    } else {
        // SAFETY: descriptors carry NUL-terminated static names
        unsafe { CStr::from_ptr(desc.name) }.to_owned()
    };
    alloc(Closure {
        header: Object::new(ObjectKind::Closure),
        name,
        callable: Callable::Script(*desc),
        owner: ptr::null_mut(),
    })
}

/// Call `closure` with `args`. Throws on a non-closure or an arity mismatch.
pub fn closure_call(closure: Value, args: &[Value]) -> Value {
    let Some(ptr) = closure.downcast::<Closure>() else {
        throw_error("value is not callable");
    };
    // SAFETY: kind checked by downcast
    let target = unsafe { &*ptr };

    let argc = i32::try_from(args.len()).unwrap_or(i32::MAX);
    let arity = target.arity();
    if arity >= 0 && arity != argc {
        // The formatted text is dropped before the throw can longjmp.
        let error = string_from(&format!(
            "{} expects {arity} argument{}, got {argc}",
            target.name(),
            if arity == 1 { "" } else { "s" },
        ));
        raise_owned(error);
    }

    match target.callable {
        Callable::Script(desc) => (desc.entry)(closure, argc, args.as_ptr()),
        Callable::Native { function, .. } => function(argc, args.as_ptr()),
    }
}

/// Class a method closure belongs to (borrowed), or nil.
pub fn closure_owner(closure: Value) -> Value {
    closure
        .downcast::<Closure>()
        // SAFETY: kind checked by downcast
        .map(|c| unsafe { (*c).owner })
        .filter(|owner| !owner.is_null())
        .map_or(Value::NIL, |owner| Value::object(owner.cast::<Object>()))
}

// ── Classes ─────────────────────────────────────────────────────────────

pub fn class_new(name: &str) -> Value {
    alloc(Class {
        header: Object::new(ObjectKind::Class),
        name: c_name(name),
        methods: FxHashMap::default(),
        finalizer: None,
    })
}

/// Install `closure` as method `name`. The caller's reference to the
/// closure moves into the class.
pub fn class_add_method(class: Value, name: &str, closure: Value) {
    let (Some(cls), Some(method)) = (class.downcast::<Class>(), closure.downcast::<Closure>())
    else {
        decref(closure);
        return;
    };
    // SAFETY: kinds checked by downcast
    let old = unsafe {
        (*method).owner = cls;
        (*cls).methods.insert(name.to_owned(), closure)
    };
    if let Some(old) = old {
        decref(old);
    }
}

/// Method `name` of `class` (borrowed), or nil.
pub fn class_find_method(class: Value, name: &str) -> Value {
    class
        .downcast::<Class>()
        // SAFETY: kind checked by downcast
        .and_then(|c| unsafe { (*c).methods.get(name).copied() })
        .unwrap_or(Value::NIL)
}

pub fn class_name(class: Value) -> Option<String> {
    // SAFETY: kind checked by downcast
    class.downcast::<Class>().map(|c| unsafe { (*c).name() })
}

thread_local! {
    /// Classes backing native instances, created on first use.
    static NATIVE_CLASSES: RefCell<FxHashMap<String, Value>> = RefCell::new(FxHashMap::default());
}

/// The class object native instances of `name` share (borrowed).
pub fn native_class(name: &str) -> Value {
    NATIVE_CLASSES.with(|classes| {
        *classes
            .borrow_mut()
            .entry(name.to_owned())
            .or_insert_with(|| {
                trace!(class = name, "registering native class");
                class_new(name)
            })
    })
}

/// Make `finalizer` the default for instances of native class `name`.
pub(crate) fn set_native_finalizer(name: &str, finalizer: Finalizer) {
    if let Some(cls) = native_class(name).downcast::<Class>() {
        // SAFETY: kind checked by downcast
        unsafe { (*cls).finalizer = Some(finalizer) };
    }
}

// ── Instances ───────────────────────────────────────────────────────────

fn new_instance(class: Value, native_data: *mut c_void, finalizer: Option<Finalizer>) -> Value {
    let Some(cls) = class.downcast::<Class>() else {
        return Value::NIL;
    };
    // SAFETY: kind checked by downcast
    let finalizer = finalizer.or(unsafe { (*cls).finalizer });
    incref(class);
    alloc(Instance {
        header: Object::new(ObjectKind::Instance),
        class: cls,
        fields: FxHashMap::default(),
        native_data,
        finalizer,
    })
}

/// New instance of `class` with no fields; nil if `class` is not a class.
pub fn instance_new(class: Value) -> Value {
    new_instance(class, ptr::null_mut(), None)
}

/// New instance wrapping native data. `finalizer`, or the class's own when
/// `None`, runs with `data` when the instance is destroyed.
pub fn native_instance_new(class: Value, data: *mut c_void, finalizer: Option<Finalizer>) -> Value {
    new_instance(class, data, finalizer)
}

fn with_instance<R>(instance: Value, f: impl FnOnce(&mut Instance) -> R) -> Option<R> {
    // SAFETY: kind checked by downcast; single-threaded access
    instance.downcast::<Instance>().map(|i| f(unsafe { &mut *i }))
}

pub fn instance_native_data(instance: Value) -> *mut c_void {
    with_instance(instance, |i| i.native_data).unwrap_or(ptr::null_mut())
}

/// Class of `instance` (borrowed), or nil.
pub fn instance_class(instance: Value) -> Value {
    with_instance(instance, |i| i.class_value()).unwrap_or(Value::NIL)
}

/// Field `name` (borrowed), or nil.
pub fn instance_get_field(instance: Value, name: &str) -> Value {
    with_instance(instance, |i| i.fields.get(name).copied())
        .flatten()
        .unwrap_or(Value::NIL)
}

/// Bind field `name`, taking a new reference to `value`.
pub fn instance_set_field(instance: Value, name: &str, value: Value) {
    if !instance.is_instance() {
        return;
    }
    incref(value);
    let replaced = with_instance(instance, |i| i.fields.insert(name.to_owned(), value));
    if let Some(Some(old)) = replaced {
        decref(old);
    }
}

/// Method `name` resolved on the instance's class (borrowed), or nil.
pub fn instance_find_method(instance: Value, name: &str) -> Value {
    class_find_method(instance_class(instance), name)
}
