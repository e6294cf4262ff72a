//! Printing, truthiness, length and equality.

use std::fmt::Write as _;
use std::io::{self, Write as _};

use crate::class::{Class, Closure, Instance};
use crate::format::format_g;
use crate::list::list_elements;
use crate::object::{Object, ObjectKind};
use crate::record::{record_get_index, record_len};
use crate::string::{string_bytes, string_equals, string_from, string_len};
use crate::value::{Value, ValueTag};

/// Render `value` as `print` shows it.
pub fn repr(value: Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, &mut Vec::new());
    out
}

/// Fresh String object holding the rendering of `value`.
pub fn value_to_string(value: Value) -> Value {
    string_from(&repr(value))
}

fn write_value(out: &mut String, value: Value, open: &mut Vec<*mut Object>) {
    match value.tag() {
        ValueTag::Nil => out.push_str("nil"),
        ValueTag::Bool => out.push_str(if value.as_bool() == Some(true) { "true" } else { "false" }),
        ValueTag::I64 => {
            let _ = write!(out, "{}", value.as_int().unwrap_or_default());
        }
        ValueTag::F64 => out.push_str(&format_g(value.as_float().unwrap_or_default())),
        ValueTag::Object => write_object(out, value, open),
    }
}

fn write_object(out: &mut String, value: Value, open: &mut Vec<*mut Object>) {
    let (Some(kind), Some(ptr)) = (value.kind(), value.as_object()) else {
        return;
    };

    // A container reached again while it is being printed.
    if open.contains(&ptr) {
        out.push_str(if kind == ObjectKind::Record { "{...}" } else { "[...]" });
        return;
    }

    match kind {
        ObjectKind::String => {
            out.push_str(&String::from_utf8_lossy(string_bytes(&value).unwrap_or_default()));
        }
        ObjectKind::List => {
            open.push(ptr);
            out.push('[');
            for (i, element) in list_elements(value).into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, element, open);
            }
            out.push(']');
            open.pop();
        }
        ObjectKind::Record => {
            open.push(ptr);
            out.push('{');
            for i in 0..record_len(value) {
                let Some((key, field)) = record_get_index(value, i) else {
                    break;
                };
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&key);
                out.push_str(": ");
                write_value(out, field, open);
            }
            out.push('}');
            open.pop();
        }
        ObjectKind::Class => {
            // SAFETY: kind checked above
            let name = unsafe { (*ptr.cast::<Class>()).name() };
            let _ = write!(out, "<class {name}>");
        }
        ObjectKind::Instance => {
            // SAFETY: kind checked above; an instance keeps its class alive
            let name = unsafe {
                let class = (*ptr.cast::<Instance>()).class_value();
                class.downcast::<Class>().map(|c| (*c).name()).unwrap_or_default()
            };
            let _ = write!(out, "<instance of {name}>");
        }
        ObjectKind::Closure => {
            // SAFETY: kind checked above
            let closure = unsafe { &*ptr.cast::<Closure>() };
            if closure.is_native() {
                out.push_str("<native fn>");
            } else {
                let _ = write!(out, "<fn {}>", closure.name());
            }
        }
        ObjectKind::Thread => out.push_str("<thread>"),
        ObjectKind::Mutex => out.push_str("<mutex>"),
    }
}

/// Print `args` separated by spaces, then a newline.
pub fn print_values(args: &[Value]) {
    let line = args.iter().map(|&v| repr(v)).collect::<Vec<_>>().join(" ");
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{line}");
}

#[no_mangle]
pub extern "C" fn angara_print(argc: i32, args: *const Value) {
    print_values(args_slice(argc, args));
}

/// View a C `(argc, argv)` pair as a slice.
pub(crate) fn args_slice<'a>(argc: i32, args: *const Value) -> &'a [Value] {
    match usize::try_from(argc) {
        Ok(n) if n > 0 && !args.is_null() => {
            // SAFETY: callers pass `argc` initialized Values at `args`
            unsafe { std::slice::from_raw_parts(args, n) }
        }
        _ => &[],
    }
}

pub fn is_truthy(value: Value) -> bool {
    match value.tag() {
        ValueTag::Nil => false,
        ValueTag::Bool => value.as_bool() == Some(true),
        ValueTag::I64 => value.as_int() != Some(0),
        ValueTag::F64 => value.as_float().is_some_and(|f| f != 0.0),
        ValueTag::Object => true,
    }
}

#[no_mangle]
pub extern "C" fn angara_is_truthy(value: Value) -> bool {
    is_truthy(value)
}

/// Bytes of a String, elements of a List, entries of a Record; else 0.
pub fn value_len(value: Value) -> usize {
    match value.kind() {
        Some(ObjectKind::String) => string_len(value),
        Some(ObjectKind::List) => crate::list::list_len(value),
        Some(ObjectKind::Record) => record_len(value),
        _ => 0,
    }
}

#[no_mangle]
pub extern "C" fn angara_len(value: Value) -> i64 {
    i64::try_from(value_len(value)).unwrap_or(i64::MAX)
}

/// Language equality: numbers by value across int/float, Strings by bytes,
/// other objects by identity.
pub fn values_equal(a: Value, b: Value) -> bool {
    match (a.tag(), b.tag()) {
        (ValueTag::Nil, ValueTag::Nil) => true,
        (ValueTag::Bool, ValueTag::Bool) => a.as_bool() == b.as_bool(),
        (ValueTag::I64, ValueTag::I64) => a.as_int() == b.as_int(),
        (ValueTag::I64 | ValueTag::F64, ValueTag::I64 | ValueTag::F64) => {
            a.as_number() == b.as_number()
        }
        (ValueTag::Object, ValueTag::Object) => {
            a.ptr_eq(b) || (a.is_string() && string_equals(a, b))
        }
        _ => false,
    }
}

#[no_mangle]
pub extern "C" fn angara_equals(a: Value, b: Value) -> bool {
    values_equal(a, b)
}

/// Short type name used in runtime error messages.
pub fn type_name(value: Value) -> &'static str {
    match value.tag() {
        ValueTag::Nil => "nil",
        ValueTag::Bool => "bool",
        ValueTag::I64 => "i64",
        ValueTag::F64 => "f64",
        ValueTag::Object => match value.kind() {
            Some(ObjectKind::String) => "string",
            Some(ObjectKind::List) => "list",
            Some(ObjectKind::Record) => "record",
            Some(ObjectKind::Closure) => "function",
            Some(ObjectKind::Class) => "class",
            Some(ObjectKind::Instance) => "instance",
            Some(ObjectKind::Thread) => "thread",
            Some(ObjectKind::Mutex) => "mutex",
            None => "object",
        },
    }
}
