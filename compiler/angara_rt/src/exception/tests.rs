use pretty_assertions::assert_eq;

use super::*;
use crate::object::{live_objects, refcount};
use crate::string::string_to_rust;

extern "C" {
    /// Uses `_setjmp` (POSIX), like generated code: no signal mask.
    #[link_name = "_setjmp"]
    fn c_setjmp(buf: *mut JmpBuf) -> i32;
}

/// Link `frame` as a jump frame and run `body` under it, the way generated
/// code does. Returns what `_setjmp` returned last. Nothing in this frame
/// has a destructor, so the `longjmp` skips nothing.
#[inline(never)]
fn under_jump_frame(frame: &mut TryFrame, body: impl FnOnce()) -> i32 {
    angara_try_push(frame);
    // SAFETY: `frame` outlives this call and is unlinked before any resume
    let resumed = unsafe { c_setjmp(&mut frame.jmp) };
    if resumed == 0 {
        body();
        angara_try_end();
    }
    resumed
}

#[test]
fn push_then_end_restores_depth() {
    let depth = try_depth();
    let mut frame = TryFrame::default();
    angara_try_push(&mut frame);
    assert_eq!(try_depth(), depth + 1);
    assert_eq!(frame.kind(), FrameKind::Jump);
    angara_try_end();
    assert_eq!(try_depth(), depth);
}

#[test]
fn try_end_without_frame_is_harmless() {
    assert_eq!(try_depth(), 0);
    angara_try_end();
    assert_eq!(try_depth(), 0);
}

#[test]
fn null_frame_is_ignored() {
    angara_try_push(ptr::null_mut());
    assert_eq!(try_depth(), 0);
}

#[test]
fn body_without_throw_returns_ok() {
    let result = try_catch(|| {
        assert_eq!(try_depth(), 1);
        7
    });
    assert_eq!(result.ok(), Some(7));
    assert_eq!(try_depth(), 0);
}

#[test]
fn thrown_error_becomes_a_string() {
    let before = live_objects();
    let result: Result<(), Value> = try_catch(|| throw_error("bad"));
    let err = result.err().unwrap_or(Value::NIL);
    assert_eq!(string_to_rust(err).as_deref(), Some("bad"));
    assert_eq!(try_depth(), 0);
    assert!(current_exception().is_nil());
    decref(err);
    assert_eq!(live_objects(), before);
}

#[test]
fn throw_takes_one_reference() {
    let value = string_from("boom");
    let result: Result<(), Value> = try_catch(|| throw(value));
    let caught = result.err().unwrap_or(Value::NIL);
    assert!(caught.ptr_eq(value));
    assert_eq!(refcount(value), 2);
    decref(caught);
    decref(value);
}

#[test]
fn throw_longjmps_to_a_jump_frame() {
    let value = string_from("boom");
    let mut frame = TryFrame::default();
    let resumed = under_jump_frame(&mut frame, || throw(value));

    assert_ne!(resumed, 0);
    assert_eq!(try_depth(), 0);
    assert!(current_exception().ptr_eq(value));
    assert_eq!(refcount(value), 2);
    decref(take_exception());
    decref(value);
}

#[test]
fn jump_frame_body_without_throw_returns_zero() {
    let mut frame = TryFrame::default();
    assert_eq!(under_jump_frame(&mut frame, || {}), 0);
    assert_eq!(try_depth(), 0);
}

#[test]
fn native_error_longjmps_without_leaking() {
    let before = live_objects();
    let mut frame = TryFrame::default();
    let resumed = under_jump_frame(&mut frame, || angara_throw_error(c"disk full".as_ptr()));

    assert_ne!(resumed, 0);
    let err = take_exception();
    assert_eq!(string_to_rust(err).as_deref(), Some("disk full"));
    decref(err);
    assert_eq!(live_objects(), before);
}

#[test]
fn non_utf8_error_text_is_kept() {
    let result: Result<(), Value> = try_catch(|| angara_throw_error(c"bad \xff".as_ptr()));
    let err = result.err().unwrap_or(Value::NIL);
    assert_eq!(crate::string::string_len(err), 5);
    decref(err);
}

#[test]
fn primitives_can_be_thrown() {
    let result: Result<(), Value> = try_catch(|| throw(Value::int(42)));
    assert_eq!(result.err().and_then(Value::as_int), Some(42));
}

#[test]
fn innermost_frame_catches() {
    let outer = try_catch(|| {
        let inner: Result<(), Value> = try_catch(|| throw(Value::int(1)));
        assert_eq!(try_depth(), 1);
        inner.err().and_then(Value::as_int)
    });
    assert_eq!(outer.ok().flatten(), Some(1));
    assert_eq!(try_depth(), 0);
}

#[test]
fn rethrow_reaches_the_outer_frame() {
    let outer: Result<(), Value> = try_catch(|| {
        let inner: Result<(), Value> = try_catch(|| throw_error("first"));
        if let Err(exception) = inner {
            throw(exception);
        }
    });
    let err = outer.err().unwrap_or(Value::NIL);
    assert_eq!(string_to_rust(err).as_deref(), Some("first"));
    assert_eq!(refcount(err), 2);
    decref(err);
    decref(err);
}

#[test]
fn throw_through_native_boundary() {
    extern "C-unwind" fn raising(_argc: i32, _args: *const Value) -> Value {
        angara_throw_error(c"from native".as_ptr())
    }
    let result = try_catch(|| raising(0, ptr::null()));
    let err = result.err().unwrap_or(Value::NIL);
    assert_eq!(string_to_rust(err).as_deref(), Some("from native"));
    decref(err);
}

#[test]
fn foreign_panics_pass_through_and_unlink() {
    let outcome = panic::catch_unwind(|| {
        let _ = try_catch(|| panic!("not an exception"));
    });
    assert!(outcome.is_err());
    assert_eq!(try_depth(), 0);
}

#[test]
fn take_exception_clears_the_slot() {
    let _ = try_catch(|| throw(Value::TRUE));
    assert!(current_exception().is_nil());
    assert!(take_exception().is_nil());
}
