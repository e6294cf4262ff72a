//! Exception frames and non-local transfer.
//!
//! Try frames form an intrusive singly-linked stack whose top lives in
//! thread-local state. A frame is owned by whoever pushed it (a stack slot
//! in generated code, or [`try_catch`]) and is only linked while its try
//! block runs.
//!
//! There are two ways to resume at a frame:
//!
//! - **Jump frames** belong to generated code. It links the frame with
//!   [`angara_try_push`], calls `_setjmp(&frame.jmp)` itself, and a throw
//!   `longjmp`s back so that `_setjmp` returns non-zero.
//! - **Unwind frames** belong to Rust callers and native modules through
//!   [`try_catch`]. A throw unwinds with a private panic payload that
//!   `try_catch` catches; every boundary it crosses must be `"C-unwind"`.
//!
//! The thrown value waits in a thread-local slot until the handler takes it.

use std::cell::Cell;
use std::ffi::{c_char, CStr};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use tracing::debug;

use crate::display::repr;
use crate::object::{decref, incref};
use crate::string::{string_from, string_new};
use crate::value::Value;

// ── Frames ──────────────────────────────────────────────────────────────

/// Buffer for `setjmp`/`longjmp`.
///
/// Oversized to accommodate all platform `jmp_buf` layouts:
/// - x86-64 Linux: 200 bytes (8 × 25)
/// - x86-64 macOS: 148 bytes (4 × 37)
/// - aarch64: ~392 bytes
///
/// 512 bytes with 64-byte alignment covers all targets with margin.
#[repr(C, align(64))]
pub struct JmpBuf {
    _buf: [u8; 512],
}

impl JmpBuf {
    #[must_use]
    pub fn new() -> Self {
        JmpBuf { _buf: [0u8; 512] }
    }
}

impl Default for JmpBuf {
    fn default() -> Self {
        Self::new()
    }
}

extern "C" {
    /// Restore execution state saved by `_setjmp`. Never returns to caller.
    fn longjmp(buf: *mut JmpBuf, val: i32) -> !;
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// Resumed with `longjmp` into generated code.
    Jump = 0,
    /// Resumed by unwinding to [`try_catch`].
    Unwind = 1,
}

#[repr(C)]
pub struct TryFrame {
    prev: *mut TryFrame,
    kind: FrameKind,
    pub jmp: JmpBuf,
}

impl TryFrame {
    pub fn new(kind: FrameKind) -> Self {
        TryFrame {
            prev: ptr::null_mut(),
            kind,
            jmp: JmpBuf::new(),
        }
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }
}

impl Default for TryFrame {
    fn default() -> Self {
        Self::new(FrameKind::Jump)
    }
}

/// Panic payload carrying a throw to an unwind frame. The value itself
/// travels in `CURRENT_EXCEPTION`.
struct Thrown;

thread_local! {
    static TOP_FRAME: Cell<*mut TryFrame> = const { Cell::new(ptr::null_mut()) };
    static CURRENT_EXCEPTION: Cell<Value> = const { Cell::new(Value::NIL) };
}

fn link(frame: *mut TryFrame) {
    TOP_FRAME.with(|top| {
        // SAFETY: caller guarantees `frame` outlives its time on the stack
        unsafe { (*frame).prev = top.get() };
        top.set(frame);
    });
}

fn unlink_top() -> Option<*mut TryFrame> {
    TOP_FRAME.with(|top| {
        let frame = top.get();
        if frame.is_null() {
            return None;
        }
        // SAFETY: linked frames are live
        top.set(unsafe { (*frame).prev });
        Some(frame)
    })
}

/// Number of linked frames on this thread.
pub fn try_depth() -> usize {
    let mut depth = 0;
    let mut frame = TOP_FRAME.with(Cell::get);
    while !frame.is_null() {
        depth += 1;
        // SAFETY: linked frames are live
        frame = unsafe { (*frame).prev };
    }
    depth
}

/// Link a jump frame owned by generated code.
///
/// The caller then runs `_setjmp(&mut frame.jmp)`: zero on the direct path,
/// non-zero after a throw resumed here (the frame is already unlinked then).
#[no_mangle]
pub extern "C" fn angara_try_push(frame: *mut TryFrame) {
    if frame.is_null() {
        return;
    }
    // SAFETY: generated code passes a frame in its own stack slot
    unsafe { (*frame).kind = FrameKind::Jump };
    link(frame);
}

/// Unlink the top frame on normal exit from a try block.
#[no_mangle]
pub extern "C" fn angara_try_end() {
    if unlink_top().is_none() {
        debug!("try_end with no active frame");
    }
}

// ── Throwing ────────────────────────────────────────────────────────────

/// Raise `value`, taking a new reference to it for the handler.
pub fn throw(value: Value) -> ! {
    incref(value);
    raise_owned(value)
}

/// Raise a fresh String holding `message`.
pub fn throw_error(message: &str) -> ! {
    raise_owned(string_from(message))
}

/// Raise a value whose reference the caller hands over.
///
/// A jump frame is resumed with `longjmp`, which skips destructors, so
/// callers must not hold owned Rust values (`String`, `Vec`, ...) in their
/// own frame when they call this.
pub(crate) fn raise_owned(value: Value) -> ! {
    let Some(frame) = unlink_top() else {
        unhandled(value)
    };

    let previous = CURRENT_EXCEPTION.with(|slot| slot.replace(value));
    decref(previous);

    // SAFETY: the frame was linked, so its owner is still on the stack
    let kind = unsafe { (*frame).kind };
    debug!(?kind, exception = %repr(value), "throw");
    match kind {
        // SAFETY: generated code called `_setjmp` on this buffer and its
        // activation is still live
        FrameKind::Jump => unsafe { longjmp(&mut (*frame).jmp, 1) },
        FrameKind::Unwind => panic::resume_unwind(Box::new(Thrown)),
    }
}

fn unhandled(value: Value) -> ! {
    eprintln!("Unhandled exception: {}", repr(value));
    std::process::exit(1)
}

#[no_mangle]
pub extern "C-unwind" fn angara_throw(value: Value) -> ! {
    throw(value)
}

/// Throw a String built from a NUL-terminated message.
#[no_mangle]
pub extern "C-unwind" fn angara_throw_error(message: *const c_char) -> ! {
    let error = if message.is_null() {
        string_from("error")
    } else {
        // SAFETY: caller passes a NUL-terminated string
        string_new(unsafe { CStr::from_ptr(message) }.to_bytes())
    };
    raise_owned(error)
}

// ── Handling ────────────────────────────────────────────────────────────

/// The pending exception (borrowed), nil when none.
pub fn current_exception() -> Value {
    CURRENT_EXCEPTION.with(Cell::get)
}

/// Take the pending exception, leaving nil. The caller owns the result.
pub fn take_exception() -> Value {
    CURRENT_EXCEPTION.with(|slot| slot.replace(Value::NIL))
}

#[no_mangle]
pub extern "C" fn angara_current_exception() -> Value {
    current_exception()
}

#[no_mangle]
pub extern "C" fn angara_take_exception() -> Value {
    take_exception()
}

/// Run `body` under an unwind frame.
///
/// Returns `Err` with the thrown value (owned by the caller) when `body`
/// throws to this frame. Other panics pass through untouched.
pub fn try_catch<R>(body: impl FnOnce() -> R) -> Result<R, Value> {
    let mut frame = TryFrame::new(FrameKind::Unwind);
    let frame_ptr: *mut TryFrame = &mut frame;
    link(frame_ptr);

    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(result) => {
            unlink_through(frame_ptr);
            Ok(result)
        }
        // The throw already unlinked this frame.
        Err(payload) if payload.is::<Thrown>() => Err(take_exception()),
        Err(payload) => {
            unlink_through(frame_ptr);
            panic::resume_unwind(payload)
        }
    }
}

/// Drop `frame` and anything a misbehaving body left above it.
fn unlink_through(frame: *mut TryFrame) {
    // SAFETY: `frame` is still on the caller's stack
    let prev = unsafe { (*frame).prev };
    TOP_FRAME.with(|top| top.set(prev));
}

#[cfg(test)]
mod tests;
