//! Angara Runtime Library (`libangara_rt`)
//!
//! Runtime support for compiled Angara programs: the tagged [`Value`] ABI,
//! reference-counted heap objects, exception frames, print and comparison
//! glue, and the native module ABI.
//!
//! # Build Modes
//!
//! - **rlib**: for the compiler and for tests
//! - **staticlib**: linked into compiled programs (`libangara_rt.a`)
//!
//! # Function Categories
//!
//! - **Values**: [`value`], constructors and predicates
//! - **Reference Counting**: [`incref`], [`decref`], [`object::live_objects`]
//! - **Objects**: [`string`], [`list`], [`record`], [`class`]
//! - **Exceptions**: [`exception`], `angara_try_push`, `angara_throw`
//! - **Glue**: [`display`] and [`format`]
//! - **Native modules**: [`native`]
//!
//! # Safety
//!
//! C entry points use `#[no_mangle]` and `extern "C"` (or `"C-unwind"` where
//! an exception may pass through). They take raw pointers from generated
//! code or native modules, which guarantee their validity. They are not
//! marked `unsafe` because they are FFI entry points, not Rust API functions.
//!
//! The object model is single-threaded: `Value` is neither `Send` nor `Sync`
//! and refcounts are plain integers.

#![warn(clippy::allow_attributes_without_reason)]
#![allow(
    unsafe_code,
    reason = "C-ABI runtime functions require unsafe for raw pointer operations"
)]
#![allow(
    clippy::not_unsafe_ptr_arg_deref,
    reason = "FFI entry points receive pointers from generated code which guarantees validity"
)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_ptr_alignment,
    reason = "FFI code uses i32/i64 for ABI compatibility; casts are intentional"
)]
#![allow(
    clippy::missing_safety_doc,
    reason = "safety contracts are documented on the module ABI, not per entry point"
)]

use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

pub mod class;
mod config;
pub mod display;
pub mod exception;
pub mod format;
pub mod list;
pub mod native;
pub mod object;
pub mod record;
pub mod string;
pub mod value;

pub use config::{RuntimeConfig, LOG_VAR, MODULE_PATH_VAR};
pub use display::{is_truthy, print_values, repr, value_len, values_equal};
pub use exception::{current_exception, take_exception, throw, throw_error, try_catch};
pub use object::{decref, incref, refcount, ObjectKind};
pub use value::{Value, ValueTag};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for the runtime.
///
/// Safe to call multiple times. Does nothing unless `ANGARA_LOG` (or
/// `RUST_LOG`) is set, e.g. `ANGARA_LOG=angara_rt=debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Some(directives) = RuntimeConfig::from_env().log_filter else {
            return;
        };
        let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"));
        // Another subscriber may already be installed by an embedding host.
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(filter)
            .try_init();
    });
}

/// Print `message` and terminate with status 1.
pub(crate) fn fatal(message: &str) -> ! {
    eprintln!("angara: fatal: {message}");
    std::process::exit(1)
}

// ── Entry point wrapper ─────────────────────────────────────────────────

/// Run a compiled program's `main` under a top-level handler.
///
/// The generated C `main()` calls this instead of calling the program
/// directly. Returns 0 on normal completion and 1 when an exception escapes
/// (after printing it) or the program panics.
#[no_mangle]
pub extern "C" fn angara_run_main(main_fn: extern "C-unwind" fn()) -> i32 {
    init_tracing();

    // Only Rust-ABI fn pointers implement `FnOnce`.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| try_catch(|| main_fn())));
    match outcome {
        Ok(Ok(())) => 0,
        Ok(Err(exception)) => {
            eprintln!("Unhandled exception: {}", repr(exception));
            decref(exception);
            1
        }
        Err(_) => {
            eprintln!("angara: runtime panic");
            1
        }
    }
}
