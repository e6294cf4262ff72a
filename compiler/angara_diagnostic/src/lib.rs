//! Diagnostic system for the Angara compiler front-end.
//!
//! A diagnostic carries:
//! - an error code for searchability
//! - a message (what went wrong)
//! - labeled spans (where it went wrong)
//! - notes and help lines (why, and how to fix it)
//!
//! Semantic errors accumulate in a [`DiagnosticQueue`] so one compilation
//! reports as many problems as it can find. [`ErrorGuaranteed`] is the
//! proof-of-emission token returned by the queue.
//!
//! Rendering follows the `file:line:col: severity[CODE]: message`
//! convention, see [`emitter::TextEmitter`].

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod line_index;
pub mod queue;
mod span;

pub use diagnostic::{
    duplicate_declaration, unknown_identifier, unknown_module, Diagnostic, Label, Severity,
};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
pub use span::Span;
