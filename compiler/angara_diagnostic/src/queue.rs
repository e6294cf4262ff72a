//! Diagnostic queue: collects, deduplicates, and sorts diagnostics.
//!
//! Semantic analysis keeps going after an error so one run reports as many
//! problems as possible. The queue keeps that from turning into noise:
//! - an error limit (0 = unlimited)
//! - same-line deduplication of syntax errors
//! - same-line, same-message deduplication of other errors

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed, Span};

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 20,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct Queued {
    diagnostic: Diagnostic,
    line: u32,
    column: u32,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DiagnosticQueue {
    queued: Vec<Queued>,
    error_count: usize,
    warning_count: usize,
    last_syntax_line: Option<u32>,
    last_error: Option<(u32, String)>,
    limit_hit: bool,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::with_config(DiagnosticConfig::default())
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..DiagnosticQueue::default()
        }
    }

    /// Add a diagnostic at a 1-based position.
    ///
    /// Returns `false` when the diagnostic was filtered out.
    pub fn add(&mut self, diagnostic: Diagnostic, line: u32, column: u32) -> bool {
        let is_error = diagnostic.is_error();
        if is_error && self.limit_reached() {
            self.limit_hit = true;
            return false;
        }
        if is_error && self.config.deduplicate && self.is_duplicate(&diagnostic, line) {
            return false;
        }

        if is_error {
            if diagnostic.code.is_syntax_error() {
                self.last_syntax_line = Some(line);
            } else {
                self.last_error = Some((line, diagnostic.message.clone()));
            }
            self.error_count += 1;
        } else {
            self.warning_count += 1;
        }

        self.queued.push(Queued {
            diagnostic,
            line,
            column,
        });
        true
    }

    /// Report an error and receive proof that it was reported.
    ///
    /// The proof is returned even if the diagnostic itself was deduplicated
    /// or dropped by the limit: an error of that kind is already on record.
    pub fn emit_error(&mut self, diagnostic: Diagnostic, line: u32, column: u32) -> ErrorGuaranteed {
        debug_assert!(diagnostic.is_error());
        self.add(diagnostic, line, column);
        ErrorGuaranteed::new()
    }

    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        (self.error_count > 0).then(ErrorGuaranteed::new)
    }

    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.queued.iter().map(|q| &q.diagnostic)
    }

    /// Drain the queue in source order.
    ///
    /// Appends a "too many errors" note when the limit suppressed anything.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.queued.sort_by_key(|q| (q.line, q.column));
        let mut out: Vec<Diagnostic> = self.queued.drain(..).map(|q| q.diagnostic).collect();
        if self.limit_hit {
            out.push(too_many_errors(self.config.error_limit));
        }

        self.error_count = 0;
        self.warning_count = 0;
        self.last_syntax_line = None;
        self.last_error = None;
        self.limit_hit = false;
        out
    }

    fn is_duplicate(&self, diagnostic: &Diagnostic, line: u32) -> bool {
        if diagnostic.code.is_syntax_error() {
            return self.last_syntax_line == Some(line);
        }
        matches!(&self.last_error, Some((l, msg)) if *l == line && *msg == diagnostic.message)
    }
}

#[cold]
fn too_many_errors(limit: usize) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9002)
        .with_message(format!("aborting after {limit} errors"))
        .with_label(Span::DUMMY, "error limit reached")
}

#[cfg(test)]
mod tests;
