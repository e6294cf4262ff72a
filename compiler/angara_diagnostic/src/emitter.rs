//! Diagnostic emitters.
//!
//! The compiler driver writes diagnostics to stderr as
//! `file:line:col: severity[CODE]: message` followed by indented
//! `= note:` / `= help:` lines. Labels other than the primary one are
//! rendered as `file:line:col: note: <label message>` lines so editors can
//! jump to them.

use std::io::{self, Write};

use crate::line_index::LineIndex;
use crate::Diagnostic;

pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            self.emit(diagnostic);
        }
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize);

    fn flush(&mut self);
}

/// Plain-text emitter for one source file.
pub struct TextEmitter<'a, W: Write> {
    out: W,
    path: &'a str,
    source: &'a str,
    index: LineIndex,
}

impl<'a, W: Write> TextEmitter<'a, W> {
    pub fn new(out: W, path: &'a str, source: &'a str) -> Self {
        TextEmitter {
            out,
            path,
            source,
            index: LineIndex::new(source),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_diagnostic(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        let (line, col) = diagnostic
            .primary_span()
            .map_or((1, 1), |span| self.index.line_col(self.source, span.start));
        writeln!(
            self.out,
            "{}:{line}:{col}: {}[{}]: {}",
            self.path, diagnostic.severity, diagnostic.code, diagnostic.message
        )?;

        for label in diagnostic.labels.iter().filter(|l| !l.is_primary) {
            let (line, col) = self.index.line_col(self.source, label.span.start);
            writeln!(self.out, "{}:{line}:{col}: note: {}", self.path, label.message)?;
        }
        for note in &diagnostic.notes {
            writeln!(self.out, "  = note: {note}")?;
        }
        for suggestion in &diagnostic.suggestions {
            writeln!(self.out, "  = help: {suggestion}")?;
        }
        Ok(())
    }
}

impl<W: Write> DiagnosticEmitter for TextEmitter<'_, W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        // A closed stderr is not worth aborting compilation over.
        let _ = self.write_diagnostic(diagnostic);
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        let _ = match (error_count, warning_count) {
            (0, 0) => Ok(()),
            (0, w) => writeln!(self.out, "{w} warning{} emitted", plural(w)),
            (e, 0) => writeln!(self.out, "{e} error{} emitted", plural(e)),
            (e, w) => writeln!(
                self.out,
                "{e} error{} and {w} warning{} emitted",
                plural(e),
                plural(w)
            ),
        };
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }
}
