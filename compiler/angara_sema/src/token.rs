//! The slice of a lexer token the semantic layer needs.

use angara_diagnostic::Span;

/// An identifier token as produced by the external lexer.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Token {
    pub lexeme: String,
    pub span: Span,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl Token {
    pub fn new(lexeme: impl Into<String>, span: Span, line: u32, column: u32) -> Self {
        Token {
            lexeme: lexeme.into(),
            span,
            line,
            column,
        }
    }

    /// A token for declarations with no source location (builtins, imports).
    pub fn synthetic(lexeme: impl Into<String>) -> Self {
        Token::new(lexeme, Span::DUMMY, 1, 1)
    }

    pub fn is_synthetic(&self) -> bool {
        self.span.is_dummy()
    }
}
