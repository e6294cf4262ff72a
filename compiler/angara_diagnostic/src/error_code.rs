use std::fmt;

/// Error codes for compiler diagnostics.
///
/// Format: E#### where the first digit names the phase:
/// - E0xxx: lexer errors (reported by the external lexer)
/// - E1xxx: parser errors (reported by the external parser)
/// - E2xxx: semantic errors
/// - E9xxx: internal/limits
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorCode {
    /// Unterminated string literal
    E0001,
    /// Invalid character in source
    E0002,
    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Type mismatch
    E2001,
    /// Assignment to a constant
    E2002,
    /// Unknown identifier
    E2003,
    /// Duplicate declaration in the same scope
    E2004,
    /// Wrong number of arguments
    E2005,
    /// Unknown module
    E2006,
    /// Value is not callable
    E2007,
    /// Internal compiler error
    E9001,
    /// Too many errors
    E9002,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E9001,
        ErrorCode::E9002,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// Short human description, used by `--explain`-style tooling.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "unterminated string literal",
            ErrorCode::E0002 => "invalid character",
            ErrorCode::E1001 => "unexpected token",
            ErrorCode::E1002 => "expected expression",
            ErrorCode::E2001 => "type mismatch",
            ErrorCode::E2002 => "assignment to constant",
            ErrorCode::E2003 => "unknown identifier",
            ErrorCode::E2004 => "duplicate declaration",
            ErrorCode::E2005 => "wrong number of arguments",
            ErrorCode::E2006 => "unknown module",
            ErrorCode::E2007 => "value is not callable",
            ErrorCode::E9001 => "internal compiler error",
            ErrorCode::E9002 => "too many errors",
        }
    }

    pub fn is_lexer_error(&self) -> bool {
        self.as_str().starts_with("E0")
    }

    pub fn is_parser_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Lexer and parser errors both count as syntax errors for deduplication.
    pub fn is_syntax_error(&self) -> bool {
        self.is_lexer_error() || self.is_parser_error()
    }

    pub fn is_semantic_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    /// Parse an `E####` string back into a code.
    pub fn from_name(name: &str) -> Option<ErrorCode> {
        Self::ALL.iter().copied().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests;
