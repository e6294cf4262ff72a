//! Signature strings of native functions.
//!
//! ```text
//! sig     := params "->" ret
//! params  := { tag } [ "..." ]
//! ret     := tag
//! tag     := "s" | "i" | "d" | "b" | "n" | "a" | "L" | "R" | "{" shape "}" | ClassName
//! ```
//!
//! `ClassName` is an ASCII uppercase letter followed by letters, digits or
//! underscores. `L` and `R` are the list and record tags when they stand
//! alone or are directly followed by a one-letter tag, `{`, `.` or `-`, so
//! `Ls->s` takes a list and a string. A class name therefore never starts
//! with `L` or `R` followed by one of `sidbna`. Whitespace separates tags
//! and is otherwise ignored. A trailing `...` makes the last parameter
//! repeat zero or more times.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::class::{class_name, instance_class};
use crate::value::Value;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    String,
    I64,
    F64,
    Bool,
    Nil,
    Any,
    List,
    Record,
    /// `{...}`: a record of any shape. Keeps the text between the braces.
    RecordShape(String),
    /// Instance of the named native or script class.
    Instance(String),
}

impl TypeTag {
    /// Does `value` satisfy this tag? Integers satisfy `d`.
    pub fn matches(&self, value: Value) -> bool {
        match self {
            TypeTag::String => value.is_string(),
            TypeTag::I64 => value.is_int(),
            TypeTag::F64 => value.is_number(),
            TypeTag::Bool => value.is_bool(),
            TypeTag::Nil => value.is_nil(),
            TypeTag::Any => true,
            TypeTag::List => value.is_list(),
            TypeTag::Record | TypeTag::RecordShape(_) => value.is_record(),
            TypeTag::Instance(name) => {
                value.is_instance()
                    && class_name(instance_class(value)).as_deref() == Some(name.as_str())
            }
        }
    }

    fn write_code(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::String => f.write_str("s"),
            TypeTag::I64 => f.write_str("i"),
            TypeTag::F64 => f.write_str("d"),
            TypeTag::Bool => f.write_str("b"),
            TypeTag::Nil => f.write_str("n"),
            TypeTag::Any => f.write_str("a"),
            TypeTag::List => f.write_str("L"),
            TypeTag::Record => f.write_str("R"),
            TypeTag::RecordShape(shape) => write!(f, "{{{shape}}}"),
            TypeTag::Instance(name) => f.write_str(name),
        }
    }

    /// Tags written as names need a space before a following tag.
    fn is_name_like(&self) -> bool {
        matches!(self, TypeTag::List | TypeTag::Record | TypeTag::Instance(_))
    }
}

/// Human-readable type name, as used in call errors.
impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::String => f.write_str("string"),
            TypeTag::I64 => f.write_str("i64"),
            TypeTag::F64 => f.write_str("f64"),
            TypeTag::Bool => f.write_str("bool"),
            TypeTag::Nil => f.write_str("nil"),
            TypeTag::Any => f.write_str("any"),
            TypeTag::List => f.write_str("list"),
            TypeTag::Record | TypeTag::RecordShape(_) => f.write_str("record"),
            TypeTag::Instance(name) => f.write_str(name),
        }
    }
}

/// A parsed signature string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub params: Vec<TypeTag>,
    /// The last parameter repeats zero or more times.
    pub variadic: bool,
    pub ret: TypeTag,
}

impl Signature {
    /// Number of arguments that must always be supplied.
    pub fn required_args(&self) -> usize {
        if self.variadic {
            self.params.len().saturating_sub(1)
        } else {
            self.params.len()
        }
    }

    pub fn accepts_count(&self, count: usize) -> bool {
        if self.variadic {
            count >= self.required_args()
        } else {
            count == self.params.len()
        }
    }

    /// Expected tag for the argument at `index`.
    pub fn param(&self, index: usize) -> Option<&TypeTag> {
        self.params
            .get(index)
            .or_else(|| self.params.last().filter(|_| self.variadic))
    }
}

/// Renders back to a signature string that parses to the same value.
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prev_name_like = false;
        for param in &self.params {
            if prev_name_like && !matches!(param, TypeTag::RecordShape(_)) {
                f.write_str(" ")?;
            }
            param.write_code(f)?;
            prev_name_like = param.is_name_like();
        }
        if self.variadic {
            f.write_str("...")?;
        }
        f.write_str("->")?;
        self.ret.write_code(f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SignatureErrorKind {
    #[error("expected `->`")]
    MissingArrow,
    #[error("missing return type")]
    MissingReturn,
    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),
    #[error("unbalanced `{{`")]
    UnbalancedBrace,
    #[error("`...` must follow a parameter")]
    DanglingVariadic,
    #[error("`...` must be the last parameter")]
    VariadicNotLast,
    #[error("unexpected input after return type")]
    TrailingInput,
}

/// A malformed signature string, with the byte offset of the problem.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid signature `{signature}` at byte {position}: {kind}")]
pub struct SignatureError {
    pub signature: String,
    pub position: usize,
    pub kind: SignatureErrorKind,
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Parser { text, pos: 0 }.signature()
    }
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, kind: SignatureErrorKind) -> SignatureError {
        SignatureError {
            signature: self.text.to_string(),
            position: self.pos,
            kind,
        }
    }

    fn rest(&self) -> &str {
        &self.text[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn signature(mut self) -> Result<Signature, SignatureError> {
        let mut params = Vec::new();
        let mut variadic = false;

        loop {
            self.skip_whitespace();
            if self.rest().starts_with("->") {
                break;
            }
            if self.rest().starts_with("...") {
                if params.is_empty() {
                    return Err(self.error(SignatureErrorKind::DanglingVariadic));
                }
                self.pos += 3;
                self.skip_whitespace();
                if !self.rest().starts_with("->") {
                    let kind = if self.rest().is_empty() {
                        SignatureErrorKind::MissingArrow
                    } else {
                        SignatureErrorKind::VariadicNotLast
                    };
                    return Err(self.error(kind));
                }
                variadic = true;
                break;
            }
            if self.rest().is_empty() {
                return Err(self.error(SignatureErrorKind::MissingArrow));
            }
            params.push(self.tag()?);
        }

        // The loop only exits in front of `->`.
        self.pos += 2;
        self.skip_whitespace();
        if self.rest().is_empty() {
            return Err(self.error(SignatureErrorKind::MissingReturn));
        }
        let ret = self.tag()?;
        self.skip_whitespace();
        if !self.rest().is_empty() {
            return Err(self.error(SignatureErrorKind::TrailingInput));
        }

        Ok(Signature {
            params,
            variadic,
            ret,
        })
    }

    fn tag(&mut self) -> Result<TypeTag, SignatureError> {
        let Some(c) = self.rest().chars().next() else {
            return Err(self.error(SignatureErrorKind::MissingReturn));
        };

        let simple = match c {
            's' => Some(TypeTag::String),
            'i' => Some(TypeTag::I64),
            'd' => Some(TypeTag::F64),
            'b' => Some(TypeTag::Bool),
            'n' => Some(TypeTag::Nil),
            'a' => Some(TypeTag::Any),
            _ => None,
        };
        if let Some(tag) = simple {
            self.pos += 1;
            return Ok(tag);
        }

        match c {
            '{' => self.record_shape(),
            c if c.is_ascii_uppercase() => Ok(self.class_name()),
            c => Err(self.error(SignatureErrorKind::UnexpectedChar(c))),
        }
    }

    fn record_shape(&mut self) -> Result<TypeTag, SignatureError> {
        let open = self.pos;
        let mut depth = 0usize;
        for (offset, b) in self.rest().bytes().enumerate() {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        let shape = self.text[open + 1..open + offset].to_string();
                        self.pos = open + offset + 1;
                        return Ok(TypeTag::RecordShape(shape));
                    }
                }
                _ => {}
            }
        }
        Err(self.error(SignatureErrorKind::UnbalancedBrace))
    }

    fn class_name(&mut self) -> TypeTag {
        let mut bytes = self.rest().bytes();
        let container = match bytes.next() {
            Some(b'L') => Some(TypeTag::List),
            Some(b'R') => Some(TypeTag::Record),
            _ => None,
        };
        if let Some(tag) = container {
            let ends_tag = match bytes.next() {
                None => true,
                Some(next) => next.is_ascii_whitespace() || b"sidbna{.-".contains(&next),
            };
            if ends_tag {
                self.pos += 1;
                return tag;
            }
        }

        let len = self
            .rest()
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        let name = self.text[self.pos..self.pos + len].to_string();
        self.pos += len;
        TypeTag::Instance(name)
    }
}

#[cfg(test)]
mod tests;
