//! Type descriptors stored in symbols.
//!
//! The full type checker lives outside this crate; the symbol table only
//! needs a descriptor it can store, compare, and print in diagnostics.

use std::fmt;

use angara_rt::native::{Signature, TypeTag};

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Ty {
    Nil,
    Bool,
    I64,
    F64,
    String,
    /// Dynamically typed; compatible with everything.
    Any,
    List(Box<Ty>),
    Record,
    /// The class object itself (what a class name resolves to).
    Class(String),
    /// An instance of the named class.
    Instance(String),
    Function {
        params: Vec<Ty>,
        variadic: bool,
        ret: Box<Ty>,
    },
}

impl Ty {
    pub fn function(params: Vec<Ty>, ret: Ty) -> Ty {
        Ty::Function {
            params,
            variadic: false,
            ret: Box::new(ret),
        }
    }

    pub fn list_of(elem: Ty) -> Ty {
        Ty::List(Box::new(elem))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Ty::Function { .. })
    }

    /// Whether a value of type `other` may be stored where `self` is expected.
    ///
    /// `Any` on either side is compatible; `i64` widens to `f64`; list
    /// element types are compared recursively.
    pub fn accepts(&self, other: &Ty) -> bool {
        match (self, other) {
            (Ty::Any, _) | (_, Ty::Any) => true,
            (Ty::F64, Ty::I64) => true,
            (Ty::List(a), Ty::List(b)) => a.accepts(b),
            (
                Ty::Function {
                    params: pa,
                    variadic: va,
                    ret: ra,
                },
                Ty::Function {
                    params: pb,
                    variadic: vb,
                    ret: rb,
                },
            ) => {
                va == vb
                    && pa.len() == pb.len()
                    && pa.iter().zip(pb).all(|(a, b)| b.accepts(a))
                    && ra.accepts(rb)
            }
            _ => self == other,
        }
    }

    /// Function type of a native signature.
    pub fn from_signature(signature: &Signature) -> Ty {
        Ty::Function {
            params: signature.params.iter().map(Ty::from).collect(),
            variadic: signature.variadic,
            ret: Box::new(Ty::from(&signature.ret)),
        }
    }
}

impl From<&TypeTag> for Ty {
    fn from(tag: &TypeTag) -> Self {
        match tag {
            TypeTag::String => Ty::String,
            TypeTag::I64 => Ty::I64,
            TypeTag::F64 => Ty::F64,
            TypeTag::Bool => Ty::Bool,
            TypeTag::Nil => Ty::Nil,
            TypeTag::Any => Ty::Any,
            TypeTag::List => Ty::list_of(Ty::Any),
            TypeTag::Record | TypeTag::RecordShape(_) => Ty::Record,
            TypeTag::Instance(class) => Ty::Instance(class.clone()),
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Nil => f.write_str("nil"),
            Ty::Bool => f.write_str("bool"),
            Ty::I64 => f.write_str("i64"),
            Ty::F64 => f.write_str("f64"),
            Ty::String => f.write_str("string"),
            Ty::Any => f.write_str("any"),
            Ty::List(elem) => write!(f, "list<{elem}>"),
            Ty::Record => f.write_str("record"),
            Ty::Class(name) => write!(f, "class {name}"),
            Ty::Instance(name) => f.write_str(name),
            Ty::Function {
                params,
                variadic,
                ret,
            } => {
                f.write_str("fn(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                if *variadic {
                    f.write_str("...")?;
                }
                write!(f, ") -> {ret}")
            }
        }
    }
}

#[cfg(test)]
mod tests;
