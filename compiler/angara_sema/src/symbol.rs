use crate::{Token, Ty};

/// A declared name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: Ty,
    /// Where the name was declared.
    pub token: Token,
    pub is_const: bool,
    /// Scope depth at declaration; the global scope is 0.
    pub depth: usize,
    /// Exporting module, for imported names.
    pub origin_module: Option<String>,
}

impl Symbol {
    pub fn is_global(&self) -> bool {
        self.depth == 0
    }

    pub fn is_imported(&self) -> bool {
        self.origin_module.is_some()
    }
}
