//! Lexical scopes and the scope stack.
//!
//! The stack always holds at least the global scope at index 0. Each scope
//! keeps symbols in declaration order (for deterministic diagnostics and
//! suggestion candidates) with a hash index for lookup.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::suggest::suggest_similar;
use crate::{Symbol, Token, Ty};

/// Insertion-ordered identifier → symbol map.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    symbols: Vec<Symbol>,
    index: FxHashMap<String, usize>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&i| &self.symbols[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Insert unless the name exists; on conflict the scope is untouched
    /// and the existing symbol is returned.
    fn insert(&mut self, symbol: Symbol) -> Result<(), &Symbol> {
        if let Some(&existing) = self.index.get(&symbol.name) {
            return Err(&self.symbols[existing]);
        }
        self.index.insert(symbol.name.clone(), self.symbols.len());
        self.symbols.push(symbol);
        Ok(())
    }

    /// Symbols in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Stack of lexical scopes; index 0 is the global scope.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![Scope::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::new());
        trace!(depth = self.scope_depth(), "enter scope");
    }

    /// Pop the innermost scope. At the global scope this is a no-op, which
    /// lets error recovery call it without tracking balance.
    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
            trace!(depth = self.scope_depth(), "exit scope");
        }
    }

    /// Declare `token` in the innermost scope.
    ///
    /// On conflict nothing changes and the existing symbol comes back as
    /// the error.
    pub fn declare(
        &mut self,
        token: &Token,
        ty: Ty,
        is_const: bool,
        origin_module: Option<&str>,
    ) -> Result<(), &Symbol> {
        let depth = self.scope_depth();
        let symbol = Symbol {
            name: token.lexeme.clone(),
            ty,
            token: token.clone(),
            is_const,
            depth,
            origin_module: origin_module.map(str::to_owned),
        };
        self.innermost_mut().insert(symbol)
    }

    /// Innermost binding of `name`, searching outward.
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Binding of `name` in the innermost scope only.
    pub fn resolve_local(&self, name: &str) -> Option<&Symbol> {
        self.scopes.last().and_then(|scope| scope.get(name))
    }

    pub fn global_scope(&self) -> &Scope {
        &self.scopes[0]
    }

    /// Number of scopes above the global one.
    pub fn scope_depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Every visible name once, innermost bindings first.
    pub fn visible_names(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        self.scopes
            .iter()
            .rev()
            .flat_map(Scope::iter)
            .map(|symbol| symbol.name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Closest visible name to `name`, for did-you-mean diagnostics.
    pub fn suggest(&self, name: &str) -> Option<&str> {
        suggest_similar(name, self.visible_names())
    }

    fn innermost_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}
