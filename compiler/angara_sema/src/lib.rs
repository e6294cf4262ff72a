//! Semantic analysis for Angara.
//!
//! A lexically scoped [`SymbolTable`] plus an [`Analyzer`] that reports
//! redeclarations, unknown names, constant assignment and call mismatches
//! through an `angara_diagnostic` queue. Unknown names come with
//! edit-distance suggestions from [`suggest`].

mod analyzer;
mod config;
mod scope;
pub mod suggest;
mod symbol;
mod token;
mod ty;

pub use analyzer::Analyzer;
pub use config::AnalyzerConfig;
pub use scope::{Scope, SymbolTable};
pub use symbol::Symbol;
pub use token::Token;
pub use ty::Ty;
