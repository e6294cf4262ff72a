//! Semantic analysis over identifier tokens.
//!
//! The parser drives the analyzer: it opens and closes scopes as it walks
//! blocks, declares names at `let`/`const`/`fn`/`class`, and resolves every
//! identifier use. Errors are queued rather than returned so one pass
//! reports everything it can.

use angara_diagnostic::{
    duplicate_declaration, unknown_identifier, unknown_module, Diagnostic, DiagnosticQueue,
    ErrorCode, ErrorGuaranteed,
};
use angara_rt::native::NativeModule;
use tracing::debug;

use crate::suggest::suggest_similar;
use crate::{AnalyzerConfig, Symbol, SymbolTable, Token, Ty};

pub struct Analyzer {
    symbols: SymbolTable,
    queue: DiagnosticQueue,
    config: AnalyzerConfig,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let mut analyzer = Analyzer {
            symbols: SymbolTable::new(),
            queue: DiagnosticQueue::with_config(config.diagnostics.clone()),
            config,
        };
        if analyzer.config.builtins {
            analyzer.declare_builtins();
        }
        analyzer
    }

    fn declare_builtins(&mut self) {
        let builtins = [
            (
                "print",
                Ty::Function {
                    params: vec![Ty::Any],
                    variadic: true,
                    ret: Box::new(Ty::Nil),
                },
            ),
            ("len", Ty::function(vec![Ty::Any], Ty::I64)),
        ];
        for (name, ty) in builtins {
            // The table is empty here, so this cannot conflict.
            let _ = self
                .symbols
                .declare(&Token::synthetic(name), ty, true, None);
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn enter_scope(&mut self) {
        self.symbols.enter_scope();
    }

    pub fn exit_scope(&mut self) {
        self.symbols.exit_scope();
    }

    /// Declare a variable, constant, function, or class name.
    ///
    /// Returns `false` (after reporting) when the innermost scope already
    /// has the name.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %token.lexeme))]
    pub fn declare_variable(&mut self, token: &Token, ty: Ty, is_const: bool) -> bool {
        let previous = match self.symbols.declare(token, ty, is_const, None) {
            Ok(()) => return true,
            Err(existing) => existing.token.span,
        };
        let diag = duplicate_declaration(token.span, &token.lexeme, previous);
        self.report(diag, token);
        false
    }

    /// Resolve an identifier use, reporting unknown names.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %token.lexeme))]
    pub fn resolve_identifier(&mut self, token: &Token) -> Option<&Symbol> {
        if self.symbols.resolve(&token.lexeme).is_none() {
            let suggestion = self
                .config
                .suggestions
                .then(|| self.symbols.suggest(&token.lexeme).map(str::to_owned))
                .flatten();
            let diag = unknown_identifier(token.span, &token.lexeme, suggestion.as_deref());
            self.report(diag, token);
            return None;
        }
        self.symbols.resolve(&token.lexeme)
    }

    /// Check `target = <value of value_ty>`.
    pub fn check_assignment(&mut self, target: &Token, value_ty: &Ty) -> bool {
        let Some(symbol) = self.resolve_identifier(target) else {
            return false;
        };

        let diag = if symbol.is_const {
            Diagnostic::error(ErrorCode::E2002)
                .with_message(format!("cannot assign to constant `{}`", symbol.name))
                .with_label(target.span, "assignment to constant")
                .with_secondary_label(symbol.token.span, "declared as constant here")
        } else if !symbol.ty.accepts(value_ty) {
            Diagnostic::error(ErrorCode::E2001)
                .with_message(format!(
                    "type mismatch: expected `{}`, found `{value_ty}`",
                    symbol.ty
                ))
                .with_label(target.span, format!("`{}` has type `{}`", symbol.name, symbol.ty))
        } else {
            return true;
        };
        self.report(diag, target);
        false
    }

    /// Check a call of `callee` with arguments of the given types and
    /// return the result type.
    pub fn check_call(&mut self, callee: &Token, arg_tys: &[Ty]) -> Option<Ty> {
        let ty = self.resolve_identifier(callee)?.ty.clone();
        let (params, variadic, ret) = match ty {
            Ty::Function {
                params,
                variadic,
                ret,
            } => (params, variadic, *ret),
            Ty::Any => return Some(Ty::Any),
            other => {
                let diag = Diagnostic::error(ErrorCode::E2007)
                    .with_message(format!("`{}` of type `{other}` is not callable", callee.lexeme))
                    .with_label(callee.span, "called here");
                self.report(diag, callee);
                return None;
            }
        };

        // A variadic signature repeats its last parameter.
        let fixed = if variadic {
            params.len().saturating_sub(1)
        } else {
            params.len()
        };
        let arity_ok = if variadic {
            arg_tys.len() >= fixed
        } else {
            arg_tys.len() == fixed
        };
        if !arity_ok {
            let expected = if variadic {
                format!("at least {fixed}")
            } else {
                fixed.to_string()
            };
            let diag = Diagnostic::error(ErrorCode::E2005)
                .with_message(format!(
                    "`{}` takes {expected} argument{}, {} supplied",
                    callee.lexeme,
                    if fixed == 1 && !variadic { "" } else { "s" },
                    arg_tys.len()
                ))
                .with_label(callee.span, "wrong number of arguments");
            self.report(diag, callee);
            return Some(ret);
        }

        for (i, arg) in arg_tys.iter().enumerate() {
            let Some(param) = params.get(i).or_else(|| params.last().filter(|_| variadic)) else {
                break;
            };
            if !param.accepts(arg) {
                let diag = Diagnostic::error(ErrorCode::E2001)
                    .with_message(format!(
                        "type mismatch: argument {} of `{}` expects `{param}`, found `{arg}`",
                        i + 1,
                        callee.lexeme
                    ))
                    .with_label(callee.span, "in this call");
                self.report(diag, callee);
            }
        }
        Some(ret)
    }

    /// Declare every function and class of a native module as a global
    /// constant tagged with the module name. Returns the number declared.
    pub fn import_native_module(&mut self, module: &NativeModule) -> usize {
        let mut declared = 0;
        let exports = module
            .functions()
            .iter()
            .map(|f| (f.name(), Ty::from_signature(f.signature())))
            .chain(module.classes().iter().map(|class| {
                let ty = class
                    .constructor()
                    .map_or_else(|| Ty::Class(class.name().to_owned()), |ctor| {
                        Ty::from_signature(ctor.signature())
                    });
                (class.name(), ty)
            }))
            .map(|(name, ty)| (name.to_owned(), ty))
            .collect::<Vec<_>>();

        for (name, ty) in exports {
            let token = Token::synthetic(name);
            match self
                .symbols
                .declare(&token, ty, true, Some(module.name()))
            {
                Ok(()) => declared += 1,
                Err(existing) => {
                    let diag = duplicate_declaration(token.span, &token.lexeme, existing.token.span)
                        .with_note(format!("imported from module `{}`", module.name()));
                    self.report(diag, &token);
                }
            }
        }
        debug!(module = module.name(), declared, "imported native module");
        declared
    }

    /// Check an `import` target against the modules that exist.
    pub fn check_module_name(&mut self, token: &Token, available: &[&str]) -> bool {
        if available.contains(&token.lexeme.as_str()) {
            return true;
        }
        let suggestion = if self.config.suggestions {
            suggest_similar(&token.lexeme, available.iter().copied())
        } else {
            None
        };
        let diag = unknown_module(token.span, &token.lexeme, suggestion);
        self.report(diag, token);
        false
    }

    fn report(&mut self, diag: Diagnostic, at: &Token) -> ErrorGuaranteed {
        self.queue.emit_error(diag, at.line, at.column)
    }

    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        self.queue.has_errors()
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.queue.peek()
    }

    /// Drain diagnostics in source order; `Err` if any was an error.
    pub fn finish(&mut self) -> (Vec<Diagnostic>, Result<(), ErrorGuaranteed>) {
        let status = match self.queue.has_errors() {
            Some(guarantee) => Err(guarantee),
            None => Ok(()),
        };
        (self.queue.flush(), status)
    }

    /// Process exit status for the compilation so far.
    pub fn exit_code(&self) -> i32 {
        i32::from(self.queue.has_errors().is_some())
    }
}
