use angara_diagnostic::DiagnosticConfig;

/// Knobs for a semantic analysis run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AnalyzerConfig {
    /// Attach did-you-mean help to unresolved names.
    pub suggestions: bool,
    /// Declare `print` and `len` in the global scope.
    pub builtins: bool,
    pub diagnostics: DiagnosticConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            suggestions: true,
            builtins: true,
            diagnostics: DiagnosticConfig::default(),
        }
    }
}
