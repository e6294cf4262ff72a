//! Runtime settings read from the environment.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

/// Filter directive for runtime logging, in `EnvFilter` syntax.
pub const LOG_VAR: &str = "ANGARA_LOG";
/// Platform path list of directories holding native modules.
pub const MODULE_PATH_VAR: &str = "ANGARA_MODULE_PATH";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub log_filter: Option<String>,
    pub module_path: Vec<PathBuf>,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let log_filter = env::var(LOG_VAR).ok().or_else(|| env::var("RUST_LOG").ok());
        Self::from_vars(log_filter, env::var_os(MODULE_PATH_VAR))
    }

    /// Build from raw variable values. Empty values count as unset.
    pub fn from_vars(log_filter: Option<String>, module_path: Option<OsString>) -> Self {
        let module_path = module_path
            .map(|paths| {
                env::split_paths(&paths)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();
        RuntimeConfig {
            log_filter: log_filter.filter(|f| !f.trim().is_empty()),
            module_path,
        }
    }
}
