//! Loaded native modules, by name.

use rustc_hash::FxHashMap;
use tracing::debug;

use super::{InitFn, LoadError, ModuleLoader, NativeModule};

/// Caches native modules so each is initialized once per process.
///
/// Statically linked modules are registered up front; anything else is
/// loaded on first request through the [`ModuleLoader`].
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    loader: ModuleLoader,
    modules: FxHashMap<String, NativeModule>,
}

impl ModuleRegistry {
    pub fn new(loader: ModuleLoader) -> Self {
        ModuleRegistry {
            loader,
            modules: FxHashMap::default(),
        }
    }

    /// Add an already built module, replacing one of the same name.
    pub fn register(&mut self, module: NativeModule) {
        debug!(module = module.name(), "registering native module");
        self.modules.insert(module.name().to_string(), module);
    }

    /// Register a statically linked module through its init function.
    ///
    /// # Safety
    ///
    /// Same contract as [`NativeModule::from_init`].
    pub unsafe fn register_static(&mut self, name: &str, init: InitFn) -> Result<(), LoadError> {
        let module = NativeModule::from_init(name, init)?;
        self.register(module);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&NativeModule> {
        self.modules.get(name)
    }

    /// The module called `name`, loading it from disk if needed.
    ///
    /// A module that is neither registered nor found on disk is reported as
    /// [`LoadError::UnknownModule`] with the names that are known.
    pub fn require(&mut self, name: &str) -> Result<&NativeModule, LoadError> {
        if !self.modules.contains_key(name) {
            let module = match self.loader.load(name) {
                Ok(module) => module,
                Err(LoadError::NotFound { .. }) => {
                    return Err(LoadError::UnknownModule {
                        name: name.to_string(),
                        known: self.names(),
                    })
                }
                Err(err) => return Err(err),
            };
            self.register(module);
        }
        self.modules
            .get(name)
            .ok_or_else(|| LoadError::UnknownModule {
                name: name.to_string(),
                known: self.names(),
            })
    }

    /// Registered module names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.modules.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }
}

#[cfg(test)]
mod tests;
