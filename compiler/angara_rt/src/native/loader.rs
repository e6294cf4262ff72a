//! Finding and opening native module libraries.

use std::ffi::{c_char, CStr, CString};
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::{init_symbol, InitFn, NativeModule, SignatureError};
use crate::RuntimeConfig;

#[cfg(target_family = "unix")]
#[link(name = "dl")]
extern "C" {
    fn dlopen(filename: *const c_char, flag: i32) -> *mut u8;
    fn dlsym(handle: *mut u8, symbol: *const c_char) -> *mut u8;
    fn dlclose(handle: *mut u8) -> i32;
    fn dlerror() -> *const c_char;
}

#[cfg(target_family = "unix")]
const RTLD_NOW: i32 = 0x2;

#[cfg(target_os = "windows")]
extern "system" {
    fn LoadLibraryA(file_name: *const c_char) -> *mut u8;
    fn GetProcAddress(module: *mut u8, proc_name: *const c_char) -> *mut u8;
    fn FreeLibrary(module: *mut u8) -> i32;
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("`{name}` is not a valid native module name")]
    InvalidModuleName { name: String },
    #[error("native module `{module}` not found (searched {})", DisplayPaths(.searched))]
    NotFound {
        module: String,
        searched: Vec<PathBuf>,
    },
    #[error("cannot open `{}`: {reason}", .path.display())]
    Open { path: PathBuf, reason: String },
    #[error("`{}` does not export `{symbol}`", .path.display())]
    MissingInit { path: PathBuf, symbol: String },
    #[error("native module `{module}` returned no export table")]
    NullTable { module: String },
    #[error("native module `{module}`: export #{index} has an invalid {what}")]
    InvalidDescriptor {
        module: String,
        index: usize,
        what: &'static str,
    },
    #[error("native module `{module}`: `{export}` has no function pointer")]
    MissingFunction { module: String, export: String },
    #[error("native module `{module}`: `{export}` is exported twice")]
    DuplicateExport { module: String, export: String },
    #[error("native module `{module}`: `{export}`: {source}")]
    Signature {
        module: String,
        export: String,
        #[source]
        source: SignatureError,
    },
    #[error("unknown native module `{name}`")]
    UnknownModule {
        name: String,
        /// Names the registry does know, for did-you-mean reporting.
        known: Vec<String>,
    },
}

struct DisplayPaths<'a>(&'a [PathBuf]);

impl fmt::Display for DisplayPaths<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no directories");
        }
        for (i, path) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}

// ── Shared libraries ────────────────────────────────────────────────────

/// An open shared library, closed on drop.
#[derive(Debug)]
pub(crate) struct Library {
    handle: *mut u8,
    path: PathBuf,
}

impl Library {
    pub(crate) fn open(path: &Path) -> Result<Self, LoadError> {
        let open_error = |reason: String| LoadError::Open {
            path: path.to_path_buf(),
            reason,
        };
        let c_path = CString::new(path.to_string_lossy().into_owned())
            .map_err(|_| open_error("path contains a NUL byte".to_string()))?;

        let handle = open_library(&c_path);
        if handle.is_null() {
            return Err(open_error(last_error()));
        }
        Ok(Library {
            handle,
            path: path.to_path_buf(),
        })
    }

    pub(crate) fn symbol(&self, name: &str) -> Option<*mut u8> {
        let c_name = CString::new(name).ok()?;
        let sym = find_symbol(self.handle, &c_name);
        (!sym.is_null()).then_some(sym)
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "closing native library");
        close_library(self.handle);
    }
}

#[cfg(target_family = "unix")]
fn open_library(path: &CStr) -> *mut u8 {
    // SAFETY: path is NUL-terminated
    unsafe { dlopen(path.as_ptr(), RTLD_NOW) }
}

#[cfg(target_family = "unix")]
fn find_symbol(handle: *mut u8, name: &CStr) -> *mut u8 {
    // SAFETY: handle came from dlopen; name is NUL-terminated
    unsafe { dlsym(handle, name.as_ptr()) }
}

#[cfg(target_family = "unix")]
fn close_library(handle: *mut u8) {
    // SAFETY: handle came from dlopen and is closed once
    unsafe { dlclose(handle) };
}

#[cfg(target_family = "unix")]
fn last_error() -> String {
    // SAFETY: dlerror returns null or a NUL-terminated message
    let message = unsafe { dlerror() };
    if message.is_null() {
        "unknown dlopen failure".to_string()
    } else {
        // SAFETY: checked non-null above
        unsafe { CStr::from_ptr(message) }
            .to_string_lossy()
            .into_owned()
    }
}

#[cfg(target_os = "windows")]
fn open_library(path: &CStr) -> *mut u8 {
    // SAFETY: path is NUL-terminated
    unsafe { LoadLibraryA(path.as_ptr()) }
}

#[cfg(target_os = "windows")]
fn find_symbol(handle: *mut u8, name: &CStr) -> *mut u8 {
    // SAFETY: handle came from LoadLibraryA; name is NUL-terminated
    unsafe { GetProcAddress(handle, name.as_ptr()) }
}

#[cfg(target_os = "windows")]
fn close_library(handle: *mut u8) {
    // SAFETY: handle came from LoadLibraryA and is freed once
    unsafe { FreeLibrary(handle) };
}

#[cfg(target_os = "windows")]
fn last_error() -> String {
    std::io::Error::last_os_error().to_string()
}

#[cfg(not(any(target_family = "unix", target_os = "windows")))]
fn open_library(_path: &CStr) -> *mut u8 {
    std::ptr::null_mut()
}

#[cfg(not(any(target_family = "unix", target_os = "windows")))]
fn find_symbol(_handle: *mut u8, _name: &CStr) -> *mut u8 {
    std::ptr::null_mut()
}

#[cfg(not(any(target_family = "unix", target_os = "windows")))]
fn close_library(_handle: *mut u8) {}

#[cfg(not(any(target_family = "unix", target_os = "windows")))]
fn last_error() -> String {
    "dynamic loading is not supported on this platform".to_string()
}

// ── Module lookup ───────────────────────────────────────────────────────

/// Resolves module names to shared libraries in a list of directories.
#[derive(Clone, Debug, Default)]
pub struct ModuleLoader {
    search_paths: Vec<PathBuf>,
}

impl ModuleLoader {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        ModuleLoader { search_paths }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(config.module_path.clone())
    }

    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// File names a module may have on this platform, most specific first.
    pub fn file_names(module: &str) -> Vec<String> {
        if cfg!(target_os = "windows") {
            vec![format!("{module}.dll")]
        } else if cfg!(target_os = "macos") {
            vec![format!("lib{module}.dylib"), format!("lib{module}.so")]
        } else {
            vec![format!("lib{module}.so")]
        }
    }

    /// Path of the first matching library in the search paths.
    pub fn locate(&self, module: &str) -> Result<PathBuf, LoadError> {
        validate_name(module)?;
        let names = Self::file_names(module);
        self.search_paths
            .iter()
            .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| LoadError::NotFound {
                module: module.to_string(),
                searched: self.search_paths.clone(),
            })
    }

    /// Locate, open and initialize `module`.
    pub fn load(&self, module: &str) -> Result<NativeModule, LoadError> {
        let path = self.locate(module)?;
        let library = Library::open(&path)?;

        let symbol = init_symbol(module);
        let init = library.symbol(&symbol).ok_or_else(|| LoadError::MissingInit {
            path: path.clone(),
            symbol: symbol.clone(),
        })?;

        // SAFETY: `Angara_<name>_Init` has the `InitFn` signature by contract
        let init = unsafe { std::mem::transmute::<*mut u8, InitFn>(init) };
        // SAFETY: the library stays open while the module is built
        let mut native = unsafe { NativeModule::from_init(module, init)? };
        native.attach_library(library);

        debug!(module, path = %path.display(), "loaded native module");
        Ok(native)
    }
}

/// Module names become file names, so keep them to identifier characters.
fn validate_name(module: &str) -> Result<(), LoadError> {
    let valid = !module.is_empty()
        && module
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(LoadError::InvalidModuleName {
            name: module.to_string(),
        })
    }
}

#[cfg(test)]
mod tests;
