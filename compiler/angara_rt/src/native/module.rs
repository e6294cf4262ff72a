//! Loaded native modules and typed calls into them.

use std::ffi::{c_char, CStr};
use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::loader::{Library, LoadError};
use super::{ClassDef, Finalizer, FuncDef, InitFn, NativeFn, Signature, SignatureError, TypeTag};
use crate::class::{class_name, instance_class, set_native_finalizer};
use crate::display::type_name;
use crate::exception::{raise_owned, try_catch};
use crate::value::Value;

/// Upper bound on descriptors read from one table, in case a module
/// forgets its terminator.
const MAX_EXPORTS: usize = 4096;

/// A rejected call to a native function.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("`{function}` expects {expected} arguments, got {found}")]
    Arity {
        function: String,
        expected: String,
        found: usize,
    },
    #[error("argument {} of `{function}` expects {expected}, found {found}", .index + 1)]
    ArgumentType {
        function: String,
        index: usize,
        expected: TypeTag,
        found: &'static str,
    },
    #[error("`{class}.{method}` called on {found}")]
    BadReceiver {
        class: String,
        method: String,
        found: &'static str,
    },
    #[error("class `{class}` has no method `{method}`")]
    UnknownMethod { class: String, method: String },
    #[error("class `{class}` has no constructor")]
    NoConstructor { class: String },
}

#[derive(Clone)]
pub struct NativeFunction {
    name: String,
    signature: Signature,
    function: NativeFn,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<String>,
        signature: &str,
        function: NativeFn,
    ) -> Result<Self, SignatureError> {
        Ok(NativeFunction {
            name: name.into(),
            signature: signature.parse()?,
            function,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Check argument count and tags against the signature.
    pub fn check_args(&self, args: &[Value]) -> Result<(), CallError> {
        if !self.signature.accepts_count(args.len()) {
            let required = self.signature.required_args();
            let expected = if self.signature.variadic {
                format!("at least {required}")
            } else {
                required.to_string()
            };
            return Err(CallError::Arity {
                function: self.name.clone(),
                expected,
                found: args.len(),
            });
        }

        for (index, &arg) in args.iter().enumerate() {
            let Some(tag) = self.signature.param(index) else {
                break;
            };
            if !tag.matches(arg) {
                return Err(CallError::ArgumentType {
                    function: self.name.clone(),
                    index,
                    expected: tag.clone(),
                    found: type_name(arg),
                });
            }
        }
        Ok(())
    }

    /// Type-check `args` and call the function. The result is owned by the
    /// caller. A throw from the function propagates to the nearest frame.
    pub fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        self.check_args(args)?;
        Ok(invoke(self.function, args))
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("signature", &self.signature.to_string())
            .finish_non_exhaustive()
    }
}

fn invoke(function: NativeFn, args: &[Value]) -> Value {
    let argc = i32::try_from(args.len()).unwrap_or(i32::MAX);
    function(argc, args.as_ptr())
}

/// A class exported by a native module.
#[derive(Clone, Debug)]
pub struct NativeClass {
    name: String,
    constructor: Option<NativeFunction>,
    finalizer: Option<Finalizer>,
    methods: Vec<NativeFunction>,
}

impl NativeClass {
    pub fn new(name: impl Into<String>) -> Self {
        NativeClass {
            name: name.into(),
            constructor: None,
            finalizer: None,
            methods: Vec::new(),
        }
    }

    pub fn with_constructor(
        mut self,
        signature: &str,
        function: NativeFn,
    ) -> Result<Self, SignatureError> {
        self.constructor = Some(NativeFunction::new(self.name.clone(), signature, function)?);
        Ok(self)
    }

    /// Add a method. `signature` describes the arguments after the receiver.
    pub fn with_method(
        mut self,
        name: &str,
        signature: &str,
        function: NativeFn,
    ) -> Result<Self, SignatureError> {
        self.methods.push(NativeFunction::new(name, signature, function)?);
        Ok(self)
    }

    #[must_use]
    pub fn with_finalizer(mut self, finalizer: Finalizer) -> Self {
        self.finalizer = Some(finalizer);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constructor(&self) -> Option<&NativeFunction> {
        self.constructor.as_ref()
    }

    pub fn finalizer(&self) -> Option<Finalizer> {
        self.finalizer
    }

    pub fn methods(&self) -> &[NativeFunction] {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&NativeFunction> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Call the constructor with `args`.
    pub fn construct(&self, args: &[Value]) -> Result<Value, CallError> {
        let constructor = self.constructor.as_ref().ok_or_else(|| CallError::NoConstructor {
            class: self.name.clone(),
        })?;
        constructor.call(args)
    }

    /// Call method `name` on `receiver`, which must be an instance of this
    /// class. The receiver is passed as `args[0]`.
    pub fn call_method(
        &self,
        name: &str,
        receiver: Value,
        args: &[Value],
    ) -> Result<Value, CallError> {
        let method = self.method(name).ok_or_else(|| CallError::UnknownMethod {
            class: self.name.clone(),
            method: name.to_string(),
        })?;

        let is_ours = receiver.is_instance()
            && class_name(instance_class(receiver)).as_deref() == Some(self.name.as_str());
        if !is_ours {
            return Err(CallError::BadReceiver {
                class: self.name.clone(),
                method: name.to_string(),
                found: type_name(receiver),
            });
        }

        method.check_args(args)?;
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(receiver);
        argv.extend_from_slice(args);
        // Catch here so `argv` is freed before the throw moves on, possibly
        // by `longjmp`.
        let outcome = try_catch(|| invoke(method.function, &argv));
        drop(argv);
        match outcome {
            Ok(result) => Ok(result),
            Err(exception) => raise_owned(exception),
        }
    }
}

/// Functions and classes of one native module.
#[derive(Debug)]
pub struct NativeModule {
    name: String,
    functions: Vec<NativeFunction>,
    classes: Vec<NativeClass>,
    /// Keeps the shared object mapped while its functions are reachable.
    library: Option<Library>,
}

impl NativeModule {
    /// An empty module, to be filled from Rust.
    pub fn new(name: impl Into<String>) -> Self {
        NativeModule {
            name: name.into(),
            functions: Vec::new(),
            classes: Vec::new(),
            library: None,
        }
    }

    /// Build a module from a statically linked init function.
    ///
    /// # Safety
    ///
    /// `init` must follow the `Angara_<name>_Init` contract: return null or a
    /// table of valid descriptors with NUL-terminated strings.
    pub unsafe fn from_init(name: &str, init: InitFn) -> Result<Self, LoadError> {
        let mut count: i32 = -1;
        let table = init(&mut count);
        if table.is_null() {
            return Err(LoadError::NullTable {
                module: name.to_string(),
            });
        }

        // A negative count means "up to the terminator".
        let limit = usize::try_from(count).map_or(MAX_EXPORTS, |n| n.min(MAX_EXPORTS));
        let mut module = NativeModule::new(name);
        for index in 0..limit {
            let def = &*table.add(index);
            if def.name.is_null() {
                break;
            }
            module.read_entry(index, def)?;
        }

        debug!(
            module = name,
            functions = module.functions.len(),
            classes = module.classes.len(),
            "read native export table"
        );
        Ok(module)
    }

    pub(crate) fn attach_library(&mut self, library: Library) {
        self.library = Some(library);
    }

    unsafe fn read_entry(&mut self, index: usize, def: &FuncDef) -> Result<(), LoadError> {
        let export = self.c_text(def.name, index, "name")?;

        if def.class.is_null() {
            let function = def.function.ok_or_else(|| LoadError::MissingFunction {
                module: self.name.clone(),
                export: export.clone(),
            })?;
            let signature = self.c_text(def.signature, index, "signature")?;
            let function = self.parse(&export, &signature, function)?;
            return self.add(function);
        }

        let class_def: &ClassDef = &*def.class;
        let class_name = if class_def.name.is_null() {
            export.clone()
        } else {
            self.c_text(class_def.name, index, "class name")?
        };

        let mut class = NativeClass::new(class_name.clone());
        class.finalizer = class_def.finalizer;
        if let Some(function) = def.function {
            let signature = self.c_text(def.signature, index, "signature")?;
            class.constructor = Some(self.parse(&class_name, &signature, function)?);
        }

        if !class_def.methods.is_null() {
            for offset in 0..MAX_EXPORTS {
                let method = &*class_def.methods.add(offset);
                if method.name.is_null() {
                    break;
                }
                let method_name = self.c_text(method.name, index, "method name")?;
                let qualified = format!("{class_name}.{method_name}");
                let function = method.function.ok_or_else(|| LoadError::MissingFunction {
                    module: self.name.clone(),
                    export: qualified.clone(),
                })?;
                let signature = self.c_text(method.signature, index, "method signature")?;
                let mut parsed = self.parse(&qualified, &signature, function)?;
                parsed.name = method_name;
                class.methods.push(parsed);
            }
        }

        self.add_class_checked(class)
    }

    unsafe fn c_text(
        &self,
        ptr: *const c_char,
        index: usize,
        what: &'static str,
    ) -> Result<String, LoadError> {
        let invalid = || LoadError::InvalidDescriptor {
            module: self.name.clone(),
            index,
            what,
        };
        if ptr.is_null() {
            return Err(invalid());
        }
        CStr::from_ptr(ptr)
            .to_str()
            .map(str::to_owned)
            .map_err(|_| invalid())
    }

    fn parse(
        &self,
        export: &str,
        signature: &str,
        function: NativeFn,
    ) -> Result<NativeFunction, LoadError> {
        NativeFunction::new(export, signature, function).map_err(|source| LoadError::Signature {
            module: self.name.clone(),
            export: export.to_string(),
            source,
        })
    }

    fn is_exported(&self, name: &str) -> bool {
        self.function(name).is_some() || self.class(name).is_some()
    }

    fn add(&mut self, function: NativeFunction) -> Result<(), LoadError> {
        if self.is_exported(&function.name) {
            return Err(LoadError::DuplicateExport {
                module: self.name.clone(),
                export: function.name,
            });
        }
        self.functions.push(function);
        Ok(())
    }

    fn add_class_checked(&mut self, class: NativeClass) -> Result<(), LoadError> {
        if self.is_exported(&class.name) {
            return Err(LoadError::DuplicateExport {
                module: self.name.clone(),
                export: class.name,
            });
        }
        if let Some(finalizer) = class.finalizer {
            set_native_finalizer(&class.name, finalizer);
        }
        self.classes.push(class);
        Ok(())
    }

    /// Register a function written in Rust.
    pub fn add_function(
        &mut self,
        name: &str,
        signature: &str,
        function: NativeFn,
    ) -> Result<(), LoadError> {
        let function = self.parse(name, signature, function)?;
        self.add(function)
    }

    /// Register a class written in Rust.
    pub fn add_class(&mut self, class: NativeClass) -> Result<(), LoadError> {
        self.add_class_checked(class)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn functions(&self) -> &[NativeFunction] {
        &self.functions
    }

    pub fn classes(&self) -> &[NativeClass] {
        &self.classes
    }

    pub fn function(&self, name: &str) -> Option<&NativeFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn class(&self, name: &str) -> Option<&NativeClass> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Call exported function `name`.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Option<Value>, CallError> {
        self.function(name).map(|f| f.call(args)).transpose()
    }

    pub fn is_dynamic(&self) -> bool {
        self.library.is_some()
    }
}
