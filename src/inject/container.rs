//! Registry of injectable types and named functions.
//!
//! # Responsibilities
//! - Hold constructor and method descriptors for every type a route or
//!   middleware may reference by name
//! - Hold named free functions usable as handlers and middleware
//! - Answer signature queries (the introspector)
//!
//! # Design Decisions
//! - Unknown names are not errors here: introspection yields an empty
//!   signature and instantiation yields `None`
//! - A type registered without a constructor is not instantiable

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::BoxError;
use crate::inject::{Arguments, CallArgs, Instance, Signature};

type HandlerFn = dyn for<'a, 'b> Fn(&'a mut CallArgs<'b>) -> Result<(), BoxError> + Send + Sync;
type ConstructFn = dyn Fn(&Arguments) -> Result<Instance, BoxError> + Send + Sync;
type MethodFn =
    dyn for<'a, 'b> Fn(&Instance, &'a mut CallArgs<'b>) -> Result<(), BoxError> + Send + Sync;

fn method_fn<F>(func: F) -> Arc<MethodFn>
where
    F: Fn(&Instance, &mut CallArgs<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
{
    Arc::new(func)
}

/// A free function or closure together with its declared parameters.
#[derive(Clone)]
pub struct Callable {
    signature: Signature,
    func: Arc<HandlerFn>,
}

impl Callable {
    pub fn new<F>(signature: Signature, func: F) -> Self
    where
        F: Fn(&mut CallArgs<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            signature,
            func: Arc::new(func),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub(crate) fn call(&self, args: &mut CallArgs<'_>) -> Result<(), BoxError> {
        (self.func)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// A method registered on a type.
#[derive(Clone)]
pub struct MethodDescriptor {
    signature: Signature,
    func: Arc<MethodFn>,
}

impl MethodDescriptor {
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub(crate) fn call(&self, this: &Instance, args: &mut CallArgs<'_>) -> Result<(), BoxError> {
        (self.func)(this, args)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Constructor and methods of one injectable type.
pub struct TypeDescriptor {
    name: Arc<str>,
    constructor: Signature,
    construct: Option<Arc<ConstructFn>>,
    methods: IndexMap<String, MethodDescriptor>,
}

impl TypeDescriptor {
    /// Describe a type that is not instantiable until a constructor is added.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            constructor: Signature::new(),
            construct: None,
            methods: IndexMap::new(),
        }
    }

    /// Set the constructor signature and body.
    pub fn constructor<T, F>(mut self, signature: Signature, construct: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let name = Arc::clone(&self.name);
        self.constructor = signature;
        self.construct = Some(Arc::new(move |args: &Arguments| {
            construct(args).map(|value| Instance::new(Arc::clone(&name), value))
        }));
        self
    }

    /// Use `T::default()` as a parameterless constructor.
    pub fn default_constructor<T>(self) -> Self
    where
        T: Default + Any + Send + Sync,
    {
        self.constructor(Signature::new(), |_| Ok(T::default()))
    }

    /// Register a method callable on instances of `T`.
    pub fn method<T, F>(mut self, name: impl Into<String>, signature: Signature, func: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&T, &mut CallArgs<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let type_name = Arc::clone(&self.name);
        let func = method_fn(move |instance, args| {
            let this = instance
                .downcast_ref::<T>()
                .ok_or_else(|| format!("instance is not a {type_name}"))?;
            func(this, args)
        });
        self.methods
            .insert(name.into(), MethodDescriptor { signature, func });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constructor_signature(&self) -> &Signature {
        &self.constructor
    }

    pub fn is_instantiable(&self) -> bool {
        self.construct.is_some()
    }

    pub fn method_descriptor(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    /// Construct an instance; `None` when the type has no constructor.
    pub fn instantiate(&self, args: &Arguments) -> Option<Result<Instance, BoxError>> {
        self.construct.as_ref().map(|construct| construct(args))
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("constructor", &self.constructor)
            .field("instantiable", &self.is_instantiable())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Reference to something whose signature can be inspected.
#[derive(Debug, Clone, Copy)]
pub enum CallableRef<'a> {
    /// A named free function.
    Function(&'a str),
    /// A method of a registered type.
    Method { type_name: &'a str, method: &'a str },
    /// The constructor of a registered type.
    Constructor(&'a str),
    /// A closure carried inline.
    Inline(&'a Callable),
}

impl<'a> CallableRef<'a> {
    /// Parse `"Type::method"` or a bare function name.
    pub fn parse(reference: &'a str) -> Self {
        match reference.split_once("::") {
            Some((type_name, method)) => CallableRef::Method { type_name, method },
            None => CallableRef::Function(reference),
        }
    }
}

/// Registry of injectable types and named functions.
#[derive(Debug, Default, Clone)]
pub struct Container {
    types: HashMap<String, Arc<TypeDescriptor>>,
    functions: HashMap<String, Callable>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type; a later registration under the same name replaces it.
    pub fn register_type(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        tracing::debug!(type_name = %descriptor.name(), "Registering type");
        self.types
            .insert(descriptor.name().to_string(), Arc::new(descriptor));
        self
    }

    /// Register a named free function.
    pub fn register_function(&mut self, name: impl Into<String>, callable: Callable) -> &mut Self {
        self.functions.insert(name.into(), callable);
        self
    }

    pub fn function(&self, name: &str) -> Option<&Callable> {
        self.functions.get(name)
    }

    pub fn type_descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name).map(Arc::as_ref)
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Declared parameters of a callable.
    ///
    /// Anything that cannot be found yields the empty signature.
    pub fn signature_of(&self, callable: CallableRef<'_>) -> Signature {
        let found = match callable {
            CallableRef::Function(name) => self.function(name).map(Callable::signature),
            CallableRef::Method { type_name, method } => self
                .type_descriptor(type_name)
                .and_then(|t| t.method_descriptor(method))
                .map(MethodDescriptor::signature),
            CallableRef::Constructor(type_name) => self
                .type_descriptor(type_name)
                .map(TypeDescriptor::constructor_signature),
            CallableRef::Inline(callable) => Some(callable.signature()),
        };
        found.cloned().unwrap_or_default()
    }

    /// Construct a registered type from a prepared argument set.
    ///
    /// Returns `Ok(None)` for unknown or non-instantiable types; constructor
    /// failures are application errors.
    pub fn instantiate(&self, type_name: &str, args: &Arguments) -> Result<Option<Instance>, BoxError> {
        match self.type_descriptor(type_name).and_then(|t| t.instantiate(args)) {
            Some(result) => result.map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Greeter {
        greeting: String,
    }

    fn container() -> Container {
        let mut container = Container::new();
        container
            .register_type(
                TypeDescriptor::new("Greeter")
                    .constructor(Signature::new().param("greeting", "string"), |args| {
                        Ok(Greeter {
                            greeting: args.str("greeting").unwrap_or("hi").to_string(),
                        })
                    })
                    .method::<Greeter, _>(
                        "greet",
                        Signature::new().response("response").param("name", "string"),
                        |this, args| {
                            let line = format!("{} {}", this.greeting, args.str("name").unwrap_or(""));
                            if let Some(res) = args.response() {
                                res.write(line);
                            }
                            Ok(())
                        },
                    ),
            )
            .register_type(TypeDescriptor::new("Contract"))
            .register_function(
                "verify_token",
                Callable::new(Signature::new().request("request"), |_| Ok(())),
            );
        container
    }

    #[test]
    fn test_signature_of_known_callables() {
        let c = container();
        let sig = c.signature_of(CallableRef::parse("Greeter::greet"));
        assert_eq!(sig.as_map().keys().collect::<Vec<_>>(), vec!["response", "name"]);

        let sig = c.signature_of(CallableRef::parse("verify_token"));
        assert_eq!(sig.as_map().get("request").map(String::as_str), Some("Request"));

        let sig = c.signature_of(CallableRef::Constructor("Greeter"));
        assert_eq!(sig.len(), 1);
    }

    #[test]
    fn test_signature_of_unknown_is_empty() {
        let c = container();
        assert!(c.signature_of(CallableRef::parse("missing_fn")).is_empty());
        assert!(c.signature_of(CallableRef::parse("Greeter::missing")).is_empty());
        assert!(c.signature_of(CallableRef::parse("Nope::greet")).is_empty());
    }

    #[test]
    fn test_instantiate() {
        let c = container();
        let args = Arguments::new().with("greeting", "hello");
        let instance = c.instantiate("Greeter", &args).unwrap().unwrap();
        assert_eq!(instance.type_name(), "Greeter");
        assert_eq!(instance.downcast_ref::<Greeter>().unwrap().greeting, "hello");

        assert!(c.instantiate("Contract", &args).unwrap().is_none());
        assert!(c.instantiate("Unknown", &args).unwrap().is_none());
    }

    #[test]
    fn test_default_constructor() {
        let mut c = Container::new();
        c.register_type(TypeDescriptor::new("Greeter").default_constructor::<Greeter>());
        let instance = c.instantiate("Greeter", &Arguments::new()).unwrap().unwrap();
        assert_eq!(instance.downcast_ref::<Greeter>().unwrap().greeting, "");
    }
}
