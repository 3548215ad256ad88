//! Handler and middleware references.
//!
//! Routes refer to their targets either inline (a [`Callable`]) or by name,
//! resolved against the [`Container`](crate::inject::Container) at dispatch
//! time. Each shape is a variant; the dispatcher resolves them with one match.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::BoxError;
use crate::inject::{Arguments, CallArgs, Callable, Signature, Value};

/// Method called on types registered without an explicit method.
pub const DEFAULT_METHOD: &str = "index";
/// Method called on invokable types.
pub const INVOKE_METHOD: &str = "invoke";

/// What a route executes.
#[derive(Debug, Clone, Default)]
pub enum HandlerRef {
    /// No handler was supplied.
    #[default]
    Missing,
    /// An inline closure.
    Closure(Callable),
    /// A registered type (constructed without arguments, `index` is called)
    /// or, failing that, a registered function.
    Named(String),
    /// A type constructed through dependency resolution whose `invoke`
    /// method is called.
    Invokable { type_name: String, presets: Arguments },
    /// A method of a registered type. Presets are constructor arguments
    /// and are moved onto the route record when the route is saved.
    Method {
        type_name: String,
        method: String,
        presets: Arguments,
    },
}

impl HandlerRef {
    /// Inline closure handler.
    pub fn closure<F>(signature: Signature, func: F) -> Self
    where
        F: Fn(&mut CallArgs<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        HandlerRef::Closure(Callable::new(signature, func))
    }

    /// `Type::method`, constructed without arguments.
    pub fn method(type_name: impl Into<String>, method: impl Into<String>) -> Self {
        HandlerRef::Method {
            type_name: type_name.into(),
            method: method.into(),
            presets: Arguments::new(),
        }
    }

    /// `Type::method`, constructed with injected dependencies.
    pub fn injected(
        type_name: impl Into<String>,
        method: impl Into<String>,
        presets: Arguments,
    ) -> Self {
        HandlerRef::Method {
            type_name: type_name.into(),
            method: method.into(),
            presets,
        }
    }

    /// Invokable type, constructed with injected dependencies.
    pub fn invokable(type_name: impl Into<String>, presets: Arguments) -> Self {
        HandlerRef::Invokable {
            type_name: type_name.into(),
            presets,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, HandlerRef::Missing)
    }
}

impl From<&str> for HandlerRef {
    /// `"Type::method"` or a bare type / function name.
    fn from(reference: &str) -> Self {
        match reference.split_once("::") {
            Some((type_name, method)) => HandlerRef::method(type_name, method),
            None => HandlerRef::Named(reference.to_string()),
        }
    }
}

impl From<String> for HandlerRef {
    fn from(reference: String) -> Self {
        HandlerRef::from(reference.as_str())
    }
}

impl From<Callable> for HandlerRef {
    fn from(callable: Callable) -> Self {
        HandlerRef::Closure(callable)
    }
}

impl<T: Into<HandlerRef>> From<Option<T>> for HandlerRef {
    fn from(handler: Option<T>) -> Self {
        handler.map_or(HandlerRef::Missing, Into::into)
    }
}

impl Serialize for HandlerRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HandlerRef::Missing => serializer.serialize_none(),
            HandlerRef::Closure(_) => serializer.serialize_str("Closure"),
            HandlerRef::Named(name) => serializer.serialize_str(name),
            HandlerRef::Invokable { type_name, presets } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(type_name)?;
                seq.serialize_element(presets)?;
                seq.end()
            }
            HandlerRef::Method {
                type_name,
                method,
                presets,
            } => {
                let len = if presets.is_empty() { 2 } else { 3 };
                let mut seq = serializer.serialize_seq(Some(len))?;
                seq.serialize_element(type_name)?;
                seq.serialize_element(method)?;
                if !presets.is_empty() {
                    seq.serialize_element(presets)?;
                }
                seq.end()
            }
        }
    }
}

/// A middleware entry of a route.
#[derive(Debug, Clone)]
pub enum MiddlewareRef {
    /// A registered function, with explicit positional arguments.
    Function { name: String, args: Vec<Value> },
    /// A method of a registered type, constructed without arguments.
    Method {
        type_name: String,
        method: String,
        args: Vec<Value>,
    },
    /// An inline closure.
    Closure(Callable),
}

impl MiddlewareRef {
    pub fn function(name: impl Into<String>) -> Self {
        MiddlewareRef::Function {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn method(type_name: impl Into<String>, method: impl Into<String>) -> Self {
        MiddlewareRef::Method {
            type_name: type_name.into(),
            method: method.into(),
            args: Vec::new(),
        }
    }

    pub fn closure<F>(signature: Signature, func: F) -> Self
    where
        F: Fn(&mut CallArgs<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        MiddlewareRef::Closure(Callable::new(signature, func))
    }

    /// Attach explicit positional arguments; closures ignore them.
    pub fn with_args<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        match &mut self {
            MiddlewareRef::Function { args, .. } | MiddlewareRef::Method { args, .. } => {
                args.extend(values.into_iter().map(Into::into));
            }
            MiddlewareRef::Closure(_) => {}
        }
        self
    }

    /// Explicit positional arguments.
    pub fn args(&self) -> &[Value] {
        match self {
            MiddlewareRef::Function { args, .. } | MiddlewareRef::Method { args, .. } => args,
            MiddlewareRef::Closure(_) => &[],
        }
    }

    /// Display name used in errors and logs.
    pub fn name(&self) -> String {
        match self {
            MiddlewareRef::Function { name, .. } => name.clone(),
            MiddlewareRef::Method {
                type_name, method, ..
            } => format!("{type_name}::{method}"),
            MiddlewareRef::Closure(_) => "Closure".to_string(),
        }
    }
}

impl From<&str> for MiddlewareRef {
    /// `"Type::method"` or a function name.
    fn from(reference: &str) -> Self {
        match reference.split_once("::") {
            Some((type_name, method)) => MiddlewareRef::method(type_name, method),
            None => MiddlewareRef::function(reference),
        }
    }
}

impl From<String> for MiddlewareRef {
    fn from(reference: String) -> Self {
        MiddlewareRef::from(reference.as_str())
    }
}

impl From<Callable> for MiddlewareRef {
    fn from(callable: Callable) -> Self {
        MiddlewareRef::Closure(callable)
    }
}

impl Serialize for MiddlewareRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MiddlewareRef::Function { name, args } if args.is_empty() => {
                serializer.serialize_str(name)
            }
            MiddlewareRef::Function { name, args } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(name, args)?;
                map.end()
            }
            MiddlewareRef::Method {
                type_name,
                method,
                args,
            } => {
                let mut seq = serializer.serialize_seq(Some(2 + args.len()))?;
                seq.serialize_element(type_name)?;
                seq.serialize_element(method)?;
                for arg in args {
                    seq.serialize_element(arg)?;
                }
                seq.end()
            }
            MiddlewareRef::Closure(_) => serializer.serialize_str("Closure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_references() {
        assert!(matches!(
            HandlerRef::from("HomeController::show"),
            HandlerRef::Method { ref type_name, ref method, .. } if type_name == "HomeController" && method == "show"
        ));
        assert!(matches!(HandlerRef::from("HomeController"), HandlerRef::Named(ref n) if n == "HomeController"));
        assert!(HandlerRef::from(None::<&str>).is_missing());

        let mw = MiddlewareRef::from("Auth::check").with_args([1, 2]);
        assert_eq!(mw.name(), "Auth::check");
        assert_eq!(mw.args(), &[Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_serialize() {
        let handler = HandlerRef::injected("Mailer", "send", Arguments::new().with("retries", 3));
        assert_eq!(
            serde_json::to_value(&handler).unwrap(),
            json!(["Mailer", "send", {"retries": 3}])
        );

        let middleware = vec![
            MiddlewareRef::function("verify_token"),
            MiddlewareRef::function("throttle").with_args([10]),
            MiddlewareRef::method("Auth", "check").with_args(["admin"]),
            MiddlewareRef::closure(Signature::new(), |_| Ok(())),
        ];
        assert_eq!(
            serde_json::to_value(&middleware).unwrap(),
            json!(["verify_token", {"throttle": [10]}, ["Auth", "check", "admin"], "Closure"])
        );
    }
}
