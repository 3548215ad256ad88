//! Callable signatures.
//!
//! Rust closures carry no parameter metadata, so every handler, middleware,
//! method and constructor is registered together with an explicit
//! [`Signature`]. The dispatcher and the dependency resolver read these
//! descriptors the same way a reflection API would be read.

use indexmap::IndexMap;

use crate::inject::Value;

/// Type name bound to the shared request.
pub const REQUEST_TYPE: &str = "Request";
/// Type name bound to the shared response.
pub const RESPONSE_TYPE: &str = "Response";
/// Rendered type of a parameter declared without a type.
pub const UNTYPED: &str = "nothing";
/// Rendered type of a parameter declared with several types.
pub const MIXED: &str = "mixed";

const BUILTINS: [&str; 7] = ["int", "float", "double", "bool", "string", "array", "mixed"];

/// Declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeHint {
    Untyped,
    Mixed,
    Named(String),
}

impl TypeHint {
    /// Rendered type name, using the `nothing` / `mixed` sentinels.
    pub fn name(&self) -> &str {
        match self {
            TypeHint::Untyped => UNTYPED,
            TypeHint::Mixed => MIXED,
            TypeHint::Named(name) => name,
        }
    }

    /// Case-insensitive comparison against a type name.
    pub fn is(&self, type_name: &str) -> bool {
        matches!(self, TypeHint::Named(name) if name.eq_ignore_ascii_case(type_name))
    }

    /// True for primitive types and `mixed`.
    pub fn is_builtin(&self) -> bool {
        match self {
            TypeHint::Untyped => false,
            TypeHint::Mixed => true,
            TypeHint::Named(name) => BUILTINS.iter().any(|b| b.eq_ignore_ascii_case(name)),
        }
    }

    /// Zero value for builtin scalar types.
    pub fn zero_value(&self) -> Option<Value> {
        let TypeHint::Named(name) = self else {
            return None;
        };
        match name.to_ascii_lowercase().as_str() {
            "int" => Some(Value::Int(0)),
            "float" | "double" => Some(Value::Float(0.0)),
            "bool" => Some(Value::Bool(false)),
            "string" => Some(Value::Str(String::new())),
            "array" => Some(Value::List(Vec::new())),
            _ => None,
        }
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub hint: TypeHint,
    pub nullable: bool,
    pub has_default: bool,
}

impl Param {
    fn new(name: impl Into<String>, hint: TypeHint) -> Self {
        Self {
            name: name.into(),
            hint,
            nullable: false,
            has_default: false,
        }
    }
}

/// Ordered parameter list of a callable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    /// A signature without parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a typed parameter.
    pub fn param(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.push(Param::new(name, TypeHint::Named(type_name.into())))
    }

    /// Add a parameter without a declared type.
    pub fn untyped(self, name: impl Into<String>) -> Self {
        self.push(Param::new(name, TypeHint::Untyped))
    }

    /// Add a parameter declared with several types.
    pub fn union(self, name: impl Into<String>, type_names: &[&str]) -> Self {
        let hint = match type_names {
            [] => TypeHint::Untyped,
            [single] => TypeHint::Named((*single).to_string()),
            _ => TypeHint::Mixed,
        };
        self.push(Param::new(name, hint))
    }

    /// Add a nullable typed parameter.
    pub fn nullable(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let mut param = Param::new(name, TypeHint::Named(type_name.into()));
        param.nullable = true;
        self.push(param)
    }

    /// Add a typed parameter that has a default value.
    pub fn optional(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let mut param = Param::new(name, TypeHint::Named(type_name.into()));
        param.has_default = true;
        self.push(param)
    }

    /// Add a parameter bound to the shared request.
    pub fn request(self, name: impl Into<String>) -> Self {
        self.param(name, REQUEST_TYPE)
    }

    /// Add a parameter bound to the shared response.
    pub fn response(self, name: impl Into<String>) -> Self {
        self.param(name, RESPONSE_TYPE)
    }

    fn push(mut self, param: Param) -> Self {
        // first declaration of a name wins
        if !self.params.iter().any(|p| p.name == param.name) {
            self.params.push(param);
        }
        self
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Ordered `name -> type name` mapping.
    pub fn as_map(&self) -> IndexMap<String, String> {
        self.params
            .iter()
            .map(|p| (p.name.clone(), p.hint.name().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_in_map() {
        let sig = Signature::new()
            .request("request")
            .untyped("payload")
            .union("id", &["int", "string"])
            .param("amount", "float");

        let map = sig.as_map();
        let pairs: Vec<_> = map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("request", "Request"),
                ("payload", "nothing"),
                ("id", "mixed"),
                ("amount", "float"),
            ]
        );
    }

    #[test]
    fn test_single_type_union_is_named() {
        let sig = Signature::new().union("id", &["int"]);
        assert_eq!(sig.get("id").unwrap().hint, TypeHint::Named("int".into()));
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let sig = Signature::new().param("id", "int").param("id", "string");
        assert_eq!(sig.len(), 1);
        assert!(sig.get("id").unwrap().hint.is("INT"));
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(TypeHint::Named("int".into()).zero_value(), Some(Value::Int(0)));
        assert_eq!(TypeHint::Named("double".into()).zero_value(), Some(Value::Float(0.0)));
        assert_eq!(TypeHint::Named("bool".into()).zero_value(), Some(Value::Bool(false)));
        assert_eq!(TypeHint::Named("string".into()).zero_value(), Some(Value::Str(String::new())));
        assert_eq!(TypeHint::Named("Logger".into()).zero_value(), None);
        assert!(TypeHint::Mixed.is_builtin());
        assert!(!TypeHint::Untyped.is_builtin());
    }
}
