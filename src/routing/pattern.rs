//! Route template compilation.
//!
//! # Responsibilities
//! - Classify a template as static or parametric
//! - Compile parametric templates into an anchored regex
//! - Record parameter names, declared types and optionality in order
//! - Coerce captured text into typed values
//!
//! # Design Decisions
//! - Compiled once at registration, immutable afterwards
//! - Malformed templates compile to [`CompiledPattern::Invalid`] and never match
//! - Unknown type prefixes fall back to `string`
//!
//! # Grammar
//! ```text
//! /literal            static segment
//! /{name}             required, string
//! /{int:name}         required, typed (int | float | double | bool | string)
//! /{name?}            optional, final segment only
//! ```

use std::fmt;

use regex::Regex;

use crate::inject::{Arguments, Value};

/// Declared type of a path parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamType {
    #[default]
    String,
    Int,
    Float,
    Bool,
}

impl ParamType {
    fn from_prefix(prefix: &str) -> Self {
        match prefix.to_ascii_lowercase().as_str() {
            "int" => ParamType::Int,
            "float" | "double" => ParamType::Float,
            "bool" => ParamType::Bool,
            _ => ParamType::String,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Bool => "bool",
        }
    }

    /// Convert captured text into a value of this type.
    ///
    /// Conversion never fails: text that is not a number becomes zero and
    /// anything other than a non-zero number or `"true"` is `false`.
    pub fn coerce(&self, raw: &str) -> Value {
        match self {
            ParamType::String => Value::Str(raw.to_string()),
            ParamType::Int => Value::Int(int_prefix(raw)),
            ParamType::Float => Value::Float(float_prefix(raw)),
            ParamType::Bool => Value::Bool(match numeric(raw) {
                Some(n) => n != 0.0,
                None => raw == "true",
            }),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One placeholder of a parametric template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub ty: ParamType,
    pub optional: bool,
}

/// Matcher derived from a route template.
#[derive(Debug, Clone)]
pub enum CompiledPattern {
    /// No placeholders; matched by exact lookup only.
    Static,
    Parametric {
        regex: Regex,
        params: Vec<ParamSpec>,
        segments: usize,
    },
    /// Malformed template, never matched.
    Invalid { reason: String },
}

impl CompiledPattern {
    /// Compile a prefixed, trimmed route template.
    pub fn compile(template: &str) -> Self {
        if !template.contains('{') && !template.contains('}') {
            return CompiledPattern::Static;
        }

        match compile_parametric(template) {
            Ok((regex, params)) => CompiledPattern::Parametric {
                regex,
                params,
                segments: segment_count(template),
            },
            Err(reason) => {
                tracing::warn!(template = %template, reason = %reason, "Malformed route template, route will never match");
                CompiledPattern::Invalid { reason }
            }
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, CompiledPattern::Static)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, CompiledPattern::Invalid { .. })
    }

    /// Declared parameters, in template order.
    pub fn params(&self) -> &[ParamSpec] {
        match self {
            CompiledPattern::Parametric { params, .. } => params,
            _ => &[],
        }
    }

    /// Cheap pre-filter on the number of `/`-separated segments.
    ///
    /// A template ending in an optional segment also accepts one segment fewer.
    pub fn accepts_segments(&self, count: usize) -> bool {
        match self {
            CompiledPattern::Parametric {
                params, segments, ..
            } => {
                let optional_tail = params.last().is_some_and(|p| p.optional);
                count == *segments || (optional_tail && count + 1 == *segments)
            }
            _ => false,
        }
    }

    /// Match a path and return the coerced parameter values.
    ///
    /// Optional parameters that were not supplied are left out.
    pub fn captures(&self, path: &str) -> Option<Arguments> {
        let CompiledPattern::Parametric { regex, params, .. } = self else {
            return None;
        };
        let caps = regex.captures(path)?;

        let mut values = Arguments::new();
        for (index, spec) in params.iter().enumerate() {
            if let Some(raw) = caps.get(index + 1) {
                values.insert(spec.name.clone(), spec.ty.coerce(raw.as_str()));
            }
        }
        Some(values)
    }
}

/// Number of `/`-separated segments, counting the empty leading one.
pub fn segment_count(path: &str) -> usize {
    path.split('/').count()
}

fn compile_parametric(template: &str) -> Result<(Regex, Vec<ParamSpec>), String> {
    let mut expr = String::from("^");
    let mut literal = String::new();
    let mut params: Vec<ParamSpec> = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find(['{', '}']) {
        if rest[open..].starts_with('}') {
            return Err("closing brace without opening brace".into());
        }
        literal.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| "unclosed placeholder".to_string())?;
        let body = &after[..close];
        if body.contains('{') {
            return Err("nested placeholder".into());
        }
        rest = &after[close + 1..];

        let spec = parse_placeholder(body)?;
        if params.iter().any(|p| p.name == spec.name) {
            return Err(format!("duplicate parameter `{}`", spec.name));
        }
        if params.last().is_some_and(|p| p.optional) {
            return Err("optional parameter must be the final segment".into());
        }

        if spec.optional {
            if !rest.is_empty() || !literal.ends_with('/') {
                return Err("optional parameter must be the final segment".into());
            }
            literal.pop();
            expr.push_str(&regex::escape(&literal));
            expr.push_str("(?:/([^/]+?))?");
            if literal.is_empty() {
                // "/{x?}": the bare root path has to match too
                expr.push_str("/?");
            }
        } else {
            expr.push_str(&regex::escape(&literal));
            expr.push_str("([^/]+?)");
        }
        literal.clear();
        params.push(spec);
    }

    literal.push_str(rest);
    expr.push_str(&regex::escape(&literal));
    expr.push('$');

    let regex = Regex::new(&expr).map_err(|e| e.to_string())?;
    Ok((regex, params))
}

fn parse_placeholder(body: &str) -> Result<ParamSpec, String> {
    let (body, optional) = match body.strip_suffix('?') {
        Some(stripped) => (stripped, true),
        None => (body, false),
    };
    let (ty, name) = match body.split_once(':') {
        Some((prefix, name)) => (ParamType::from_prefix(prefix), name),
        None => (ParamType::String, body),
    };
    if name.is_empty() || name.contains('/') {
        return Err(format!("invalid parameter name `{name}`"));
    }
    Ok(ParamSpec {
        name: name.to_string(),
        ty,
        optional,
    })
}

/// Leading integer of a string; `0` when there is none.
///
/// A numeric prefix written with an exponent (`1e3`) is read as a float and
/// truncated.
fn int_prefix(raw: &str) -> i64 {
    let s = raw.trim_start();
    let len = float_prefix_len(s);
    if s[..len].contains(['e', 'E']) {
        return float_prefix(s) as i64;
    }
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}

/// Length of the longest numeric prefix (sign, digits, fraction, exponent).
fn float_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    let mut digits = i - int_start;
    if bytes.get(i) == Some(&b'.') {
        let frac_start = i + 1;
        let mut j = frac_start;
        while bytes.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }
    if digits == 0 {
        return 0;
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while bytes.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}

/// Leading float of a string; `0.0` when there is none.
fn float_prefix(raw: &str) -> f64 {
    let s = raw.trim_start();
    let len = float_prefix_len(s);
    s[..len].parse().unwrap_or(0.0)
}

/// The value of a string that is entirely numeric.
fn numeric(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let len = float_prefix_len(s);
    if len == 0 || len != s.len() {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_template() {
        let pattern = CompiledPattern::compile("/users/list");
        assert!(pattern.is_static());
        assert!(pattern.params().is_empty());
        assert!(pattern.captures("/users/list").is_none());
    }

    #[test]
    fn test_typed_parameters() {
        let pattern = CompiledPattern::compile("/orders/{int:id}/items/{slug}");
        let specs: Vec<_> = pattern.params().iter().map(|p| (p.name.as_str(), p.ty)).collect();
        assert_eq!(specs, vec![("id", ParamType::Int), ("slug", ParamType::String)]);

        let values = pattern.captures("/orders/42/items/red-shoe").unwrap();
        assert_eq!(values.get("id"), Some(&Value::Int(42)));
        assert_eq!(values.get("slug"), Some(&Value::Str("red-shoe".into())));

        assert!(pattern.captures("/orders/42/items").is_none());
        assert!(pattern.captures("/orders/42/items/a/b").is_none());
    }

    #[test]
    fn test_non_numeric_int_is_zero() {
        let pattern = CompiledPattern::compile("/user/{int:id}");
        let values = pattern.captures("/user/abc").unwrap();
        assert_eq!(values.get("id"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_optional_tail() {
        let pattern = CompiledPattern::compile("/posts/{page?}");
        assert!(pattern.accepts_segments(3));
        assert!(pattern.accepts_segments(2));
        assert!(!pattern.accepts_segments(4));

        let values = pattern.captures("/posts").unwrap();
        assert!(values.is_empty());

        let values = pattern.captures("/posts/7").unwrap();
        assert_eq!(values.get("page"), Some(&Value::Str("7".into())));
    }

    #[test]
    fn test_optional_root_segment() {
        let pattern = CompiledPattern::compile("/{page?}");
        assert!(pattern.accepts_segments(segment_count("/")));

        let values = pattern.captures("/").unwrap();
        assert!(values.is_empty());

        let values = pattern.captures("/3").unwrap();
        assert_eq!(values.get("page"), Some(&Value::Str("3".into())));
        assert!(pattern.captures("/3/4").is_none());
    }

    #[test]
    fn test_placeholder_inside_segment() {
        let pattern = CompiledPattern::compile("/files/{name}.json");
        let values = pattern.captures("/files/report.json").unwrap();
        assert_eq!(values.get("name"), Some(&Value::Str("report".into())));
        assert!(pattern.captures("/files/report.xml").is_none());
    }

    #[test]
    fn test_literal_text_is_escaped() {
        let pattern = CompiledPattern::compile("/v1.0/{id}");
        assert!(pattern.captures("/v1.0/3").is_some());
        assert!(pattern.captures("/v1x0/3").is_none());
    }

    #[test]
    fn test_malformed_templates_are_invalid() {
        for template in [
            "/user/{id",
            "/user/id}",
            "/user/{{id}}",
            "/user/{}",
            "/a/{x}/{x}",
            "/a/{x?}/b",
            "/a/{x?}/{y}",
            "/a/prefix{x?}",
        ] {
            let pattern = CompiledPattern::compile(template);
            assert!(pattern.is_invalid(), "{template} should be invalid");
            assert!(pattern.captures(template).is_none());
            assert!(!pattern.accepts_segments(segment_count(template)));
        }
    }

    #[test]
    fn test_coercion() {
        assert_eq!(ParamType::Int.coerce("12abc"), Value::Int(12));
        assert_eq!(ParamType::Int.coerce("-7"), Value::Int(-7));
        assert_eq!(ParamType::Int.coerce("x"), Value::Int(0));
        assert_eq!(ParamType::Int.coerce("1e3"), Value::Int(1000));
        assert_eq!(ParamType::Int.coerce("1.5e3"), Value::Int(1500));
        assert_eq!(ParamType::Int.coerce("2.9"), Value::Int(2));
        assert_eq!(ParamType::Int.coerce("7e"), Value::Int(7));
        assert_eq!(ParamType::Float.coerce("2.5kg"), Value::Float(2.5));
        assert_eq!(ParamType::Float.coerce("1e3"), Value::Float(1000.0));
        assert_eq!(ParamType::Float.coerce("."), Value::Float(0.0));
        assert_eq!(ParamType::Bool.coerce("1"), Value::Bool(true));
        assert_eq!(ParamType::Bool.coerce("0"), Value::Bool(false));
        assert_eq!(ParamType::Bool.coerce("true"), Value::Bool(true));
        assert_eq!(ParamType::Bool.coerce("yes"), Value::Bool(false));
        assert_eq!(ParamType::from_prefix("double"), ParamType::Float);
        assert_eq!(ParamType::from_prefix("uuid"), ParamType::String);
    }
}
