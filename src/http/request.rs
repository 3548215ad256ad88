//! Request abstraction consumed by the router.
//!
//! # Responsibilities
//! - Carry the method and normalized path used for route lookup
//! - Provide keyed access to query and body values
//! - Provide case-insensitive header access
//!
//! # Design Decisions
//! - Path is normalized once at construction (query stripped, trailing `/` trimmed)
//! - Body values override query values with the same key
//! - Only JSON objects and `application/x-www-form-urlencoded` bodies are decoded

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::http::Method;

/// An incoming request as seen by the dispatcher.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    data: IndexMap<String, JsonValue>,
    headers: IndexMap<String, String>,
}

impl Request {
    /// Create a request from a method and a request target (path plus optional query).
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };

        let mut data = IndexMap::new();
        if let Some(query) = query {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                data.insert(key.into_owned(), JsonValue::String(value.into_owned()));
            }
        }

        Self {
            method,
            path: normalize_path(path),
            data,
            headers: IndexMap::new(),
        }
    }

    /// The request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The normalized request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Look up a query or body value.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.data.get(key)
    }

    /// Look up a query or body value that is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(JsonValue::as_str)
    }

    /// All query and body values, in arrival order.
    pub fn data(&self) -> &IndexMap<String, JsonValue> {
        &self.data
    }

    /// Look up a header value (case-insensitive).
    pub fn headers(&self, key: &str) -> Option<&str> {
        self.headers
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Iterate over all headers as (lower-cased name, value) pairs.
    pub fn all_headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Add a header.
    pub fn with_header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert_header(key, value);
        self
    }

    /// Add a header in place.
    pub fn insert_header(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(key.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Add a keyed value, as if it arrived in the body.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Decode a raw body into keyed values.
    ///
    /// JSON objects are merged key by key; anything else is parsed as a form body.
    pub fn merge_body(&mut self, body: &[u8], content_type: Option<&str>) {
        if body.is_empty() {
            return;
        }

        let looks_like_json = content_type.is_some_and(|ct| ct.contains("json"))
            || body.first() == Some(&b'{');

        if looks_like_json {
            match serde_json::from_slice::<JsonValue>(body) {
                Ok(JsonValue::Object(map)) => {
                    self.data.extend(map);
                    return;
                }
                Ok(_) => return,
                Err(err) => {
                    tracing::debug!(error = %err, "Body is not a JSON object, trying form decoding");
                }
            }
        }

        for (key, value) in url::form_urlencoded::parse(body) {
            self.data
                .insert(key.into_owned(), JsonValue::String(value.into_owned()));
        }
    }
}

/// Normalize a raw request path for lookup.
///
/// Strips any query string and trims trailing slashes, keeping the root as `/`.
pub fn normalize_path(raw: &str) -> String {
    let path = raw.split('?').next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_normalization() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/users/"), "/users");
        assert_eq!(normalize_path("/users?page=2"), "/users");
    }

    #[test]
    fn test_query_values() {
        let req = Request::new(Method::Get, "/search/?q=rust&page=2");
        assert_eq!(req.path(), "/search");
        assert_eq!(req.get_str("q"), Some("rust"));
        assert_eq!(req.get_str("page"), Some("2"));
        assert!(req.get("missing").is_none());
    }

    #[test]
    fn test_json_body_overrides_query() {
        let mut req = Request::new(Method::Post, "/users?name=query");
        req.merge_body(br#"{"name":"body","age":31}"#, Some("application/json"));
        assert_eq!(req.get_str("name"), Some("body"));
        assert_eq!(req.get("age").and_then(JsonValue::as_i64), Some(31));
    }

    #[test]
    fn test_form_body() {
        let mut req = Request::new(Method::Put, "/users/1");
        req.merge_body(b"role=admin&active=1", None);
        assert_eq!(req.get_str("role"), Some("admin"));
        assert_eq!(req.get_str("active"), Some("1"));
    }

    #[test]
    fn test_headers_case_insensitive() {
        let req = Request::new(Method::Get, "/").with_header("X-Auth", "token");
        assert_eq!(req.headers("x-auth"), Some("token"));
        assert_eq!(req.headers("X-AUTH"), Some("token"));
        assert_eq!(req.all_headers().count(), 1);
    }
}
