//! Response abstraction written by handlers and middleware.
//!
//! # Responsibilities
//! - Hold status code, reason phrase, headers and body for one request
//! - Offer the chainable `status` / `header` / `send` operations
//! - Serialize the body for the host layer
//!
//! # Design Decisions
//! - Request-scoped value, never shared between dispatches
//! - `send` encodes JSON; `write` appends raw text (echo semantics)
//! - Header names keep their original case; lookup is case-insensitive

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Response body content.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResponseBody {
    #[default]
    Empty,
    Text(String),
    Json(JsonValue),
}

/// Outgoing response built during dispatch.
#[derive(Debug, Clone)]
pub struct Response {
    status_code: u16,
    status_message: String,
    headers: IndexMap<String, String>,
    body: ResponseBody,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status_code: 200,
            status_message: String::new(),
            headers: IndexMap::new(),
            body: ResponseBody::Empty,
        }
    }
}

impl Response {
    /// Create an empty `200` response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status code and reason phrase.
    pub fn status(&mut self, code: u16, message: impl Into<String>) -> &mut Self {
        self.status_code = code;
        self.status_message = message.into();
        self
    }

    /// Set a header, replacing any previous value with the same (case-insensitive) name.
    pub fn header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        if let Some(existing) = self
            .headers
            .keys()
            .find(|k| k.eq_ignore_ascii_case(&key))
            .cloned()
        {
            self.headers.shift_remove(&existing);
        }
        self.headers.insert(key, value.into());
        self
    }

    /// Set several headers at once.
    pub fn headers<K, V>(&mut self, headers: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in headers {
            self.header(key, value);
        }
        self
    }

    /// Replace the body with the JSON encoding of `data`.
    pub fn send<T: Serialize + ?Sized>(&mut self, data: &T) -> Result<&mut Self, serde_json::Error> {
        self.body = ResponseBody::Json(serde_json::to_value(data)?);
        Ok(self)
    }

    /// Replace the body with an already built JSON value.
    pub fn with_body(&mut self, body: JsonValue) -> &mut Self {
        self.body = ResponseBody::Json(body);
        self
    }

    /// Append raw text to the body.
    pub fn write(&mut self, text: impl AsRef<str>) -> &mut Self {
        match &mut self.body {
            ResponseBody::Text(existing) => existing.push_str(text.as_ref()),
            _ => self.body = ResponseBody::Text(text.as_ref().to_string()),
        }
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Look up a header value (case-insensitive).
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over headers in insertion order.
    pub fn header_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Body as text: JSON is encoded, raw text returned as is.
    pub fn body_text(&self) -> String {
        match &self.body {
            ResponseBody::Empty => String::new(),
            ResponseBody::Text(text) => text.clone(),
            ResponseBody::Json(value) => value.to_string(),
        }
    }

    /// Default content type for the current body, if any.
    pub fn content_type(&self) -> Option<&'static str> {
        match self.body {
            ResponseBody::Empty => None,
            ResponseBody::Text(_) => Some("text/plain; charset=utf-8"),
            ResponseBody::Json(_) => Some("application/json"),
        }
    }
}
