//! Route table.
//!
//! # Responsibilities
//! - Store one [`RouteRecord`] per (method, path)
//! - Exact-path lookup
//! - Union with another table (`append`)
//! - Export for inspection
//!
//! # Design Decisions
//! - Per-method maps keep insertion order; pattern scanning relies on it
//! - Re-inserting a path replaces the record but keeps its position
//! - On `append`, incoming routes are ordered first and the receiver's
//!   records win on collision

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::http::Method;
use crate::inject::Arguments;
use crate::routing::{CompiledPattern, HandlerRef, MiddlewareRef};

/// One registered route.
#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub template: String,
    pub pattern: CompiledPattern,
    pub handler: HandlerRef,
    pub middleware: Vec<MiddlewareRef>,
    /// Manually supplied dependency arguments.
    pub presets: Arguments,
}

impl RouteRecord {
    /// Build a record, compiling the template.
    pub fn new(template: impl Into<String>, handler: HandlerRef) -> Self {
        let template = template.into();
        Self {
            pattern: CompiledPattern::compile(&template),
            template,
            handler,
            middleware: Vec::new(),
            presets: Arguments::new(),
        }
    }

    pub fn with_middleware(mut self, middleware: Vec<MiddlewareRef>) -> Self {
        self.middleware = middleware;
        self
    }

    pub fn with_presets(mut self, presets: Arguments) -> Self {
        self.presets = presets;
        self
    }
}

impl Serialize for RouteRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("callback", &self.handler)?;
        map.serialize_entry("middlewares", &self.middleware)?;
        map.serialize_entry("di", &self.presets)?;
        match &self.pattern {
            CompiledPattern::Static => {}
            CompiledPattern::Parametric { regex, params, .. } => {
                map.serialize_entry("regex", regex.as_str())?;
                let arguments: Vec<String> = params
                    .iter()
                    .map(|p| format!("{}:{}{}", p.ty, p.name, if p.optional { "?" } else { "" }))
                    .collect();
                map.serialize_entry("arguments", &arguments)?;
            }
            CompiledPattern::Invalid { reason } => {
                map.serialize_entry("invalid", reason)?;
            }
        }
        map.end()
    }
}

/// Routes keyed by method, then by path.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: IndexMap<Method, IndexMap<String, RouteRecord>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under the record's template; an existing path is overwritten.
    pub fn insert(&mut self, method: Method, record: RouteRecord) {
        self.routes
            .entry(method)
            .or_default()
            .insert(record.template.clone(), record);
    }

    pub fn has_method(&self, method: Method) -> bool {
        self.routes.contains_key(&method)
    }

    /// All routes of one method, in insertion order.
    pub fn routes(&self, method: Method) -> Option<&IndexMap<String, RouteRecord>> {
        self.routes.get(&method)
    }

    /// Exact-path probe. Records with malformed templates are never returned.
    pub fn lookup(&self, method: Method, path: &str) -> Option<&RouteRecord> {
        self.routes
            .get(&method)
            .and_then(|routes| routes.get(path))
            .filter(|record| !record.pattern.is_invalid())
    }

    /// Methods that have at least one route.
    pub fn methods(&self) -> impl Iterator<Item = Method> + '_ {
        self.routes.keys().copied()
    }

    /// Every record as `(method, path, record)`.
    pub fn iter(&self) -> impl Iterator<Item = (Method, &str, &RouteRecord)> {
        self.routes.iter().flat_map(|(method, routes)| {
            routes
                .iter()
                .map(move |(path, record)| (*method, path.as_str(), record))
        })
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.routes.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge another table in. Records already present here take precedence.
    pub fn append(&mut self, other: RouteTable) -> &mut Self {
        let mut merged = other.routes;
        for (method, routes) in std::mem::take(&mut self.routes) {
            let target = merged.entry(method).or_default();
            for (path, record) in routes {
                target.insert(path, record);
            }
        }
        self.routes = merged;
        self
    }

    /// Re-key every route under `prefix`, recompiling the templates.
    pub fn mount(self, prefix: &str) -> RouteTable {
        let prefix = prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return self;
        }

        let mut mounted = RouteTable::new();
        for (method, routes) in self.routes {
            for (path, record) in routes {
                let template = if path == "/" {
                    prefix.to_string()
                } else {
                    format!("{prefix}{path}")
                };
                let remounted = RouteRecord::new(template, record.handler)
                    .with_middleware(record.middleware)
                    .with_presets(record.presets);
                mounted.insert(method, remounted);
            }
        }
        mounted
    }

    /// JSON export of the whole table.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for RouteTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.routes.len()))?;
        for (method, routes) in &self.routes {
            map.serialize_entry(method.as_str(), routes)?;
        }
        map.end()
    }
}
