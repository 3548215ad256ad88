//! Fluent route registration.
//!
//! # Responsibilities
//! - Accumulate prefix and middleware across a chain of calls
//! - Buffer route drafts until they are saved
//! - Merge drafts into the [`RouteTable`]
//!
//! # Design Decisions
//! - The chain state is an explicit [`RegistrationSession`]
//! - `save(true)` ends a chain (prefix and middleware cleared);
//!   `save(false)` only flushes drafts, so a group can be followed by
//!   more routes under the same context
//! - A draft registered without middleware inherits the session's list at
//!   save time, and a draft registered before any prefix was set takes the
//!   prefix active at save time
//!
//! # Example
//! ```
//! use front_router::routing::Routes;
//! use front_router::http::Method;
//!
//! let mut routes = Routes::new();
//! routes
//!     .prefix("/api")
//!     .middleware(["verify_token"])
//!     .get("/users", "UserController::list")
//!     .post("/users", "UserController::create")
//!     .save(true);
//! routes.add("/", "HomeController", &[Method::Get]);
//!
//! let table = routes.finish();
//! assert!(table.lookup(Method::Post, "/api/users").is_some());
//! assert!(table.lookup(Method::Get, "/").unwrap().middleware.is_empty());
//! ```

use crate::http::Method;
use crate::inject::Arguments;
use crate::routing::{HandlerRef, MiddlewareRef, RouteRecord, RouteTable};

/// A route waiting to be merged into the table.
#[derive(Debug, Clone)]
pub struct Draft {
    pub method: Method,
    /// Path with the prefix that was active at registration.
    pub path: String,
    /// The prefix applied to `path`; empty when none was set yet.
    pub prefix: String,
    pub handler: HandlerRef,
    pub middleware: Vec<MiddlewareRef>,
}

/// Context carried across one registration chain.
#[derive(Debug, Clone, Default)]
pub struct RegistrationSession {
    prefix: String,
    middleware: Vec<MiddlewareRef>,
    drafts: Vec<Draft>,
}

impl RegistrationSession {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn middleware(&self) -> &[MiddlewareRef] {
        &self.middleware
    }

    pub fn drafts(&self) -> &[Draft] {
        &self.drafts
    }
}

/// Route registration API.
#[derive(Debug, Clone, Default)]
pub struct Routes {
    table: RouteTable,
    session: RegistrationSession,
}

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the current prefix.
    pub fn prefix(&mut self, prefix: &str) -> &mut Self {
        self.session.prefix.push_str(prefix);
        self
    }

    /// Extend the current middleware list.
    pub fn middleware<I, M>(&mut self, middleware: I) -> &mut Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MiddlewareRef>,
    {
        self.session
            .middleware
            .extend(middleware.into_iter().map(Into::into));
        self
    }

    /// Add a draft for each method without merging it.
    pub fn route(
        &mut self,
        path: &str,
        handler: impl Into<HandlerRef>,
        methods: &[Method],
    ) -> &mut Self {
        let path = join_path(&self.session.prefix, path);
        let handler = handler.into();
        for method in methods {
            self.session.drafts.push(Draft {
                method: *method,
                path: path.clone(),
                prefix: self.session.prefix.clone(),
                handler: handler.clone(),
                middleware: self.session.middleware.clone(),
            });
        }
        self
    }

    /// Register and save immediately, ending the chain.
    pub fn add(&mut self, path: &str, handler: impl Into<HandlerRef>, methods: &[Method]) {
        self.route(path, handler, methods);
        self.save(true);
    }

    pub fn get(&mut self, path: &str, handler: impl Into<HandlerRef>) -> &mut Self {
        self.route(path, handler, &[Method::Get])
    }

    pub fn post(&mut self, path: &str, handler: impl Into<HandlerRef>) -> &mut Self {
        self.route(path, handler, &[Method::Post])
    }

    pub fn put(&mut self, path: &str, handler: impl Into<HandlerRef>) -> &mut Self {
        self.route(path, handler, &[Method::Put])
    }

    pub fn patch(&mut self, path: &str, handler: impl Into<HandlerRef>) -> &mut Self {
        self.route(path, handler, &[Method::Patch])
    }

    pub fn delete(&mut self, path: &str, handler: impl Into<HandlerRef>) -> &mut Self {
        self.route(path, handler, &[Method::Delete])
    }

    pub fn options(&mut self, path: &str, handler: impl Into<HandlerRef>) -> &mut Self {
        self.route(path, handler, &[Method::Options])
    }

    /// Merge pending drafts into the table.
    ///
    /// With `reset_context` the prefix and middleware are cleared as well.
    pub fn save(&mut self, reset_context: bool) -> &mut Self {
        let session = &mut self.session;
        for draft in std::mem::take(&mut session.drafts) {
            let middleware = if draft.middleware.is_empty() {
                session.middleware.clone()
            } else {
                draft.middleware
            };

            let path = if draft.prefix.is_empty() && !session.prefix.is_empty() {
                join_path(&session.prefix, &draft.path)
            } else {
                draft.path
            };

            let (handler, presets) = match draft.handler {
                HandlerRef::Method {
                    type_name,
                    method,
                    presets,
                } => (
                    HandlerRef::Method {
                        type_name,
                        method,
                        presets: Arguments::new(),
                    },
                    presets,
                ),
                other => (other, Arguments::new()),
            };

            tracing::debug!(
                method = %draft.method,
                path = %path,
                middleware = middleware.len(),
                "Registered route"
            );
            let record = RouteRecord::new(path, handler)
                .with_middleware(middleware)
                .with_presets(presets);
            self.table.insert(draft.method, record);
        }

        if reset_context {
            session.prefix.clear();
            session.middleware.clear();
        }
        self
    }

    /// Union another table into this one; existing routes win on collision.
    pub fn append(&mut self, other: impl Into<RouteTable>) -> &mut Self {
        self.table.append(other.into());
        self
    }

    /// The merged routes. Pending drafts are not included.
    pub fn get_routes(&self) -> &RouteTable {
        &self.table
    }

    pub fn session(&self) -> &RegistrationSession {
        &self.session
    }

    /// Save pending drafts and return the table.
    pub fn finish(mut self) -> RouteTable {
        self.save(true);
        self.table
    }
}

impl From<Routes> for RouteTable {
    fn from(routes: Routes) -> Self {
        routes.finish()
    }
}

/// Prefix a path and trim trailing slashes; the root stays `/`.
fn join_path(prefix: &str, path: &str) -> String {
    let joined = format!("{prefix}{path}");
    let trimmed = joined.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
