//! Request dispatch.
//!
//! # Responsibilities
//! - Find the route for a method and path (exact, then pattern scan)
//! - Run the route's middleware chain
//! - Resolve the handler target, constructing types through the container
//! - Bind handler arguments and invoke it
//!
//! # Design Decisions
//! - The router is immutable after construction and can be shared across
//!   threads; request and response are per-call values
//! - Pattern scan is in registration order, first match wins
//! - Middleware errors abort the chain and the handler (fail fast)
//! - Application errors are passed through untouched
//!
//! # Data Flow
//! ```text
//! handle(request, response)
//!     → find (method routes → exact lookup → pattern scan + coercion)
//!     → middleware (bind: Request | Response | positional arg | path param | null)
//!     → target (closure | function | Type::index | Type::invoke | Type::method)
//!     → bind (Request | Response | path param | preset | null)
//!     → invoke
//! ```

use std::time::Instant;

use crate::error::{RouterError, RouterResult};
use crate::http::{normalize_path, Method, Request, Response};
use crate::inject::{
    Arguments, Bound, CallArgs, Callable, CallableRef, Container, DependencyResolver, Instance,
    MethodDescriptor, Signature, Value, REQUEST_TYPE, RESPONSE_TYPE,
};
use crate::observability::metrics;
use crate::routing::handler::{DEFAULT_METHOD, INVOKE_METHOD};
use crate::routing::pattern::segment_count;
use crate::routing::{HandlerRef, MiddlewareRef, RouteRecord, RouteTable};

/// A route selected for a request.
#[derive(Debug)]
pub struct RouteMatch<'r> {
    /// Key of the record in the table.
    pub path: &'r str,
    pub record: &'r RouteRecord,
    /// Coerced path parameters; empty for exact matches.
    pub params: Arguments,
}

/// Resolved invocation target.
enum Target<'a> {
    Callable(&'a Callable),
    Method {
        type_name: &'a str,
        name: &'a str,
        instance: Instance,
        method: &'a MethodDescriptor,
    },
}

impl Target<'_> {
    /// Declared parameters, as reported by the container's introspector.
    fn signature(&self, container: &Container) -> Signature {
        match self {
            Target::Callable(callable) => container.signature_of(CallableRef::Inline(*callable)),
            Target::Method {
                type_name, name, ..
            } => container.signature_of(CallableRef::Method {
                type_name: *type_name,
                method: *name,
            }),
        }
    }

    fn invoke(&self, args: &mut CallArgs<'_>) -> RouterResult<()> {
        let result = match self {
            Target::Callable(callable) => callable.call(args),
            Target::Method {
                instance, method, ..
            } => method.call(instance, args),
        };
        result.map_err(RouterError::Application)
    }
}

/// Dispatches requests against a finished route table.
#[derive(Debug, Default)]
pub struct Router {
    table: RouteTable,
    container: Container,
}

impl Router {
    /// Build a router from registered routes and the type registry.
    ///
    /// Pending drafts of a [`Routes`](crate::routing::Routes) value are saved first.
    pub fn new(routes: impl Into<RouteTable>, container: Container) -> Self {
        let table = routes.into();
        tracing::info!(routes = table.len(), "Router ready");
        Self { table, container }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Select the route for `method` and `path`.
    pub fn find(&self, method: Method, path: &str) -> RouterResult<RouteMatch<'_>> {
        let path = normalize_path(path);
        let Some(routes) = self.table.routes(method) else {
            return Err(RouterError::route_not_found(method, path));
        };

        if let Some((_, key, record)) = routes.get_full(path.as_str()) {
            if !record.pattern.is_invalid() {
                tracing::debug!(route = %key, "Exact route match");
                return Ok(RouteMatch {
                    path: key,
                    record,
                    params: Arguments::new(),
                });
            }
        }

        let segments = segment_count(&path);
        for (key, record) in routes {
            if !record.pattern.accepts_segments(segments) {
                continue;
            }
            if let Some(params) = record.pattern.captures(&path) {
                tracing::debug!(route = %key, params = params.len(), "Pattern route match");
                return Ok(RouteMatch {
                    path: key,
                    record,
                    params,
                });
            }
        }

        Err(RouterError::route_not_found(method, path))
    }

    /// Dispatch one request.
    pub fn handle(&self, request: &Request, response: &mut Response) -> RouterResult<()> {
        let started = Instant::now();
        let span = tracing::info_span!("dispatch", method = %request.method(), path = %request.path());
        let _guard = span.enter();

        let result = self.dispatch(request, response);
        match &result {
            Ok(()) => tracing::debug!(status = response.status_code(), "Request dispatched"),
            Err(err) if err.is_not_found() => tracing::warn!(error = %err, "Route not resolved"),
            Err(err) => tracing::debug!(error = %err, "Dispatch failed"),
        }
        metrics::record_dispatch(request.method(), outcome(&result), started.elapsed());
        result
    }

    fn dispatch(&self, request: &Request, response: &mut Response) -> RouterResult<()> {
        let matched = self.find(request.method(), request.path())?;
        let record = matched.record;

        for middleware in &record.middleware {
            self.run_middleware(middleware, &matched.params, request, response)?;
        }

        let target = self.resolve_target(record, request.path())?;
        let mut args = CallArgs::new(request, response);
        for param in target.signature(&self.container).params() {
            let bound = if param.hint.is(REQUEST_TYPE) {
                Bound::Request
            } else if param.hint.is(RESPONSE_TYPE) {
                Bound::Response
            } else if let Some(value) = matched.params.get(&param.name) {
                Bound::Value(value.clone())
            } else if let Some(value) = record.presets.get(&param.name) {
                Bound::Value(value.clone())
            } else {
                Bound::Value(Value::Null)
            };
            args.bind(param.name.clone(), bound);
        }

        target.invoke(&mut args)
    }

    fn run_middleware(
        &self,
        middleware: &MiddlewareRef,
        params: &Arguments,
        request: &Request,
        response: &mut Response,
    ) -> RouterResult<()> {
        let not_found = || {
            RouterError::callback_not_found(format!(
                "Middleware method {} not found",
                middleware.name()
            ))
        };

        let target = match middleware {
            MiddlewareRef::Closure(callable) => Target::Callable(callable),
            MiddlewareRef::Function { name, .. } => {
                Target::Callable(self.container.function(name).ok_or_else(not_found)?)
            }
            MiddlewareRef::Method {
                type_name, method, ..
            } => {
                let descriptor = self
                    .container
                    .type_descriptor(type_name)
                    .and_then(|t| t.method_descriptor(method))
                    .ok_or_else(not_found)?;
                let instance = self
                    .container
                    .instantiate(type_name, &Arguments::new())
                    .map_err(RouterError::Application)?
                    .ok_or_else(not_found)?;
                Target::Method {
                    type_name: type_name.as_str(),
                    name: method.as_str(),
                    instance,
                    method: descriptor,
                }
            }
        };

        let explicit = middleware.args();
        let mut args = CallArgs::new(request, response);
        for (index, param) in target.signature(&self.container).params().iter().enumerate() {
            let bound = if param.hint.is(REQUEST_TYPE) {
                Bound::Request
            } else if param.hint.is(RESPONSE_TYPE) {
                Bound::Response
            } else if let Some(value) = explicit.get(index) {
                Bound::Value(value.clone())
            } else if let Some(value) = params.get(&param.name) {
                Bound::Value(value.clone())
            } else {
                Bound::Value(Value::Null)
            };
            args.bind(param.name.clone(), bound);
        }

        tracing::debug!(middleware = %middleware.name(), "Running middleware");
        target.invoke(&mut args)
    }

    fn resolve_target<'a>(&'a self, record: &'a RouteRecord, path: &str) -> RouterResult<Target<'a>> {
        let unable = || {
            RouterError::callback_not_found(format!("Unable to execute callback for {path}"))
        };

        match &record.handler {
            HandlerRef::Missing => Err(RouterError::callback_not_found(format!(
                "No callback specified for {path}"
            ))),
            HandlerRef::Closure(callable) => Ok(Target::Callable(callable)),
            HandlerRef::Named(name) if self.container.has_type(name) => {
                self.construct(name, DEFAULT_METHOD, None).ok_or_else(unable)?
            }
            HandlerRef::Named(name) => self
                .container
                .function(name)
                .map(Target::Callable)
                .ok_or_else(unable),
            HandlerRef::Invokable { type_name, presets } => self
                .construct(type_name, INVOKE_METHOD, Some(presets))
                .ok_or_else(unable)?,
            HandlerRef::Method {
                type_name,
                method,
                presets,
            } => {
                let presets = if presets.is_empty() {
                    &record.presets
                } else {
                    presets
                };
                let presets = (!presets.is_empty()).then_some(presets);
                self.construct(type_name, method, presets).ok_or_else(unable)?
            }
        }
    }

    /// Construct `type_name` and select `method`.
    ///
    /// `None` when the type or method cannot be found or the type is not
    /// instantiable. With presets the constructor goes through dependency
    /// resolution, otherwise it receives no arguments.
    fn construct<'a>(
        &'a self,
        type_name: &'a str,
        method: &'a str,
        presets: Option<&Arguments>,
    ) -> Option<RouterResult<Target<'a>>> {
        let descriptor = self
            .container
            .type_descriptor(type_name)?
            .method_descriptor(method)?;

        let built = match presets {
            Some(presets) => {
                DependencyResolver::new(&self.container).build(type_name, presets.clone())
            }
            None => self
                .container
                .instantiate(type_name, &Arguments::new())
                .map_err(RouterError::Application),
        };

        match built {
            Ok(Some(instance)) => Some(Ok(Target::Method {
                type_name,
                name: method,
                instance,
                method: descriptor,
            })),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

fn outcome(result: &RouterResult<()>) -> &'static str {
    match result {
        Ok(()) => "ok",
        Err(RouterError::RouteNotFound { .. }) => "route_not_found",
        Err(RouterError::CallbackNotFound { .. }) => "callback_not_found",
        Err(RouterError::CyclicDependency { .. }) => "cyclic_dependency",
        Err(RouterError::Application(_)) => "error",
    }
}
