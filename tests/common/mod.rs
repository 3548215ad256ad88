//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;

use front_router::error::RouterResult;
use front_router::http::{Method, Request, Response};
use front_router::inject::{Callable, CallArgs, Container, Signature, TypeDescriptor, Value};
use front_router::routing::{HandlerRef, Router};
use front_router::BoxError;

#[derive(Debug, Default, PartialEq)]
pub struct Clock {
    pub offset: i64,
}

#[derive(Debug)]
pub struct Store {
    pub clock: Arc<Clock>,
}

#[derive(Debug)]
pub struct Service {
    pub store: Arc<Store>,
    pub clock: Arc<Clock>,
    pub verbose: bool,
}

#[derive(Debug)]
pub struct Left;

#[derive(Debug)]
pub struct Right;

#[derive(Debug, Default)]
pub struct UserController;

/// Run one request through the router.
pub fn run(router: &Router, method: Method, target: &str) -> RouterResult<Response> {
    run_request(router, &Request::new(method, target))
}

pub fn run_request(router: &Router, request: &Request) -> RouterResult<Response> {
    let mut response = Response::new();
    router.handle(request, &mut response)?;
    Ok(response)
}

/// Handler that writes the value bound to `name` as text.
pub fn echo(name: &'static str) -> HandlerRef {
    HandlerRef::closure(Signature::new().response("res").untyped(name), move |args| {
        let text = describe(args.get(name));
        if let Some(res) = args.response() {
            res.write(text);
        }
        Ok(())
    })
}

/// Handler that writes a fixed text.
pub fn text(body: &'static str) -> HandlerRef {
    HandlerRef::closure(Signature::new().response("res"), move |args| {
        if let Some(res) = args.response() {
            res.write(body);
        }
        Ok(())
    })
}

pub fn describe(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "null".to_string(),
        Some(Value::Str(s)) => format!("string:{s}"),
        Some(Value::Int(i)) => format!("int:{i}"),
        Some(Value::Float(f)) => format!("float:{f}"),
        Some(Value::Bool(b)) => format!("bool:{b}"),
        Some(other) => other.kind().to_string(),
    }
}

/// Middleware that appends its label to the `X-Trace` header.
fn trace(args: &mut CallArgs<'_>) -> Result<(), BoxError> {
    let label = args.str("label").unwrap_or("?").to_string();
    if let Some(res) = args.response() {
        let trace = match res.header_value("X-Trace") {
            Some(prev) => format!("{prev},{label}"),
            None => label,
        };
        res.header("X-Trace", trace);
    }
    Ok(())
}

/// Registry used by the dispatch tests.
pub fn container() -> Container {
    let mut container = Container::new();

    container
        .register_type(TypeDescriptor::new("Clock").default_constructor::<Clock>())
        .register_type(TypeDescriptor::new("Store").constructor(
            Signature::new().param("clock", "Clock"),
            |args| {
                Ok(Store {
                    clock: args.instance::<Clock>("clock").ok_or("Store requires clock")?,
                })
            },
        ))
        .register_type(
            TypeDescriptor::new("Service")
                .constructor(
                    Signature::new()
                        .param("store", "Store")
                        .param("clock", "Clock")
                        .param("verbose", "bool"),
                    |args| {
                        Ok(Service {
                            store: args.instance::<Store>("store").ok_or("Service requires store")?,
                            clock: args.instance::<Clock>("clock").ok_or("Service requires clock")?,
                            verbose: args.bool("verbose").unwrap_or(false),
                        })
                    },
                )
                .method::<Service, _>("invoke", Signature::new().response("res"), |this, args| {
                    if let Some(res) = args.response() {
                        res.send(&json!({
                            "verbose": this.verbose,
                            "offset": this.clock.offset,
                            "same_clock": this.store.clock == this.clock,
                        }))?;
                    }
                    Ok(())
                }),
        )
        .register_type(
            TypeDescriptor::new("Left")
                .constructor(Signature::new().param("right", "Right"), |_| Ok(Left))
                .method::<Left, _>("invoke", Signature::new(), |_, _| Ok(())),
        )
        .register_type(
            TypeDescriptor::new("Right")
                .constructor(Signature::new().param("left", "Left"), |_| Ok(Right)),
        )
        .register_type(
            TypeDescriptor::new("UserController")
                .default_constructor::<UserController>()
                .method::<UserController, _>("index", Signature::new().response("res"), |_, args| {
                    if let Some(res) = args.response() {
                        res.write("user index");
                    }
                    Ok(())
                })
                .method::<UserController, _>(
                    "show",
                    Signature::new().response("res").param("id", "int"),
                    |_, args| {
                        let id = describe(args.get("id"));
                        if let Some(res) = args.response() {
                            res.write(format!("user {id}"));
                        }
                        Ok(())
                    },
                ),
        );

    container
        .register_function(
            "trace",
            Callable::new(
                Signature::new().param("label", "string").response("res"),
                trace,
            ),
        )
        .register_function(
            "deny",
            Callable::new(Signature::new().request("req"), |args| {
                let user = args.request().and_then(|r| r.headers("x-user"));
                match user {
                    Some(_) => Ok(()),
                    None => Err("access denied".into()),
                }
            }),
        )
        .register_function(
            "hello",
            Callable::new(Signature::new().response("res"), |args| {
                if let Some(res) = args.response() {
                    res.write("hello function");
                }
                Ok(())
            }),
        );

    container
}
