//! Sample application served by the `front-router` binary.
//!
//! Registers a home controller, controllers built through dependency
//! injection, a nested dependency graph, function and method middleware
//! with explicit arguments, typed dynamic routes, grouped chains and an
//! appended route table.

use std::sync::Arc;

use serde_json::{json, Value as JsonValue};
use thiserror::Error;

use crate::error::BoxError;
use crate::http::Method;
use crate::inject::{Arguments, CallArgs, Callable, Container, Signature, TypeDescriptor, Value};
use crate::routing::{HandlerRef, MiddlewareRef, Routes};

/// Errors raised by the sample middleware.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("Invalid token")]
    InvalidToken,
}

#[derive(Debug, Default)]
pub struct HomeController;

#[derive(Debug, Default)]
pub struct InjectedClass;

impl InjectedClass {
    pub fn test(&self) -> &'static str {
        "Test method from the injected class called"
    }
}

#[derive(Debug)]
pub struct InjectController {
    injected: Arc<InjectedClass>,
}

#[derive(Debug, Default)]
pub struct RoleMiddleware;

#[derive(Debug, Default, PartialEq)]
pub struct C;

#[derive(Debug)]
pub struct B {
    c: Arc<C>,
}

#[derive(Debug)]
pub struct A {
    b: Arc<B>,
    c: Arc<C>,
    flag: bool,
}

fn reply(args: &mut CallArgs<'_>, body: JsonValue) -> Result<(), BoxError> {
    if let Some(response) = args.response() {
        response.send(&body)?;
    }
    Ok(())
}

fn message(text: &'static str) -> HandlerRef {
    HandlerRef::closure(Signature::new().response("response"), move |args| {
        reply(args, json!({ "message": text }))
    })
}

fn noop() -> HandlerRef {
    HandlerRef::closure(Signature::new(), |_| Ok(()))
}

fn check_token(args: &CallArgs<'_>) -> Result<(), BoxError> {
    let token = args.request().and_then(|r| r.headers("authorization"));
    if token == Some("Bearer invalid") {
        return Err(DemoError::InvalidToken.into());
    }
    tracing::debug!(has_token = token.is_some(), "Token verified");
    Ok(())
}

fn user_action(
    name: &'static str,
) -> impl Fn(&HomeController, &mut CallArgs<'_>) -> Result<(), BoxError> + Send + Sync + 'static {
    move |_, args| reply(args, json!({ "message": format!("Hello from controller::{name}") }))
}

fn home_controller() -> TypeDescriptor {
    TypeDescriptor::new("HomeController")
        .default_constructor::<HomeController>()
        .method::<HomeController, _>("index", Signature::new().response("response"), |_, args| {
            if let Some(response) = args.response() {
                response.write("Hello from controller");
            }
            Ok(())
        })
        .method::<HomeController, _>(
            "get_users",
            Signature::new().response("response"),
            user_action("get_users"),
        )
        .method::<HomeController, _>(
            "add_user",
            Signature::new().response("response"),
            user_action("add_user"),
        )
        .method::<HomeController, _>(
            "update_user",
            Signature::new().response("response"),
            user_action("update_user"),
        )
        .method::<HomeController, _>(
            "replace_user",
            Signature::new().response("response"),
            user_action("replace_user"),
        )
        .method::<HomeController, _>(
            "delete_user",
            Signature::new().response("response"),
            user_action("delete_user"),
        )
        .method::<HomeController, _>(
            "test",
            Signature::new()
                .response("response")
                .param("userID", "int")
                .param("username", "string")
                .param("amount", "float")
                .param("valid", "bool"),
            |_, args| {
                let body = json!({
                    "userID": args.int("userID"),
                    "username": args.str("username"),
                    "amount": args.float("amount"),
                    "valid": args.bool("valid"),
                });
                reply(args, body)
            },
        )
        .method::<HomeController, _>(
            "dependency_injection_test",
            Signature::new()
                .response("response")
                .param("injected", "InjectedClass"),
            |_, args| {
                let text = args
                    .get("injected")
                    .and_then(|v| v.downcast_ref::<InjectedClass>())
                    .map(InjectedClass::test)
                    .unwrap_or("nothing injected");
                reply(args, json!({ "message": text }))
            },
        )
}

fn nested_types(container: &mut Container) {
    container
        .register_type(TypeDescriptor::new("C").default_constructor::<C>())
        .register_type(TypeDescriptor::new("B").constructor(
            Signature::new().param("c", "C"),
            |args| {
                Ok(B {
                    c: args.instance::<C>("c").ok_or("B requires c")?,
                })
            },
        ))
        .register_type(
            TypeDescriptor::new("A")
                .constructor(
                    Signature::new()
                        .param("b", "B")
                        .param("c", "C")
                        .param("flag", "bool"),
                    |args| {
                        Ok(A {
                            b: args.instance::<B>("b").ok_or("A requires b")?,
                            c: args.instance::<C>("c").ok_or("A requires c")?,
                            flag: args.bool("flag").unwrap_or(false),
                        })
                    },
                )
                .method::<A, _>("invoke", Signature::new().response("response"), |a, args| {
                    reply(
                        args,
                        json!({
                            "flag": a.flag,
                            "same_c": a.b.c == a.c,
                        }),
                    )
                }),
        );
}

/// Types and functions referenced by the sample routes.
pub fn container() -> Container {
    let mut container = Container::new();

    container
        .register_type(home_controller())
        .register_type(
            TypeDescriptor::new("InjectedClass")
                .default_constructor::<InjectedClass>()
                .method::<InjectedClass, _>(
                    "test",
                    Signature::new().response("response"),
                    |this, args| reply(args, json!({ "message": this.test() })),
                ),
        )
        .register_type(
            TypeDescriptor::new("InjectController")
                .constructor(
                    Signature::new().param("injected_class", "InjectedClass"),
                    |args| {
                        Ok(InjectController {
                            injected: args
                                .instance::<InjectedClass>("injected_class")
                                .ok_or("InjectController requires injected_class")?,
                        })
                    },
                )
                .method::<InjectController, _>(
                    "invoke",
                    Signature::new().response("response"),
                    |this, args| {
                        reply(args, json!({ "message": "Hello", "injected": this.injected.test() }))
                    },
                ),
        )
        .register_type(
            TypeDescriptor::new("Middleware")
                .default_constructor::<RoleMiddleware>()
                .method::<RoleMiddleware, _>(
                    "verify_token",
                    Signature::new().request("request"),
                    |_, args| check_token(args),
                )
                .method::<RoleMiddleware, _>("test", Signature::new().request("request"), |_, _| {
                    Ok(())
                })
                .method::<RoleMiddleware, _>(
                    "has_role",
                    Signature::new()
                        .param("admin_role", "string")
                        .param("user_role", "string")
                        .param("other_roles", "array")
                        .request("request")
                        .response("response"),
                    |_, args| {
                        let mut roles: Vec<String> = ["admin_role", "user_role"]
                            .iter()
                            .filter_map(|name| args.str(name).map(str::to_string))
                            .collect();
                        if let Some(others) = args.get("other_roles").and_then(Value::as_list) {
                            roles.extend(others.iter().filter_map(|v| v.as_str().map(str::to_string)));
                        }
                        if let Some(response) = args.response() {
                            response.header("X-Roles", roles.join(","));
                        }
                        Ok(())
                    },
                )
                .method::<RoleMiddleware, _>("test_method", Signature::new(), |_, _| {
                    tracing::debug!("RoleMiddleware test method");
                    Ok(())
                }),
        );
    nested_types(&mut container);

    container
        .register_function(
            "verify_token",
            Callable::new(Signature::new().request("request"), |args| check_token(args)),
        )
        .register_function(
            "decode_token",
            Callable::new(Signature::new().request("request"), |_| Ok(())),
        )
        .register_function(
            "has_roles",
            Callable::new(
                Signature::new()
                    .param("allowed_roles", "string")
                    .response("response"),
                |args| {
                    let allowed = args.str("allowed_roles").unwrap_or_default().to_string();
                    if let Some(response) = args.response() {
                        response.header("X-Allowed-Roles", allowed);
                    }
                    Ok(())
                },
            ),
        )
        .register_function("test_middleware", Callable::new(Signature::new(), |_| Ok(())));

    container
}

/// The sample route set.
pub fn routes() -> Routes {
    let mut routes = Routes::new();

    routes.add(
        "/",
        HandlerRef::closure(Signature::new().request("request").response("response"), |args| {
            reply(args, json!({ "message": "Hello World" }))
        }),
        &[Method::Get],
    );

    // grouped chain: save(false) keeps prefix and middleware, save(true) clears them
    routes
        .prefix("/test")
        .middleware(["decode_token"])
        .get("/t1", noop())
        .get("/t2", noop())
        .get("/t3", noop())
        .save(false)
        .prefix("/test2")
        .middleware(["verify_token"])
        .get("/t4", noop())
        .get("/t5", noop())
        .get("/t6", noop())
        .save(true)
        .prefix("/test3")
        .middleware(["verify_token"])
        .get("/t7", noop())
        .get("/t8", noop())
        .get("/t9", noop())
        .save(true);

    routes.add(
        "/test",
        HandlerRef::closure(Signature::new().response("response"), |args| {
            if let Some(response) = args.response() {
                response.status(200, "OK").send(&json!({ "message": "Welcome" }))?;
            }
            Ok(())
        }),
        &[Method::Get],
    );

    routes
        .prefix("/user")
        .middleware(["verify_token"])
        .route("/", "HomeController::get_users", &[Method::Get])
        .route("/", "HomeController::add_user", &[Method::Post])
        .route("/", "HomeController::update_user", &[Method::Patch])
        .route("/", "HomeController::replace_user", &[Method::Put])
        .add("/test", "HomeController::delete_user", &[Method::Delete]);

    routes.add("/test", noop(), &[Method::Patch, Method::Post]);

    routes
        .get("/test-get", message("Hello from test-get"))
        .post("/test-post", message("Hello from test-post"))
        .put("/test-put", message("Hello from test-put"))
        .patch("/test-patch", message("Hello from test-patch"))
        .delete("/test-delete", message("Hello from test-delete"))
        .save(true);

    routes.add(
        "/test/{int:userID}-{username}/{float:amount}/{bool:valid}",
        HandlerRef::closure(
            Signature::new()
                .request("request")
                .response("response")
                .param("userID", "int")
                .param("username", "string")
                .param("amount", "float")
                .param("valid", "bool"),
            |args| {
                let body = json!({
                    "userID": args.int("userID"),
                    "username": args.str("username"),
                    "amount": args.float("amount"),
                    "valid": args.bool("valid"),
                });
                reply(args, body)
            },
        ),
        &[Method::Get],
    );
    routes.add(
        "/test/{int:userID}-{username}/{float:amount}/{bool:valid}",
        "HomeController::test",
        &[Method::Put],
    );

    routes.add(
        "/profile/{name}/{int:page?}",
        HandlerRef::closure(
            Signature::new()
                .response("response")
                .param("name", "string")
                .param("page", "int"),
            |args| {
                let body = json!({ "name": args.str("name"), "page": args.int("page").unwrap_or(1) });
                reply(args, body)
            },
        ),
        &[Method::Get],
    );

    routes
        .middleware([
            MiddlewareRef::method("Middleware", "verify_token"),
            MiddlewareRef::method("Middleware", "test"),
            MiddlewareRef::function("verify_token"),
        ])
        .add("/test-hello", message("Hello"), &[Method::Get]);

    routes
        .middleware([
            MiddlewareRef::function("test_middleware"),
            MiddlewareRef::function("has_roles").with_args(["admin,user"]),
            MiddlewareRef::method("Middleware", "test_method"),
            MiddlewareRef::method("Middleware", "has_role").with_args([
                Value::from("Admin"),
                Value::from("Moderator"),
                Value::from(vec!["User", "Bot"]),
            ]),
        ])
        .add(
            "/testing",
            HandlerRef::closure(Signature::new().response("response"), |args| {
                reply(args, json!({ "msg": "testing" }))
            }),
            &[Method::Get],
        );

    routes.add(
        "/headers",
        HandlerRef::closure(Signature::new().response("response"), |args| {
            if let Some(response) = args.response() {
                response
                    .header("Content-type", "text/plain")
                    .headers([("foo", "bar"), ("best", "test")])
                    .header("X-Auth", "Token {token-123}")
                    .status(201, "Created")
                    .send(&json!({ "message": "hello" }))?;
            }
            Ok(())
        }),
        &[Method::Get],
    );

    routes.add(
        "/demo",
        HandlerRef::injected(
            "HomeController",
            "dependency_injection_test",
            Arguments::new().with("injected", Value::instance("InjectedClass", InjectedClass)),
        ),
        &[Method::Get],
    );
    routes.add("/inject", HandlerRef::invokable("InjectController", Arguments::new()), &[Method::Get]);
    routes.add(
        "/nested",
        HandlerRef::invokable("A", Arguments::new().with("flag", true)),
        &[Method::Get],
    );
    routes.add("/home", "HomeController", &[Method::Get]);

    // routes defined elsewhere and merged in; existing routes win on collision
    let mut other = Routes::new();
    other
        .prefix("/sample")
        .get("/", message("Hello from sample"))
        .get("/sample1", message("Hello from sample1"))
        .get("/sample2", message("Hello from sample2"))
        .save(true);
    routes.append(other);

    routes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_named_reference_resolves() {
        let container = container();
        let table = routes().finish();

        for (_, path, record) in table.iter() {
            match &record.handler {
                HandlerRef::Named(name) => assert!(
                    container.has_type(name) || container.function(name).is_some(),
                    "{path}: {name}"
                ),
                HandlerRef::Method { type_name, method, .. } => assert!(
                    container
                        .type_descriptor(type_name)
                        .and_then(|t| t.method_descriptor(method))
                        .is_some(),
                    "{path}: {type_name}::{method}"
                ),
                HandlerRef::Invokable { type_name, .. } => {
                    assert!(container.has_type(type_name), "{path}: {type_name}")
                }
                HandlerRef::Closure(_) => {}
                HandlerRef::Missing => panic!("{path} has no handler"),
            }
            for middleware in &record.middleware {
                match middleware {
                    MiddlewareRef::Function { name, .. } => {
                        assert!(container.function(name).is_some(), "{path}: {name}")
                    }
                    MiddlewareRef::Method { type_name, method, .. } => assert!(
                        container
                            .type_descriptor(type_name)
                            .and_then(|t| t.method_descriptor(method))
                            .is_some(),
                        "{path}: {type_name}::{method}"
                    ),
                    MiddlewareRef::Closure(_) => {}
                }
            }
        }
    }

    #[test]
    fn test_grouped_chain_context() {
        let table = routes().finish();
        let names = |path: &str| -> Vec<String> {
            table
                .lookup(Method::Get, path)
                .map(|r| r.middleware.iter().map(MiddlewareRef::name).collect())
                .unwrap_or_default()
        };

        assert_eq!(names("/test/t1"), vec!["decode_token"]);
        assert_eq!(names("/test/test2/t4"), vec!["decode_token", "verify_token"]);
        assert_eq!(names("/test3/t7"), vec!["verify_token"]);
        assert!(names("/test").is_empty());
    }
}
