//! In-process HTTP request router with middleware and dependency injection.
//!
//! # Architecture Overview
//!
//! ```text
//!   Registration (startup)                      Dispatch (per request)
//!   ──────────────────────                      ──────────────────────
//!   Routes::prefix / middleware                 Request (method, path, values, headers)
//!        │                                              │
//!        ▼                                              ▼
//!   Routes::route / get / post ...  ──drafts──▶  Router::find
//!        │                                        exact lookup → pattern scan
//!        ▼                                              │
//!   Routes::save ──▶ RouteTable ──Router::new──▶  middleware chain
//!                      ▲                                │
//!   Routes::append ────┘                                ▼
//!                                                 handler target
//!   Container (types, functions) ──────────────▶  DependencyResolver
//!                                                       │
//!                                                       ▼
//!                                                 argument binding → invoke → Response
//! ```
//!
//! # Example
//!
//! ```
//! use front_router::http::{Method, Request, Response};
//! use front_router::inject::{Container, Signature};
//! use front_router::routing::{HandlerRef, Router, Routes};
//!
//! let mut routes = Routes::new();
//! routes.add(
//!     "/user/{int:id}",
//!     HandlerRef::closure(Signature::new().response("res").param("id", "int"), |args| {
//!         let id = args.int("id").unwrap_or_default();
//!         if let Some(res) = args.response() {
//!             res.send(&serde_json::json!({ "id": id }))?;
//!         }
//!         Ok(())
//!     }),
//!     &[Method::Get],
//! );
//!
//! let router = Router::new(routes, Container::new());
//! let mut response = Response::new();
//! router.handle(&Request::new(Method::Get, "/user/42"), &mut response).unwrap();
//! assert_eq!(response.body_text(), r#"{"id":42}"#);
//! ```

// Core subsystems
pub mod error;
pub mod http;
pub mod inject;
pub mod routing;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

// Sample application
pub mod demo;

pub use config::RouterConfig;
pub use error::{BoxError, RouterError, RouterResult};
pub use http::{HttpServer, Method, Request, Response};
pub use inject::Container;
pub use routing::{HandlerRef, MiddlewareRef, Router, Routes};
