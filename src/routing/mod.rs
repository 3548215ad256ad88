//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     Routes (prefix, middleware, drafts)
//!     → builder.rs save() (inherit context, move presets)
//!     → pattern.rs (compile template: static | parametric | invalid)
//!     → table.rs (per-method, insertion-ordered records)
//!
//! Dispatch (per request):
//!     Request (method, path)
//!     → dispatcher.rs find() (exact lookup, then pattern scan)
//!     → middleware chain
//!     → handler target + argument binding
//!     → Response
//! ```
//!
//! # Design Decisions
//! - Tables are immutable once handed to the [`Router`]
//! - First matching pattern wins; there is no specificity ranking
//! - Malformed templates are kept but never match

pub mod builder;
pub mod dispatcher;
pub mod handler;
pub mod pattern;
pub mod table;

pub use builder::{Draft, RegistrationSession, Routes};
pub use dispatcher::{RouteMatch, Router};
pub use handler::{HandlerRef, MiddlewareRef};
pub use pattern::{CompiledPattern, ParamSpec, ParamType};
pub use table::{RouteRecord, RouteTable};
