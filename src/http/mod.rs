//! HTTP collaborators of the router.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, body decoding)
//!     → request.rs (method, normalized path, keyed values, headers)
//!     → [routing::Router::handle]
//!     → response.rs (status, headers, body)
//!     → server.rs (convert back, map errors)
//!     → Send to client
//! ```

pub mod method;
pub mod request;
pub mod response;
pub mod server;

pub use method::{Method, UnknownMethod};
pub use request::{normalize_path, Request};
pub use response::{Response, ResponseBody};
pub use server::{build_app, HttpServer, X_REQUEST_ID};
