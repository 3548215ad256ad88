//! Dependency injection subsystem.
//!
//! # Data Flow
//! ```text
//! route / middleware reference
//!     → container.rs (look up type, method or function descriptor)
//!     → signature.rs (declared parameters)
//!     → resolver.rs (complete constructor arguments, detect cycles)
//!     → container.rs (instantiate)
//!     → args.rs (bind request, response, path values, presets)
//! ```

pub mod args;
pub mod container;
pub mod resolver;
pub mod signature;
pub mod value;

pub use args::{Bound, CallArgs};
pub use container::{Callable, CallableRef, Container, MethodDescriptor, TypeDescriptor};
pub use resolver::DependencyResolver;
pub use signature::{Param, Signature, TypeHint, MIXED, REQUEST_TYPE, RESPONSE_TYPE, UNTYPED};
pub use value::{Arguments, Instance, Value};
