//! Error vocabulary of the dispatch core.
//!
//! Only route resolution failures and dependency cycles are the router's own
//! errors. Anything raised by a handler, a middleware or a constructor is
//! carried through untouched in [`RouterError::Application`].

use thiserror::Error;

use crate::http::Method;

/// Boxed application error raised by handlers, middleware and constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by [`Router::handle`](crate::routing::Router::handle).
#[derive(Debug, Error)]
pub enum RouterError {
    /// No exact or pattern route matches the request, or the method has no routes at all.
    #[error("Route {path} not found")]
    RouteNotFound { method: Method, path: String },

    /// A matched route has no invocable handler, or a middleware is not invocable.
    #[error("{message}")]
    CallbackNotFound { message: String },

    /// A constructor dependency chain revisits a type that is still being resolved.
    #[error("Cyclic dependency detected: {}", path.join(" -> "))]
    CyclicDependency { path: Vec<String> },

    /// Error raised by application code; never translated.
    #[error(transparent)]
    Application(BoxError),
}

impl RouterError {
    pub(crate) fn route_not_found(method: Method, path: impl Into<String>) -> Self {
        Self::RouteNotFound {
            method,
            path: path.into(),
        }
    }

    pub(crate) fn callback_not_found(message: impl Into<String>) -> Self {
        Self::CallbackNotFound {
            message: message.into(),
        }
    }

    /// HTTP status hint for the host layer.
    pub fn status_code(&self) -> u16 {
        match self {
            RouterError::RouteNotFound { .. } | RouterError::CallbackNotFound { .. } => 404,
            RouterError::CyclicDependency { .. } | RouterError::Application(_) => 500,
        }
    }

    /// Returns true for the two route-resolution failures.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == 404
    }

    /// Unwrap an application error, if this is one.
    pub fn into_application(self) -> Option<BoxError> {
        match self {
            RouterError::Application(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for dispatch operations.
pub type RouterResult<T> = Result<T, RouterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RouterError::route_not_found(Method::Get, "/missing");
        assert_eq!(err.to_string(), "Route /missing not found");
        assert_eq!(err.status_code(), 404);

        let err = RouterError::CyclicDependency {
            path: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "Cyclic dependency detected: A -> B -> A");
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_application_error_is_transparent() {
        let inner: BoxError = "token expired".into();
        let err = RouterError::Application(inner);
        assert_eq!(err.to_string(), "token expired");
        assert!(!err.is_not_found());
        assert_eq!(err.into_application().unwrap().to_string(), "token expired");
    }
}
