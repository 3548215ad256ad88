//! HTTP front controller.
//!
//! # Responsibilities
//! - Create the Axum router that sends every request to one handler
//! - Wire up middleware (tracing, timeout)
//! - Convert between Axum requests/responses and the router's [`Request`]/[`Response`]
//! - Map dispatch errors to JSON error responses
//! - Assign a request ID to every response
//! - Serve the route table export when enabled
//!
//! # Design Decisions
//! - Dispatch is synchronous; it runs on the blocking pool so a slow
//!   handler never stalls the async workers
//! - Route resolution failures are `404`, everything else `500`
//! - An incoming `x-request-id` is kept, otherwise a UUID v4 is generated

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response as AxumResponse},
    routing::any,
    Json,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::http::{Method, Request, Response, ResponseBody};
use crate::lifecycle::shutdown_signal;
use crate::routing::Router;

/// Request ID header.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Application state injected into the front controller.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router>,
    pub expose_routes: bool,
}

/// HTTP server hosting one [`Router`].
pub struct HttpServer {
    app: axum::Router,
}

impl HttpServer {
    /// Create a new HTTP server for the given router.
    pub fn new(router: Arc<Router>, config: &RouterConfig) -> Self {
        Self {
            app: build_app(router, config),
        }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_app(router: Arc<Router>, config: &RouterConfig) -> axum::Router {
    let state = AppState {
        router,
        expose_routes: config.routing.expose_routes,
    };

    axum::Router::new()
        .route("/{*path}", any(front_controller))
        .route("/", any(front_controller))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(TraceLayer::new_for_http())
}

/// Single entry point for every request.
async fn front_controller(
    State(state): State<AppState>,
    request: axum::extract::Request,
) -> AxumResponse {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut response = handle_request(state, request, &request_id).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}

async fn handle_request(
    state: AppState,
    request: axum::extract::Request,
    request_id: &str,
) -> AxumResponse {
    let (parts, body) = request.into_parts();
    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let Ok(method) = parts.method.as_str().parse::<Method>() else {
        tracing::warn!(request_id = %request_id, method = %parts.method, "Unsupported method");
        let path = crate::http::normalize_path(&target);
        return error_response(StatusCode::NOT_FOUND, format!("Route {path} not found"));
    };

    if state.expose_routes && method == Method::Get && parts.uri.path() == "/routes" {
        return Json(state.router.table().to_json()).into_response();
    }

    let body: Bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(request_id = %request_id, error = %err, "Failed to read request body");
            return error_response(StatusCode::BAD_REQUEST, "Unable to read request body");
        }
    };

    let mut req = Request::new(method, &target);
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            req.insert_header(name.as_str(), value);
        }
    }
    req.insert_header(X_REQUEST_ID, request_id);
    let content_type = req.headers(header::CONTENT_TYPE.as_str()).map(str::to_string);
    req.merge_body(&body, content_type.as_deref());

    tracing::debug!(request_id = %request_id, method = %method, path = %req.path(), "Dispatching request");

    let router = Arc::clone(&state.router);
    let joined = tokio::task::spawn_blocking(move || {
        let mut res = Response::new();
        let outcome = router.handle(&req, &mut res);
        (res, outcome)
    })
    .await;

    match joined {
        Ok((res, Ok(()))) => into_axum(res),
        Ok((_, Err(err))) => dispatch_error(request_id, err),
        Err(err) => {
            tracing::error!(request_id = %request_id, error = %err, "Dispatch task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

fn dispatch_error(request_id: &str, err: RouterError) -> AxumResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if err.is_not_found() {
        tracing::info!(request_id = %request_id, error = %err, "Not found");
    } else {
        tracing::error!(request_id = %request_id, error = %err, "Request failed");
    }
    error_response(status, err.to_string())
}

fn error_response(status: StatusCode, message: impl Into<String>) -> AxumResponse {
    let body = json!({ "error": { "message": message.into() } });
    (status, Json(body)).into_response()
}

/// Convert the dispatcher's response into an Axum response.
fn into_axum(res: Response) -> AxumResponse {
    let status = StatusCode::from_u16(res.status_code()).unwrap_or(StatusCode::OK);
    let content_type = res.content_type();

    let body = match res.body() {
        ResponseBody::Empty => Body::empty(),
        _ => Body::from(res.body_text()),
    };
    let mut response = AxumResponse::new(body);
    *response.status_mut() = status;

    let headers = response.headers_mut();
    if let Some(content_type) = content_type {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    for (key, value) in res.header_pairs() {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!(header = %key, "Dropping invalid response header"),
        }
    }
    response
}
