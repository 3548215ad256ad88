//! Front controller tests against the sample application.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use front_router::config::RouterConfig;
use front_router::demo;
use front_router::http::{build_app, X_REQUEST_ID};
use front_router::routing::Router;

fn app() -> axum::Router {
    app_with(RouterConfig::default())
}

fn app_with(config: RouterConfig) -> axum::Router {
    let router = Router::new(demo::routes(), demo::container());
    build_app(Arc::new(router), &config)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, headers, body)
}

#[tokio::test]
async fn test_root_route() {
    let (status, headers, body) = send(app(), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Hello World"}));
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert!(headers.contains_key(X_REQUEST_ID));
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let request = Request::builder()
        .uri("/")
        .header(X_REQUEST_ID, "req-42")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(app(), request).await;
    assert_eq!(headers[X_REQUEST_ID], "req-42");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (status, headers, body) = send(app(), get("/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": {"message": "Route /nope not found"}}));
    assert!(headers.contains_key(X_REQUEST_ID));
}

#[tokio::test]
async fn test_unsupported_method_is_404() {
    let request = Request::builder()
        .method("TRACE")
        .uri("/")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Route / not found");
}

#[tokio::test]
async fn test_status_and_headers_are_forwarded() {
    let (status, headers, body) = send(app(), get("/headers")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers["foo"], "bar");
    assert_eq!(headers["best"], "test");
    assert_eq!(headers["x-auth"], "Token {token-123}");
    assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
    assert_eq!(body, json!({"message": "hello"}));
}

#[tokio::test]
async fn test_typed_route_parameters() {
    let (status, _, body) = send(app(), get("/test/5-bob/2.5/true")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"userID": 5, "username": "bob", "amount": 2.5, "valid": true})
    );

    let request = Request::builder()
        .method("PUT")
        .uri("/test/7-eve/1/0")
        .body(Body::empty())
        .unwrap();
    let (_, _, body) = send(app(), request).await;
    assert_eq!(
        body,
        json!({"userID": 7, "username": "eve", "amount": 1.0, "valid": false})
    );
}

#[tokio::test]
async fn test_optional_page_parameter() {
    let (_, _, body) = send(app(), get("/profile/alice")).await;
    assert_eq!(body, json!({"name": "alice", "page": 1}));

    let (_, _, body) = send(app(), get("/profile/alice/4")).await;
    assert_eq!(body, json!({"name": "alice", "page": 4}));
}

#[tokio::test]
async fn test_controller_behind_token_middleware() {
    let (status, _, body) = send(app(), get("/user")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Hello from controller::get_users"}));

    let request = Request::builder()
        .uri("/user")
        .header(header::AUTHORIZATION, "Bearer invalid")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": {"message": "Invalid token"}}));
}

#[tokio::test]
async fn test_middleware_arguments() {
    let (status, headers, body) = send(app(), get("/testing")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-allowed-roles"], "admin,user");
    assert_eq!(headers["x-roles"], "Admin,Moderator,User,Bot");
    assert_eq!(body, json!({"msg": "testing"}));
}

#[tokio::test]
async fn test_dependency_injected_handlers() {
    let (_, _, body) = send(app(), get("/demo")).await;
    assert_eq!(body, json!({"message": "Test method from the injected class called"}));

    let (_, _, body) = send(app(), get("/inject")).await;
    assert_eq!(
        body,
        json!({"message": "Hello", "injected": "Test method from the injected class called"})
    );

    let (_, _, body) = send(app(), get("/nested")).await;
    assert_eq!(body, json!({"flag": true, "same_c": true}));
}

#[tokio::test]
async fn test_named_controller_and_appended_routes() {
    let (_, headers, body) = send(app(), get("/home")).await;
    assert_eq!(body, json!("Hello from controller"));
    assert_eq!(headers[header::CONTENT_TYPE], "text/plain; charset=utf-8");

    let (_, _, body) = send(app(), get("/sample/sample2")).await;
    assert_eq!(body, json!({"message": "Hello from sample2"}));
}

#[tokio::test]
async fn test_route_export() {
    let (status, _, body) = send(app(), get("/routes")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["GET"]["/home"]["callback"], "HomeController");
    assert_eq!(body["GET"]["/user"]["middlewares"], json!(["verify_token"]));
    assert_eq!(body["GET"]["/profile/{name}/{int:page?}"]["arguments"], json!(["string:name", "int:page?"]));

    let mut config = RouterConfig::default();
    config.routing.expose_routes = false;
    let (status, _, _) = send(app_with(config), get("/routes")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
