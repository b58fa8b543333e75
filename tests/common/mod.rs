//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceExt;

use site_edge::config::env::{ADMIN_PASSWORD, ADMIN_USERNAME, CDN_URL, JWT_SECRET};
use site_edge::config::{EdgeConfig, EnvConfig};
use site_edge::EdgeServer;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "correct horse battery staple";
pub const SECRET: &str = "integration-test-signing-secret";
pub const CDN: &str = "https://cdn.example.com";

/// Environment with admin credentials and a signing secret.
pub fn test_env(cdn: Option<&str>) -> EnvConfig {
    let mut vars: HashMap<&str, String> = HashMap::new();
    vars.insert(ADMIN_USERNAME, USERNAME.to_string());
    vars.insert(ADMIN_PASSWORD, PASSWORD.to_string());
    vars.insert(JWT_SECRET, SECRET.to_string());
    if let Some(cdn) = cdn {
        vars.insert(CDN_URL, cdn.to_string());
    }
    EnvConfig::from_lookup(move |key| vars.get(key).cloned())
}

pub fn test_server(config: EdgeConfig, env: EnvConfig) -> EdgeServer {
    EdgeServer::new(config, env).unwrap()
}

pub fn test_router() -> Router {
    test_server(EdgeConfig::default(), test_env(None)).router()
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(path: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(path: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_with_cookie(path: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// All `Set-Cookie` values on a response.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// Log in and return a `Cookie` header value carrying the session.
pub async fn login_cookie(router: &Router) -> String {
    let response = send(
        router,
        post_json(
            "/api/admin/login",
            serde_json::json!({ "username": USERNAME, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(response.status(), 200);

    let set_cookie = set_cookies(&response)
        .into_iter()
        .find(|c| c.starts_with("admin-auth-token="))
        .expect("login sets the session cookie");
    set_cookie.split(';').next().unwrap().to_string()
}

/// Start an origin that echoes the path and the `Cache-Control` it received.
pub async fn start_echo_origin() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().fallback(|request: Request<Body>| async move {
        let cache_control = request
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        axum::Json(serde_json::json!({
            "path": request.uri().path(),
            "query": request.uri().query(),
            "cache_control": cache_control,
        }))
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}
