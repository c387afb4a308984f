//! Helpers shared by the controller tests: build the full application against a
//! mock TikTok server and carry the session cookie between requests.

use crate::session_store::ExpiringMemoryStore;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use clap::Parser;
use serde_json::Value;
use service::config::Config;
use service::AppState;
use tower::ServiceExt;

pub(crate) const TEST_REDIRECT_URI: &str = "https://relay.example/auth/tiktok/callback";

pub(crate) fn test_config(api_base_url: &str, verification_file: &str) -> Config {
    Config::parse_from([
        "tiktok_relay",
        "--tt-client-key",
        "client_key_123",
        "--tt-client-secret",
        "client_secret_456",
        "--redirect-uri",
        TEST_REDIRECT_URI,
        "--tiktok-api-base-url",
        api_base_url,
        "--verification-file",
        verification_file,
        "--session-secret-key",
        "test-session-secret",
    ])
}

pub(crate) fn test_app(api_base_url: &str) -> Router {
    crate::app(
        AppState::new(test_config(
            api_base_url,
            "does-not-exist-verification.txt",
        )),
        ExpiringMemoryStore::default(),
    )
}

pub(crate) async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub(crate) fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub(crate) async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub(crate) async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub(crate) fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|h| h.to_str().ok())
        .expect("Should have a Location header")
        .to_string()
}

/// The `name=value` pair of the session cookie set by a response.
pub(crate) fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find(|h| h.starts_with(crate::SESSION_COOKIE_NAME))
        .and_then(|h| h.split(';').next())
        .map(str::to_string)
}

/// Start a login and return the session cookie and the state sent to TikTok.
pub(crate) async fn login(app: &Router) -> (String, String) {
    let response = send(app, get("/login/tiktok", None)).await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let cookie = session_cookie(&response).expect("Login should set the session cookie");
    let url = url::Url::parse(&location(&response)).unwrap();
    let state = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .expect("Authorization URL should carry a state");

    (cookie, state)
}

/// Log in and complete the callback, returning the session cookie that now
/// carries the access token.
pub(crate) async fn signed_in_cookie(app: &Router) -> String {
    let (cookie, state) = login(app).await;
    let response = send(
        app,
        get(
            &format!("/auth/tiktok/callback?code=c&state={state}"),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);

    session_cookie(&response).expect("Callback should rotate the session cookie")
}
