#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, Response};
use axum::Router;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use mockito::{Mock, ServerGuard};
use serde_json::Value;
use spotify_relay::config::{extract_config, ConfigV1};
use spotify_relay::routes::create_router;
use spotify_relay::state::AppState;
use tower::ServiceExt;

pub const STATE_COOKIE: &str = "spotify_auth_state";
pub const ACCESS_COOKIE: &str = "spotify-ac-key";
pub const SESSION_COOKIE: &str = "spotify-relay-session";

/// Config pointing both upstream services at the given mock server.
pub fn test_config(server_url: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
bind_address: 127.0.0.1:0
logging:
  level: "debug"
  format: "json"
spotify:
  client_id: "client"
  client_secret: "secret"
  accounts_url: "{url}"
  api_url: "{url}/v1"
  scope: "user-read-private playlist-read-private"
flows:
  redirect_uri: "http://localhost:8888/callback/"
  app_redirect_uri: "http://localhost:1234/token"
cors:
  allowed_origins:
    - "http://localhost:1234"
upstream:
  timeout_in_ms: 3000
"#,
        url = server_url
    );

    extract_config(&Figment::new().merge(Yaml::string(&yaml)))
        .expect("Failed to parse test config YAML")
}

pub fn build_app(config: ConfigV1) -> Router {
    let state = AppState::new(Arc::new(config)).expect("failed to build state");
    create_router(state)
}

pub fn get(path: &str, cookies: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(path);
    if let Some(cookies) = cookies {
        builder = builder.header(header::COOKIE, cookies);
    }
    builder.body(Body::empty()).expect("failed to build request")
}

/// Raw `Set-Cookie` values of a response.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

pub fn cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies(response).into_iter().find_map(|c| {
        c.strip_prefix(&prefix)
            .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
    })
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("Location header missing")
        .to_str()
        .expect("Location header not valid UTF-8")
        .to_string()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body is not JSON")
}

/// Mocks a successful code exchange and profile lookup.
pub async fn mock_login(
    server: &mut ServerGuard,
    access_token: &str,
    refresh_token: &str,
    user_id: &str,
) -> (Mock, Mock) {
    let token = server
        .mock("POST", "/api/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "access_token": access_token,
                "refresh_token": refresh_token,
                "token_type": "Bearer",
                "expires_in": 3600
            })
            .to_string(),
        )
        .create_async()
        .await;
    let me = server
        .mock("GET", "/v1/me")
        .match_header("authorization", format!("Bearer {}", access_token).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "id": user_id, "display_name": user_id }).to_string())
        .create_async()
        .await;
    (token, me)
}

/// Runs the application callback and returns the session cookie value.
pub async fn app_login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(get(
            "/appCallback?code=the-code&state=s1",
            Some(&format!("{}=s1", STATE_COOKIE)),
        ))
        .await
        .expect("request should complete");
    assert_eq!(response.status(), 200);
    cookie_value(&response, SESSION_COOKIE).expect("session cookie missing")
}

pub fn session_header(session_id: &str) -> String {
    format!("{}={}", SESSION_COOKIE, session_id)
}
