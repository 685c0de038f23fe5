use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failures talking to the Spotify accounts service or Web API.
#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The token endpoint answered with anything but 200.
    #[error("token endpoint rejected the request with {status}")]
    TokenRejected {
        status: StatusCode,
        body: Option<Value>,
    },
    /// The Web API refused the bearer token (401) or the request (400).
    #[error("upstream rejected the access token with {0}")]
    Unauthorized(StatusCode),
    #[error("upstream responded with {0}")]
    Upstream(StatusCode),
    #[error("failed to decode upstream response: {0}")]
    Decode(String),
    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),
}
