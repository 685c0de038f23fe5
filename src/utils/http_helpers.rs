use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::spotify::SpotifyError;

/// A general purpose HTTP error type that can be converted into an `IntoResponse`.
#[derive(Debug)]
pub struct HTTPError {
    status: StatusCode,
    message: String,
    /// Upstream error document forwarded as-is instead of `{"error": message}`.
    body: Option<Value>,
}

impl HTTPError {
    /// Creates a new HTTP error with the given status code and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        HTTPError {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Creates an error whose response body is the given JSON document.
    pub fn passthrough(status: StatusCode, body: Value) -> Self {
        let message = body.to_string();
        HTTPError {
            status,
            message,
            body: Some(body),
        }
    }

    pub fn unauthorized() -> Self {
        HTTPError::new(StatusCode::UNAUTHORIZED, "Unauthorized access")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Converts our `HTTPError` into an HTTP response.
impl IntoResponse for HTTPError {
    fn into_response(self) -> Response {
        let body = self.body.unwrap_or_else(|| json!({ "error": self.message }));
        (self.status, Json(body)).into_response()
    }
}

/// Maps session store errors to an opaque 500.
pub fn map_store_error(e: String) -> HTTPError {
    error!("Session store error: {}", e);
    HTTPError::new(StatusCode::INTERNAL_SERVER_ERROR, "session store unavailable")
}

/// Maps upstream failures onto the coarse statuses the relay exposes.
impl From<SpotifyError> for HTTPError {
    fn from(err: SpotifyError) -> Self {
        match err {
            SpotifyError::TokenRejected { body, .. } => match body {
                Some(body) => HTTPError::passthrough(StatusCode::BAD_REQUEST, body),
                None => HTTPError::new(StatusCode::BAD_REQUEST, "token request rejected"),
            },
            SpotifyError::Unauthorized(_) => HTTPError::unauthorized(),
            SpotifyError::Upstream(status) => {
                warn!("Upstream call failed with status {}", status);
                HTTPError::new(
                    StatusCode::BAD_GATEWAY,
                    format!("upstream responded with {}", status.as_u16()),
                )
            }
            SpotifyError::Transport(e) => {
                warn!("Upstream call could not be completed: {}", e);
                HTTPError::new(StatusCode::BAD_GATEWAY, "upstream unreachable")
            }
            SpotifyError::Decode(e) => {
                warn!("Upstream response could not be decoded: {}", e);
                HTTPError::new(StatusCode::BAD_GATEWAY, "unexpected upstream response")
            }
            SpotifyError::InvalidUrl(e) => {
                error!("Invalid upstream url: {}", e);
                HTTPError::new(StatusCode::INTERNAL_SERVER_ERROR, "invalid upstream url")
            }
        }
    }
}
