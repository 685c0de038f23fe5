use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use tracing::{debug, error};

use super::cookies::session_id;
use super::session::SessionStatus;
use crate::state::AppState;
use crate::utils::http_helpers::{map_store_error, HTTPError};

/// A session whose user is known and whose access token is usable.
///
/// Handlers taking this extractor answer 401 before doing anything else when
/// the caller has no such session.
#[derive(Debug, Clone)]
pub struct ReadySession {
    pub id: String,
    pub access_token: String,
    pub user_id: String,
}

/// Extractor implementation: resolves the session cookie against the store.
#[async_trait]
impl FromRequestParts<AppState> for ReadySession {
    type Rejection = HTTPError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<ReadySession, HTTPError> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(id) = session_id(&jar) else {
            debug!("Request without session cookie");
            return Err(HTTPError::unauthorized());
        };

        let session = state
            .sessions
            .get(&id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| {
                debug!(session_id = %id, "Unknown session");
                HTTPError::unauthorized()
            })?;

        let now = Utc::now();
        if let Some(user_id) = session.ready_user(now) {
            return Ok(ReadySession {
                id: session.id.clone(),
                access_token: session.access_token.clone(),
                user_id: user_id.to_string(),
            });
        }

        let status = session.status_at(now);
        debug!(session_id = %id, status = ?status, "Session not ready");
        if status == SessionStatus::Expired && session.status != SessionStatus::Expired {
            // Token lifetime ran out since the last request; persist that.
            if let Err(e) = state.sessions.mark_expired(&id).await {
                error!("Session store error: {}", e);
            }
        }
        Err(HTTPError::unauthorized())
    }
}
