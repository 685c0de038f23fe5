//! Read-only proxies onto the Web API.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::session::ReadySession;
use crate::spotify::{owned_playlists, PlaylistSummary, SpotifyError};
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Registers playlist routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/playlists", get(list_playlists))
        .route("/playlist/:id", get(list_playlist_tracks))
}

/// Converts an upstream failure, expiring the session if its token was refused.
async fn upstream_failure(state: &AppState, session: &ReadySession, err: SpotifyError) -> HTTPError {
    if let SpotifyError::Unauthorized(status) = &err {
        if *status == StatusCode::UNAUTHORIZED {
            info!(session_id = %session.id, "Upstream refused access token; expiring session");
            if let Err(e) = state.sessions.mark_expired(&session.id).await {
                error!("Session store error: {}", e);
            }
        }
    }
    err.into()
}

/// Playlists of the current user that the user owns, as `{name, id, href}`.
async fn list_playlists(
    session: ReadySession,
    State(state): State<AppState>,
) -> Result<Json<Vec<PlaylistSummary>>, HTTPError> {
    let playlists = match state.spotify.playlists(&session.access_token).await {
        Ok(playlists) => playlists,
        Err(e) => return Err(upstream_failure(&state, &session, e).await),
    };

    let total = playlists.len();
    let owned = owned_playlists(playlists, &session.user_id);
    debug!(
        session_id = %session.id,
        total,
        owned = owned.len(),
        "Filtered playlists by owner"
    );
    Ok(Json(owned))
}

/// Track items of one playlist, forwarded as returned upstream.
async fn list_playlist_tracks(
    session: ReadySession,
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> Result<Json<Vec<Value>>, HTTPError> {
    match state
        .spotify
        .playlist_tracks(&session.access_token, &playlist_id)
        .await
    {
        Ok(items) => Ok(Json(items)),
        Err(e) => Err(upstream_failure(&state, &session, e).await),
    }
}
