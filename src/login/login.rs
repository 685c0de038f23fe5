use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::flow::Flow;
use crate::session::Session;
use crate::spotify::{SpotifyClient, SpotifyError, TokenGrant};
use crate::state::AppState;
use crate::utils::random::{generate_random_string, STATE_LENGTH};

/// What a client needs to start a login.
#[derive(Debug, Clone)]
pub struct LoginStart {
    pub state: String,
    pub login_url: String,
}

/// Query parameters Spotify appends to the redirect URI.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set instead of `code` when the user declined.
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("state mismatch")]
    StateMismatch,
    #[error("authorization was not granted: {0}")]
    NotGranted(String),
    #[error(transparent)]
    Exchange(#[from] SpotifyError),
    #[error("session store error: {0}")]
    Store(String),
}

/// Result of a completed callback.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub grant: TokenGrant,
    pub session: Session,
}

/// Generates a fresh state value and the consent URL carrying it.
pub fn begin_login(
    spotify: &SpotifyClient,
    redirect_uri: &str,
) -> Result<LoginStart, SpotifyError> {
    let state = generate_random_string(STATE_LENGTH);
    let login_url = spotify.authorize_url(redirect_uri, &state)?;
    Ok(LoginStart { state, login_url })
}

/// Accepts only when both values are present and equal.
pub fn verify_state(returned: Option<&str>, stored: Option<&str>) -> Result<(), CallbackError> {
    match (returned, stored) {
        (Some(returned), Some(stored)) if returned == stored => Ok(()),
        _ => Err(CallbackError::StateMismatch),
    }
}

/// Resolves the user behind the session's access token and marks it ready.
///
/// On failure the session stays pending and the error is returned.
pub async fn identify(spotify: &SpotifyClient, session: &mut Session) -> Result<(), SpotifyError> {
    let profile = spotify.current_user(&session.access_token).await?;
    debug!(session_id = %session.id, user_id = %profile.id, "Resolved session user");
    session.mark_ready(profile.id);
    Ok(())
}

/// Exchanges the code and opens a session for it.
///
/// The state must already have been verified. The user lookup is awaited
/// before the session is stored, so a stored session is either ready or
/// pending because the lookup failed.
pub async fn complete_login(
    state: &AppState,
    flow: Flow,
    params: &CallbackParams,
) -> Result<LoginOutcome, CallbackError> {
    let code = match (&params.code, &params.error) {
        (Some(code), _) if !code.is_empty() => code,
        (_, Some(error)) => return Err(CallbackError::NotGranted(error.clone())),
        _ => return Err(CallbackError::NotGranted("missing code".to_string())),
    };

    let redirect_uri = flow.redirect_uri(&state.config.flows);
    let grant = state.spotify.exchange_code(code, redirect_uri).await?;

    let mut session = Session::new(&grant);
    if let Err(e) = identify(&state.spotify, &mut session).await {
        warn!(
            session_id = %session.id,
            "Could not resolve user for new session, leaving it pending: {}",
            e
        );
    }

    let purged = state
        .sessions
        .purge_expired(Utc::now())
        .await
        .map_err(CallbackError::Store)?;
    if purged > 0 {
        debug!("Purged {} lapsed sessions", purged);
    }
    state
        .sessions
        .put(session.clone())
        .await
        .map_err(CallbackError::Store)?;

    info!(
        flow = flow.name(),
        session_id = %session.id,
        status = ?session.status,
        "Login completed"
    );
    Ok(LoginOutcome { grant, session })
}
