//! Login, callback and refresh endpoint handlers.
//!
//! `/login` + `/callback` serve the browser flow, `/appLogin` + `/appCallback`
//! the application flow. Each pair is one handler parameterised by [`Flow`].

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::login::{self, CallbackError, CallbackParams, Flow};
use crate::session::cookies::{
    access_token_cookie, clear_state_cookie, session_cookie, session_id, state_cookie,
    stored_state, ACCESS_TOKEN_COOKIE, STATE_COOKIE,
};
use crate::state::AppState;
use crate::utils::http_helpers::{map_store_error, HTTPError};

/// Registers login and token routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(|s: State<AppState>, j: CookieJar| start_login(Flow::Browser, s, j)),
        )
        .route(
            "/appLogin",
            get(|s: State<AppState>, j: CookieJar| start_login(Flow::App, s, j)),
        )
        // The default redirect URI is registered with a trailing slash.
        .route("/callback", get(browser_callback))
        .route("/callback/", get(browser_callback))
        .route(
            "/appCallback",
            get(
                |s: State<AppState>, j: CookieJar, q: Query<CallbackParams>| {
                    finish_login(Flow::App, s, j, q)
                },
            ),
        )
        .route("/refresh_token", get(refresh_token))
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AppLoginResponse {
    pub state_key: String,
    pub state_value: String,
    pub login_url: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AppCallbackResponse {
    pub ac: String,
    pub key: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Deserialize, Debug)]
pub struct RefreshParams {
    pub refresh_token: Option<String>,
}

/// Redirect back to the relay's own page with `params` in the fragment.
fn fragment_redirect(params: &[(&str, &str)]) -> Response {
    match serde_urlencoded::to_string(params) {
        Ok(fragment) => Redirect::to(&format!("/#{}", fragment)).into_response(),
        Err(e) => {
            error!("Failed to encode redirect fragment: {}", e);
            HTTPError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}

/// Starts a login: stores a fresh state in a cookie and either redirects to
/// the consent page or returns its URL.
async fn start_login(flow: Flow, State(state): State<AppState>, jar: CookieJar) -> Response {
    let redirect_uri = flow.redirect_uri(&state.config.flows);
    let start = match login::begin_login(&state.spotify, redirect_uri) {
        Ok(start) => start,
        Err(e) => {
            error!("Failed to build authorization URL: {}", e);
            return HTTPError::new(StatusCode::INTERNAL_SERVER_ERROR, "invalid accounts url")
                .into_response();
        }
    };
    debug!(flow = flow.name(), "Starting login");

    let jar = jar.add(state_cookie(start.state.clone()));
    match flow {
        Flow::Browser => (jar, Redirect::to(&start.login_url)).into_response(),
        Flow::App => (
            jar,
            Json(AppLoginResponse {
                state_key: STATE_COOKIE.to_string(),
                state_value: start.state,
                login_url: start.login_url,
            }),
        )
            .into_response(),
    }
}

async fn browser_callback(
    state: State<AppState>,
    jar: CookieJar,
    params: Query<CallbackParams>,
) -> Response {
    finish_login(Flow::Browser, state, jar, params).await
}

/// Finishes a login: checks the state, exchanges the code and opens a session.
async fn finish_login(
    flow: Flow,
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    let stored = stored_state(&jar);
    if let Err(e) = login::verify_state(params.state.as_deref(), stored.as_deref()) {
        warn!(flow = flow.name(), "Rejecting callback: {}", e);
        return match flow {
            Flow::Browser => fragment_redirect(&[("error", "state_mismatch")]),
            Flow::App => HTTPError::new(StatusCode::BAD_REQUEST, "state_mismatch").into_response(),
        };
    }

    let jar = clear_state_cookie(jar);
    match login::complete_login(&state, flow, &params).await {
        Ok(outcome) => {
            let access_token = outcome.grant.access_token.clone();
            let jar = jar
                .add(access_token_cookie(access_token.clone()))
                .add(session_cookie(outcome.session.id.clone()));
            match flow {
                Flow::Browser => {
                    let refresh_token = outcome.grant.refresh_token.as_deref().unwrap_or_default();
                    (
                        jar,
                        fragment_redirect(&[
                            ("access_token", access_token.as_str()),
                            ("refresh_token", refresh_token),
                        ]),
                    )
                        .into_response()
                }
                Flow::App => (
                    jar,
                    Json(AppCallbackResponse {
                        ac: access_token,
                        key: ACCESS_TOKEN_COOKIE.to_string(),
                    }),
                )
                    .into_response(),
            }
        }
        Err(e) => {
            warn!(flow = flow.name(), "Login failed: {}", e);
            let response = match flow {
                Flow::Browser => fragment_redirect(&[("error", "invalid_token")]),
                Flow::App => callback_error(e).into_response(),
            };
            (jar, response).into_response()
        }
    }
}

fn callback_error(err: CallbackError) -> HTTPError {
    match err {
        CallbackError::Exchange(e) => e.into(),
        CallbackError::NotGranted(reason) => HTTPError::new(StatusCode::BAD_REQUEST, reason),
        CallbackError::StateMismatch => HTTPError::new(StatusCode::BAD_REQUEST, "state_mismatch"),
        CallbackError::Store(e) => map_store_error(e),
    }
}

/// Trades a refresh token for a new access token.
///
/// Uses the query parameter if given, otherwise the caller's session. The
/// caller's session is only updated when the token used is its own.
async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<RefreshParams>,
) -> Result<Response, HTTPError> {
    let session = match session_id(&jar) {
        Some(id) => state.sessions.get(&id).await.map_err(map_store_error)?,
        None => None,
    };

    let token = params
        .refresh_token
        .filter(|t| !t.is_empty())
        .or_else(|| session.as_ref().and_then(|s| s.refresh_token.clone()))
        .ok_or_else(|| HTTPError::new(StatusCode::BAD_REQUEST, "missing refresh_token"))?;

    let grant = state.spotify.refresh(&token).await.map_err(|e| {
        warn!("Refresh failed: {}", e);
        HTTPError::from(e)
    })?;

    let body = Json(RefreshResponse {
        access_token: grant.access_token.clone(),
    });

    match session {
        Some(mut session) if session.refresh_token.as_deref() == Some(token.as_str()) => {
            session.apply_refresh(&grant);
            info!(session_id = %session.id, status = ?session.status, "Session refreshed");
            state.sessions.put(session).await.map_err(map_store_error)?;
            let jar = jar.add(access_token_cookie(grant.access_token));
            Ok((jar, body).into_response())
        }
        _ => Ok(body.into_response()),
    }
}
