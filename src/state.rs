//! State handed to every handler.

use crate::config::ConfigV1;
use crate::session::{create_session_store, SessionStore};
use crate::spotify::{SpotifyClient, SpotifyError};
use std::sync::Arc;
use std::time::Duration;

/// Cheap to clone: every member is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Client for the accounts service and the Web API.
    pub spotify: Arc<SpotifyClient>,
    /// Login sessions keyed by the id in the session cookie.
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    /// Builds the state with the default session store.
    pub fn new(config: Arc<ConfigV1>) -> Result<Self, SpotifyError> {
        let timeout = Duration::from_millis(config.upstream.timeout_in_ms);
        let spotify = Arc::new(SpotifyClient::new(&config.spotify, timeout)?);
        Ok(AppState {
            config,
            spotify,
            sessions: create_session_store(),
        })
    }
}
