use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::spotify::TokenGrant;

/// Lifecycle of a login.
///
/// `Pending` until the user's identity is known, `Ready` while the access
/// token may be used, `Expired` once it lapsed or the upstream refused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Ready,
    Expired,
}

/// Everything the relay knows about one logged-in browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user_id: Option<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    /// When the access token lapses; `None` if the upstream gave no lifetime.
    pub expires_at: Option<DateTime<Utc>>,
}

/// A lifetime too large to represent is treated as no lifetime at all.
fn expiry_from(grant: &TokenGrant, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    grant
        .expires_in
        .filter(|secs| *secs > 0)
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
}

impl Session {
    /// Opens a pending session for a freshly exchanged token pair.
    pub fn new(grant: &TokenGrant) -> Self {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4().to_string(),
            access_token: grant.access_token.clone(),
            refresh_token: grant.refresh_token.clone(),
            user_id: None,
            status: SessionStatus::Pending,
            created_at: now,
            expires_at: expiry_from(grant, now),
        }
    }

    pub fn mark_ready(&mut self, user_id: impl Into<String>) {
        self.user_id = Some(user_id.into());
        self.status = SessionStatus::Ready;
    }

    pub fn mark_expired(&mut self) {
        self.status = SessionStatus::Expired;
    }

    /// Swaps in a refreshed access token. The refresh token is only replaced
    /// when the upstream rotated it.
    pub fn apply_refresh(&mut self, grant: &TokenGrant) {
        self.access_token = grant.access_token.clone();
        if let Some(refresh_token) = &grant.refresh_token {
            self.refresh_token = Some(refresh_token.clone());
        }
        self.expires_at = expiry_from(grant, Utc::now());
        self.status = if self.user_id.is_some() {
            SessionStatus::Ready
        } else {
            SessionStatus::Pending
        };
    }

    /// Status as of `now`, taking the token lifetime into account.
    pub fn status_at(&self, now: DateTime<Utc>) -> SessionStatus {
        match self.expires_at {
            Some(expires_at) if expires_at <= now => SessionStatus::Expired,
            _ => self.status,
        }
    }

    /// The user id, but only while the session is usable.
    pub fn ready_user(&self, now: DateTime<Utc>) -> Option<&str> {
        match self.status_at(now) {
            SessionStatus::Ready => self.user_id.as_deref(),
            _ => None,
        }
    }
}
