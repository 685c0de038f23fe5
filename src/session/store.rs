use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::session::{Session, SessionStatus};

/// Minutes a session may stay pending before it is purged.
pub const PENDING_GRACE_MINUTES: i64 = 60;

/// The SessionStore trait abstracts session storage (put, retrieve, expire, delete).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Inserts or replaces the session with the same id.
    async fn put(&self, session: Session) -> Result<(), String>;
    async fn get(&self, id: &str) -> Result<Option<Session>, String>;
    /// Marks a session expired; unknown ids are ignored.
    async fn mark_expired(&self, id: &str) -> Result<(), String>;
    /// Drops sessions that are expired as of `before`, whether by lifetime or
    /// because the upstream refused their token, and sessions still pending
    /// after [`PENDING_GRACE_MINUTES`]. Returns how many went.
    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<usize, String>;
}

/// Process-local store; sessions are lost on restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(&self, session: Session) -> Result<(), String> {
        debug!(session_id = %session.id, status = ?session.status, "Storing session");
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Session>, String> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn mark_expired(&self, id: &str) -> Result<(), String> {
        if let Some(session) = self.sessions.write().await.get_mut(id) {
            debug!(session_id = %id, "Marking session expired");
            session.mark_expired();
        }
        Ok(())
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<usize, String> {
        let mut sessions = self.sessions.write().await;
        let count = sessions.len();
        let pending_cutoff = before - Duration::minutes(PENDING_GRACE_MINUTES);
        sessions.retain(|_, s| match s.status_at(before) {
            SessionStatus::Expired => false,
            SessionStatus::Pending => s.created_at > pending_cutoff,
            SessionStatus::Ready => true,
        });
        Ok(count - sessions.len())
    }
}

/// Creates the session store used by the server.
pub fn create_session_store() -> Arc<dyn SessionStore> {
    info!("Using in-memory session store.");
    Arc::new(InMemorySessionStore::new())
}
