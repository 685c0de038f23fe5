//! Per-browser login sessions.
//!
//! A session is created by a successful callback, becomes ready once the
//! user's profile id is known, and is looked up from a cookie on every
//! proxied request.

pub mod cookies;
pub mod extract;
pub mod session;
pub mod store;

pub use extract::ReadySession;
pub use session::{Session, SessionStatus};
pub use store::{create_session_store, InMemorySessionStore, SessionStore};
