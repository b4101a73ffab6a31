//! Session store trait

use async_trait::async_trait;
use crate::error::SessionError;
use crate::session::{SessionCookie, SessionData};

/// Trait for session storage backends
///
/// This trait mirrors the express-session store interface. Implementations
/// store session data as JSON under `prefix + session_id`, and derive the TTL
/// from the session cookie themselves (see [`ttl_seconds`]).
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Get a session by ID
    ///
    /// Returns None if session doesn't exist
    async fn get(&self, sid: &str) -> Result<Option<SessionData>, SessionError>;

    /// Set/update a session, resetting its TTL
    async fn set(&self, sid: &str, session: &SessionData) -> Result<(), SessionError>;

    /// Destroy/delete a session
    ///
    /// Destroying a missing session is not an error
    async fn destroy(&self, sid: &str) -> Result<(), SessionError>;

    /// Touch a session - update its TTL without modifying data
    ///
    /// Touching a session that no longer exists is a no-op
    async fn touch(&self, sid: &str, session: &SessionData) -> Result<(), SessionError>;
}

/// TTL in whole seconds for a session cookie
///
/// A positive `cookie.maxAge` (milliseconds) is rounded up to seconds;
/// anything else falls back to `default_ttl`.
pub fn ttl_seconds(cookie: &SessionCookie, default_ttl: u32) -> u64 {
    ttl_from_max_age(cookie.max_age(), default_ttl)
}

pub(crate) fn ttl_from_max_age(max_age_ms: Option<i64>, default_ttl: u32) -> u64 {
    match max_age_ms {
        Some(ms) if ms > 0 => (ms as u64).div_ceil(1000).max(1),
        _ => u64::from(default_ttl),
    }
}
