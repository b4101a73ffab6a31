//! In-memory session store
//!
//! This is primarily for development and testing.
//! For production, use RedisStore or another persistent store.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::traits::ttl_seconds;
use super::SessionStore;
use crate::config::{DEFAULT_PREFIX, DEFAULT_TTL_SECONDS};
use crate::error::SessionError;
use crate::session::SessionData;

struct StoredSession {
    json: String,
    expires_at: Instant,
}

/// In-memory session store
///
/// Follows the same rules as [`RedisStore`](crate::RedisStore): values are kept
/// as JSON, `set` and `touch` reset the TTL derived from the cookie, and
/// expired entries are invisible to `get`.
///
/// Warning: This store is not suitable for production use because:
/// - Sessions are lost on server restart
/// - Sessions are not shared across multiple server instances
/// - Memory usage grows with number of sessions until [`cleanup_expired`](Self::cleanup_expired) runs
pub struct MemoryStore {
    sessions: Arc<RwLock<HashMap<String, StoredSession>>>,
    prefix: String,
    default_ttl: u32,
}

impl MemoryStore {
    /// Create a new memory store
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }

    /// Create a new memory store with a custom prefix
    pub fn with_prefix<S: Into<String>>(prefix: S) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            prefix: prefix.into(),
            default_ttl: DEFAULT_TTL_SECONDS,
        }
    }

    /// Build with custom default TTL
    pub fn with_default_ttl(mut self, ttl: u32) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Make a storage key from session ID
    fn make_key(&self, sid: &str) -> String {
        format!("{}{}", self.prefix, sid)
    }

    fn expiry(&self, session: &SessionData) -> Instant {
        Instant::now() + Duration::from_secs(ttl_seconds(&session.cookie, self.default_ttl))
    }

    /// Number of stored entries, including expired ones not yet cleaned up
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// `true` when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Clean up expired sessions
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        self.sessions.write().retain(|_, stored| stored.expires_at > now);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            prefix: self.prefix.clone(),
            default_ttl: self.default_ttl,
        }
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, sid: &str) -> Result<Option<SessionData>, SessionError> {
        let key = self.make_key(sid);
        let sessions = self.sessions.read();

        match sessions.get(&key) {
            Some(stored) if stored.expires_at > Instant::now() => {
                Ok(Some(serde_json::from_str(&stored.json)?))
            }
            _ => Ok(None),
        }
    }

    async fn set(&self, sid: &str, session: &SessionData) -> Result<(), SessionError> {
        let stored = StoredSession {
            json: serde_json::to_string(session)?,
            expires_at: self.expiry(session),
        };

        self.sessions.write().insert(self.make_key(sid), stored);
        Ok(())
    }

    async fn destroy(&self, sid: &str) -> Result<(), SessionError> {
        let key = self.make_key(sid);
        self.sessions.write().remove(&key);
        Ok(())
    }

    async fn touch(&self, sid: &str, session: &SessionData) -> Result<(), SessionError> {
        let key = self.make_key(sid);
        let expires_at = self.expiry(session);
        let mut sessions = self.sessions.write();

        if let Some(stored) = sessions.get_mut(&key) {
            if stored.expires_at > Instant::now() {
                stored.expires_at = expires_at;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();

        // Create session data
        let mut data = SessionData::new(3600);
        data.set("user", "alice");

        // Set session
        store.set("test-id", &data).await.unwrap();
        assert!(store.sessions.read().contains_key("sess:test-id"));

        // Get session
        let retrieved = store.get("test-id").await.unwrap();
        assert_eq!(retrieved, Some(data.clone()));

        // Touch session
        store.touch("test-id", &data).await.unwrap();

        // Destroy session, twice
        store.destroy("test-id").await.unwrap();
        store.destroy("test-id").await.unwrap();
        let retrieved = store.get("test-id").await.unwrap();
        assert!(retrieved.is_none());
    }

    #[tokio::test]
    async fn test_memory_store_expiry() {
        let store = MemoryStore::new();

        let mut data = SessionData::new(1);
        data.cookie.set_max_age(Some(1));
        store.set("test-id", &data).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;

        let retrieved = store.get("test-id").await.unwrap();
        assert!(retrieved.is_none());

        // Touch does not resurrect an expired entry
        let fresh = SessionData::new(3600);
        store.touch("test-id", &fresh).await.unwrap();
        assert!(store.get("test-id").await.unwrap().is_none());

        store.cleanup_expired();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_touch_missing_is_noop() {
        let store = MemoryStore::with_prefix("app:").with_default_ttl(60);
        store.touch("missing", &SessionData::default()).await.unwrap();
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_an_error() {
        let store = MemoryStore::new();
        store.sessions.write().insert(
            "sess:bad".to_string(),
            StoredSession {
                json: "{not json".to_string(),
                expires_at: Instant::now() + Duration::from_secs(60),
            },
        );

        assert!(matches!(
            store.get("bad").await,
            Err(SessionError::Serialization(_))
        ));
    }
}
