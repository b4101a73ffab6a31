//! Redis session store compatible with connect-redis
//!
//! This store uses the same storage format as connect-redis:
//! - Key: `prefix + session_id` (default prefix: "sess:")
//! - Value: JSON serialized session data
//! - TTL: Based on session cookie max age, `SETEX` on write and `EXPIRE` on touch
//!
//! Every operation is one round trip on its own connection; nothing is cached
//! or pooled.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::traits::ttl_seconds;
use super::SessionStore;
use crate::config::StoreOptions;
use crate::error::SessionError;
use crate::resp::{ConnectionConfig, Executor, RespValue};
use crate::session::SessionData;

/// Redis session store compatible with connect-redis
///
/// # Example
///
/// ```rust,ignore
/// use resp_session_store::{RedisStore, SessionStore, StoreOptions};
///
/// let store = RedisStore::new(StoreOptions::new("redis://127.0.0.1/"))?;
/// let session = store.get("some-sid").await?;
/// ```
#[derive(Clone, Debug)]
pub struct RedisStore {
    executor: Executor,
    prefix: Arc<str>,
    default_ttl: u32,
}

impl RedisStore {
    /// Create a store; the URL is resolved here, once
    pub fn new(options: StoreOptions) -> Result<Self, SessionError> {
        let config = ConnectionConfig::from_url(&options.url)?;
        let executor = Executor::new(config, options.tls_config)?;
        Ok(Self {
            executor,
            prefix: options.prefix.into(),
            default_ttl: options.ttl_seconds,
        })
    }

    /// Create a store with default prefix and TTL from a connection string
    pub fn from_url(url: &str) -> Result<Self, SessionError> {
        Self::new(StoreOptions::new(url))
    }

    /// The resolved connection parameters
    pub fn connection(&self) -> &ConnectionConfig {
        self.executor.config()
    }

    /// Make a storage key from session ID
    fn make_key(&self, sid: &str) -> String {
        format!("{}{}", self.prefix, sid)
    }
}

fn unexpected(command: &'static str, reply: RespValue) -> SessionError {
    SessionError::UnexpectedReply {
        command,
        reply: format!("{:?}", reply),
    }
}

#[async_trait]
impl SessionStore for RedisStore {
    async fn get(&self, sid: &str) -> Result<Option<SessionData>, SessionError> {
        let key = self.make_key(sid);
        let reply = self.executor.execute(&["GET", key.as_str()]).await?;

        match reply.into_bulk() {
            Ok(Some(json)) => Ok(Some(serde_json::from_str(&json)?)),
            Ok(None) => Ok(None),
            Err(other) => Err(unexpected("GET", other)),
        }
    }

    async fn set(&self, sid: &str, session: &SessionData) -> Result<(), SessionError> {
        let key = self.make_key(sid);
        let json = serde_json::to_string(session)?;
        let ttl = ttl_seconds(&session.cookie, self.default_ttl).to_string();

        let reply = self
            .executor
            .execute(&["SETEX", key.as_str(), ttl.as_str(), json.as_str()])
            .await?;

        if reply.is_ok() {
            Ok(())
        } else {
            Err(unexpected("SETEX", reply))
        }
    }

    async fn destroy(&self, sid: &str) -> Result<(), SessionError> {
        let key = self.make_key(sid);

        // DEL answers with how many keys were removed; 0 is fine
        match self.executor.execute(&["DEL", key.as_str()]).await? {
            RespValue::Integer(_) => Ok(()),
            other => Err(unexpected("DEL", other)),
        }
    }

    async fn touch(&self, sid: &str, session: &SessionData) -> Result<(), SessionError> {
        let key = self.make_key(sid);
        let ttl = ttl_seconds(&session.cookie, self.default_ttl).to_string();

        let reply = self
            .executor
            .execute(&["EXPIRE", key.as_str(), ttl.as_str()])
            .await?;

        // If EXPIRE returns 0, the key doesn't exist, which is fine
        // connect-redis also doesn't check the return value
        match reply {
            RespValue::Integer(0) => {
                debug!("touched a session that no longer exists");
                Ok(())
            }
            RespValue::Integer(_) => Ok(()),
            other => Err(unexpected("EXPIRE", other)),
        }
    }
}
