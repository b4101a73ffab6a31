//! Store configuration

use std::sync::Arc;

use tokio_rustls::rustls::ClientConfig;

/// Default key prefix, shared with connect-redis
pub const DEFAULT_PREFIX: &str = "sess:";

/// Default TTL in seconds (1 day), used when a session cookie has no max age
pub const DEFAULT_TTL_SECONDS: u32 = 86_400;

/// Configuration for [`RedisStore`](crate::RedisStore)
#[derive(Clone)]
pub struct StoreOptions {
    /// Connection string, `redis[s]://[:password@]host[:port][/db]`
    pub url: String,

    /// Session key prefix in store (default: "sess:")
    pub prefix: String,

    /// Fallback TTL in seconds (default: 86400)
    pub ttl_seconds: u32,

    /// TLS client config for `rediss://` URLs
    /// When None, the webpki root certificates are trusted
    pub tls_config: Option<Arc<ClientConfig>>,
}

impl std::fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The URL may carry a password
        f.debug_struct("StoreOptions")
            .field("prefix", &self.prefix)
            .field("ttl_seconds", &self.ttl_seconds)
            .field("tls_config", &self.tls_config.is_some())
            .finish_non_exhaustive()
    }
}

impl StoreOptions {
    /// Create options for the given connection string
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            ttl_seconds: DEFAULT_TTL_SECONDS,
            tls_config: None,
        }
    }

    /// Set the session key prefix in store (default: "sess:")
    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the fallback TTL in seconds (default: 86400 = 1 day)
    pub fn with_ttl_seconds(mut self, ttl_seconds: u32) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    /// Use a specific TLS client config for `rediss://` connections
    pub fn with_tls_config(mut self, tls_config: Arc<ClientConfig>) -> Self {
        self.tls_config = Some(tls_config);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = StoreOptions::new("redis://localhost");
        assert_eq!(options.prefix, "sess:");
        assert_eq!(options.ttl_seconds, 86_400);
        assert!(options.tls_config.is_none());
    }

    #[test]
    fn test_builder_and_debug() {
        let options = StoreOptions::new("redis://:secret@localhost")
            .with_prefix("app:")
            .with_ttl_seconds(60);
        assert_eq!(options.prefix, "app:");
        assert_eq!(options.ttl_seconds, 60);
        assert!(!format!("{:?}", options).contains("secret"));
    }
}
