//! Session data structure compatible with express-session

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Cookie data structure compatible with express-session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    /// Original max age in milliseconds (as set initially)
    pub original_max_age: Option<i64>,

    /// Expiration time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,

    /// Secure flag
    #[serde(default)]
    pub secure: bool,

    /// HttpOnly flag
    #[serde(default = "default_http_only")]
    pub http_only: bool,

    /// Cookie path
    #[serde(default = "default_path")]
    pub path: String,

    /// Cookie domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// SameSite attribute; express accepts `true`/`false` as well as
    /// `"lax"`/`"strict"`/`"none"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_site: Option<Value>,

    /// Cookie options this struct doesn't model (`priority`, `partitioned`, ...),
    /// kept so they survive a load/save cycle
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

fn default_http_only() -> bool {
    true
}

fn default_path() -> String {
    "/".to_string()
}

impl Default for SessionCookie {
    fn default() -> Self {
        Self {
            original_max_age: None,
            expires: None,
            secure: false,
            http_only: true,
            path: "/".to_string(),
            domain: None,
            same_site: None,
            extra: HashMap::new(),
        }
    }
}

impl SessionCookie {
    /// Create a new session cookie with the given max age in seconds
    pub fn new(max_age_secs: u64) -> Self {
        let mut cookie = Self::default();
        let ms = i64::try_from(max_age_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        cookie.set_max_age(Some(ms));
        cookie
    }

    /// Remaining lifetime in milliseconds, like express-session's `cookie.maxAge`
    ///
    /// `None` for a browser-session cookie with no expiry.
    pub fn max_age(&self) -> Option<i64> {
        self.expires.map(|exp| (exp - Utc::now()).num_milliseconds())
    }

    /// Set the lifetime in milliseconds from now; `None` makes it a browser-session cookie
    ///
    /// An expiry past the range of `DateTime<Utc>` is clamped to its end.
    pub fn set_max_age(&mut self, max_age_ms: Option<i64>) {
        self.original_max_age = max_age_ms;
        self.expires = max_age_ms.map(expiry_after);
    }
}

fn expiry_after(ms: i64) -> DateTime<Utc> {
    Duration::try_milliseconds(ms)
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .unwrap_or(if ms < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

/// Session data structure compatible with express-session/connect-redis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Cookie information
    pub cookie: SessionCookie,

    /// Additional session data (flattened at same level as cookie)
    #[serde(flatten)]
    pub data: HashMap<String, Value>,
}

impl SessionData {
    /// Create a new session data with the given max age in seconds
    pub fn new(max_age_secs: u64) -> Self {
        Self {
            cookie: SessionCookie::new(max_age_secs),
            data: HashMap::new(),
        }
    }

    /// Get a value from session data
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data.get(key).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a value in session data
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.data.insert(key.to_string(), v);
        }
    }

    /// Remove a value from session data
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Check if a key exists
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Check if session data is empty (no user data)
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
