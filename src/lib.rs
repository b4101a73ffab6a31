//! # resp-session-store
//!
//! Express-session compatible session store backed by Redis, speaking RESP2
//! over a hand-rolled client instead of a full Redis library.
//!
//! Sessions are stored the way connect-redis stores them, so Rust and Node.js
//! applications can share a session keyspace.
//!
//! ## Features
//!
//! - **Connect-redis compatible storage**: `sess:` + id keys holding the JSON session, expiring via `SETEX`/`EXPIRE`
//! - **Minimal RESP2 client**: URL resolution, command encoding, partial-buffer reply parsing
//! - **One connection per operation**: `AUTH` and `SELECT` are pipelined ahead of each command
//! - **TLS**: `rediss://` URLs are served over rustls
//! - **Pluggable storage backends**: Redis, Memory, or custom stores behind [`SessionStore`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use resp_session_store::{RedisStore, SessionData, SessionStore, StoreOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = RedisStore::new(
//!         StoreOptions::new("redis://127.0.0.1/").with_prefix("sess:"),
//!     )?;
//!
//!     let mut session = SessionData::new(86400);
//!     session.set("views", 1);
//!     store.set("my-session-id", &session).await?;
//!
//!     let loaded = store.get("my-session-id").await?;
//!     assert_eq!(loaded, Some(session));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod resp;
pub mod session;
pub mod store;

pub use config::StoreOptions;
pub use error::SessionError;
pub use resp::{ConnectionConfig, RedisError, RespValue};
pub use session::{SessionCookie, SessionData};
pub use store::{MemoryStore, RedisStore, SessionStore};
