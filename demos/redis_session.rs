//! Session lifecycle against a real Redis
//!
//! ```text
//! REDIS_URL=redis://:password@127.0.0.1:6379/1 cargo run --example redis_session
//! ```
//!
//! Sessions written here are readable by a Node.js app using express-session
//! with connect-redis on the same prefix, and vice versa.

use resp_session_store::{RedisStore, SessionData, SessionStore, StoreOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    // Get Redis URL from environment or use default
    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());

    let store = RedisStore::new(
        StoreOptions::new(redis_url)
            .with_prefix("sess:")
            .with_ttl_seconds(86_400),
    )?;
    println!("Using {:?}", store.connection());

    let sid = "demo-session";

    // A cookie with a 24 hour max age, like express-session's default setup
    let mut session = SessionData::new(24 * 60 * 60);
    session.set("views", 1);
    session.set("user", "alice");
    store.set(sid, &session).await?;
    println!("set     {}", sid);

    let loaded = store.get(sid).await?;
    println!("get     {} -> {:?}", sid, loaded.as_ref().map(|s| &s.data));

    store.touch(sid, &session).await?;
    println!("touch   {}", sid);

    store.destroy(sid).await?;
    println!("destroy {}", sid);

    let gone = store.get(sid).await?;
    println!("get     {} -> {:?}", sid, gone);

    Ok(())
}
