//! Session store implementations

mod memory;
mod redis_store;
mod traits;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use traits::{ttl_seconds, SessionStore};
