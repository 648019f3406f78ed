//! Persistence adapter: an async string-keyed store plus the sequenced
//! background writer that mirrors the news store into it.

mod kv;
mod memory;
mod schema;
mod types;
mod writer;

pub use kv::KeyValueStore;
pub use memory::MemoryStore;
pub use schema::SqliteStore;
pub use types::{keys, StorageError};
pub use writer::{PersistQueue, PersistenceStatus};
