//! TTL key-value storage.

mod kv;
mod sqlite;

pub use kv::{KvStore, StoreError};
pub use sqlite::SqliteKvStore;
