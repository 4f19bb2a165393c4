//! Durable key/value storage for quote snapshots and preferences.
//!
//! Every value is written as a whole under a fixed key, so a write is one
//! atomic overwrite. `SQLite` backs the real store (see [`crate::db`]);
//! [`MemoryStorage`] serves tests and ephemeral sessions.

mod memory;

pub use memory::MemoryStorage;

use crate::error::Result;

/// Storage key of the serialized quote collection.
pub const QUOTES_KEY: &str = "quotes";

/// Storage key of the remembered category filter.
pub const SELECTED_CATEGORY_KEY: &str = "selectedCategory";

/// Trait for snapshot storage operations
pub trait SnapshotStorage {
    /// Read the value stored under `key`, if any
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn write(&self, key: &str, value: &str) -> Result<()>;
}
