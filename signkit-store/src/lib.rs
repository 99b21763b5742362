//! Key-value store collaborators for signkit.
//!
//! A profile persists itself as a handful of string records. This crate
//! defines the [`KeyValueStore`] interface it writes through, plus two
//! implementations:
//!
//! - [`MemoryStore`]: a `HashMap` behind an `RwLock`, for tests and
//!   short-lived processes.
//! - [`FileStore`]: a single JSON document on disk, replaced atomically.

pub mod error;
pub mod file;
pub mod memory;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;

/// String-keyed record store used to persist profiles.
///
/// Implementations must be safe to share across threads. Every method after
/// [`close`](KeyValueStore::close) returns [`StorageError::Closed`].
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails or the store is closed.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails or the store is closed.
    fn put(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails or the store is closed.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// Removes every record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails or the store is closed.
    fn clear(&self) -> StorageResult<()>;

    /// Releases the backend. Further calls fail with [`StorageError::Closed`].
    ///
    /// # Errors
    ///
    /// Returns an error if pending data cannot be flushed.
    fn close(&self) -> StorageResult<()>;

    /// Replaces the whole store content with `records`.
    ///
    /// The default implementation clears and then writes record by record.
    /// A crash between those steps leaves an empty or partially written
    /// store; callers must treat that as "nothing stored". Backends that can
    /// swap their content in one step override this.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by `clear` or `put`.
    fn replace_all(&self, records: &[(&str, &str)]) -> StorageResult<()> {
        self.clear()?;
        for (key, value) in records {
            self.put(key, value)?;
        }
        Ok(())
    }
}
