//! Byte-ordered key-value storage contract.
//!
//! Navigation (`first`, `last`, `previous`) follows raw key byte order.
//! For block records keyed by digest that order is effectively random and
//! has nothing to do with chain order.

use ledger_derive::Error;

/// A stored key-value pair.
pub type Entry = (Vec<u8>, Vec<u8>);

/// Keys in the metadata keyspace.
pub mod meta_keys {
    /// Digest of the chain tip.
    pub const TIP: &[u8] = b"tip";
}

/// Errors that can occur while interacting with an ordered store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("key not found")]
    NotFound,
    #[error("write failed: {0}")]
    WriteError(String),
    #[error("store is empty")]
    EmptyStore,
    #[error("store holds a single entry")]
    SingleEntry,
    #[error("store has been closed")]
    ClosedStore,
    /// Read-side failure reported by the storage engine.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Durable byte-keyed store with lexicographic navigation.
///
/// Every navigation call starts from a fresh cursor; nothing is shared
/// between calls, so concurrent writes may be observed in between.
pub trait OrderedStore: Send + Sync {
    /// Inserts or overwrites `key`.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Returns the value stored under `key`, or [`StoreError::NotFound`].
    fn get(&self, key: &[u8]) -> Result<Vec<u8>, StoreError>;

    /// Removes `key`. Removing an absent key succeeds.
    fn delete(&self, key: &[u8]) -> Result<(), StoreError>;

    /// Pair with the smallest key, or [`StoreError::NotFound`] when empty.
    fn first(&self) -> Result<Entry, StoreError>;

    /// Pair with the largest key, or [`StoreError::NotFound`] when empty.
    fn last(&self) -> Result<Entry, StoreError>;

    /// Pair immediately before the largest key.
    ///
    /// Fails with [`StoreError::EmptyStore`] on an empty store and
    /// [`StoreError::SingleEntry`] when only one pair exists.
    fn previous(&self) -> Result<Entry, StoreError>;

    /// Every pair in ascending key order.
    fn entries(&self) -> Result<Vec<Entry>, StoreError>;

    /// Writes `key` into the metadata keyspace. Navigation and
    /// [`entries`](Self::entries) never see metadata.
    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Reads `key` from the metadata keyspace, or [`StoreError::NotFound`].
    fn get_meta(&self, key: &[u8]) -> Result<Vec<u8>, StoreError>;

    /// Releases the underlying storage. Later calls fail with
    /// [`StoreError::ClosedStore`].
    fn close(&self);
}
