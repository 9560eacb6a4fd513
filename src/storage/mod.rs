//! Block persistence.
//!
//! - [`ordered_store`]: the [`OrderedStore`](ordered_store::OrderedStore)
//!   contract and its error type
//! - [`rocksdb_store`]: durable RocksDB implementation
//! - [`memory_store`]: `BTreeMap` implementation for tests and throwaway chains

pub mod memory_store;
pub mod ordered_store;
pub mod rocksdb_store;
