//! Volatile [`OrderedStore`] backed by a `BTreeMap`.

use crate::storage::ordered_store::{Entry, OrderedStore, StoreError};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

type Map = BTreeMap<Vec<u8>, Vec<u8>>;

#[derive(Default)]
struct Tables {
    records: Map,
    meta: Map,
}

/// In-memory ordered store.
///
/// Readers share the lock, writers take it exclusively. `None` marks a
/// closed store.
pub struct MemoryStore {
    inner: RwLock<Option<Tables>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Some(Tables::default())),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Tables>> {
        // Recover the map if a previous holder panicked.
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Tables>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    fn with_tables<T>(
        &self,
        f: impl FnOnce(&Tables) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        match self.read().as_ref() {
            Some(tables) => f(tables),
            None => Err(StoreError::ClosedStore),
        }
    }

    fn with_tables_mut<T>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        match self.write().as_mut() {
            Some(tables) => f(tables),
            None => Err(StoreError::ClosedStore),
        }
    }

    fn with_map<T>(&self, f: impl FnOnce(&Map) -> Result<T, StoreError>) -> Result<T, StoreError> {
        self.with_tables(|t| f(&t.records))
    }

    fn with_map_mut<T>(
        &self,
        f: impl FnOnce(&mut Map) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.with_tables_mut(|t| f(&mut t.records))
    }

    /// Number of records, metadata excluded.
    pub fn len(&self) -> usize {
        self.read().as_ref().map_or(0, |t| t.records.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn owned((k, v): (&Vec<u8>, &Vec<u8>)) -> Entry {
    (k.clone(), v.clone())
}

impl OrderedStore for MemoryStore {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.with_map_mut(|map| {
            map.insert(key.to_vec(), value.to_vec());
            Ok(())
        })
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>, StoreError> {
        self.with_map(|map| map.get(key).cloned().ok_or(StoreError::NotFound))
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.with_map_mut(|map| {
            map.remove(key);
            Ok(())
        })
    }

    fn first(&self) -> Result<Entry, StoreError> {
        self.with_map(|map| map.iter().next().map(owned).ok_or(StoreError::NotFound))
    }

    fn last(&self) -> Result<Entry, StoreError> {
        self.with_map(|map| map.iter().next_back().map(owned).ok_or(StoreError::NotFound))
    }

    fn previous(&self) -> Result<Entry, StoreError> {
        self.with_map(|map| {
            let mut rev = map.iter().rev();
            if rev.next().is_none() {
                return Err(StoreError::EmptyStore);
            }
            rev.next().map(owned).ok_or(StoreError::SingleEntry)
        })
    }

    fn entries(&self) -> Result<Vec<Entry>, StoreError> {
        self.with_map(|map| Ok(map.iter().map(owned).collect()))
    }

    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.with_tables_mut(|t| {
            t.meta.insert(key.to_vec(), value.to_vec());
            Ok(())
        })
    }

    fn get_meta(&self, key: &[u8]) -> Result<Vec<u8>, StoreError> {
        self.with_tables(|t| t.meta.get(key).cloned().ok_or(StoreError::NotFound))
    }

    fn close(&self) {
        *self.write() = None;
    }
}
