//! RocksDB-backed [`OrderedStore`].
//!
//! Records live in the default column family, so RocksDB's bytewise
//! comparator gives exactly the lexicographic order the trait promises.
//! Metadata lives in [`CF_META`], which iterators over the default family
//! never reach.

use crate::storage::ordered_store::{Entry, OrderedStore, StoreError};
use rocksdb::{ColumnFamily, DB, IteratorMode, Options};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

/// Column family for metadata such as the chain tip.
pub const CF_META: &str = "meta";

/// Durable ordered store on a RocksDB directory. The handle is `None` once
/// closed.
pub struct RocksDbStore {
    db: RwLock<Option<DB>>,
    path: PathBuf,
}

impl RocksDbStore {
    /// Opens or creates the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let db = DB::open_cf(&opts, &path, [CF_META])
            .map_err(|e| StoreError::Backend(e.into_string()))?;
        Ok(Self {
            db: RwLock::new(Some(db)),
            path,
        })
    }

    /// Deletes the database at `path` and everything in it.
    pub fn destroy(path: impl AsRef<Path>) -> Result<(), StoreError> {
        DB::destroy(&Options::default(), path.as_ref())
            .map_err(|e| StoreError::Backend(e.into_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn handle(&self) -> RwLockReadGuard<'_, Option<DB>> {
        // If a previous panic occurred while holding the lock, recover the handle.
        self.db.read().unwrap_or_else(|e| e.into_inner())
    }

    fn with_db<T>(&self, f: impl FnOnce(&DB) -> Result<T, StoreError>) -> Result<T, StoreError> {
        match self.handle().as_ref() {
            Some(db) => f(db),
            None => Err(StoreError::ClosedStore),
        }
    }

    fn meta_cf(db: &DB) -> Result<&ColumnFamily, StoreError> {
        db.cf_handle(CF_META)
            .ok_or_else(|| StoreError::Backend(format!("column family {CF_META} is missing")))
    }

    fn edge(&self, mode: IteratorMode<'_>) -> Result<Entry, StoreError> {
        self.with_db(|db| match db.iterator(mode).next() {
            Some(Ok((k, v))) => Ok((k.into_vec(), v.into_vec())),
            Some(Err(e)) => Err(StoreError::Backend(e.into_string())),
            None => Err(StoreError::NotFound),
        })
    }
}

impl OrderedStore for RocksDbStore {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.with_db(|db| {
            db.put(key, value)
                .map_err(|e| StoreError::WriteError(e.into_string()))
        })
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>, StoreError> {
        self.with_db(|db| match db.get(key) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(StoreError::NotFound),
            Err(e) => Err(StoreError::Backend(e.into_string())),
        })
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.with_db(|db| {
            db.delete(key)
                .map_err(|e| StoreError::WriteError(e.into_string()))
        })
    }

    fn first(&self) -> Result<Entry, StoreError> {
        self.edge(IteratorMode::Start)
    }

    fn last(&self) -> Result<Entry, StoreError> {
        self.edge(IteratorMode::End)
    }

    fn previous(&self) -> Result<Entry, StoreError> {
        self.with_db(|db| {
            let mut iter = db.raw_iterator();
            iter.seek_to_last();
            if !iter.valid() {
                iter.status()
                    .map_err(|e| StoreError::Backend(e.into_string()))?;
                return Err(StoreError::EmptyStore);
            }

            iter.prev();
            if !iter.valid() {
                iter.status()
                    .map_err(|e| StoreError::Backend(e.into_string()))?;
                return Err(StoreError::SingleEntry);
            }

            match (iter.key(), iter.value()) {
                (Some(k), Some(v)) => Ok((k.to_vec(), v.to_vec())),
                _ => Err(StoreError::Backend("iterator lost its position".into())),
            }
        })
    }

    fn entries(&self) -> Result<Vec<Entry>, StoreError> {
        self.with_db(|db| {
            db.iterator(IteratorMode::Start)
                .map(|item| {
                    item.map(|(k, v)| (k.into_vec(), v.into_vec()))
                        .map_err(|e| StoreError::Backend(e.into_string()))
                })
                .collect()
        })
    }

    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.with_db(|db| {
            db.put_cf(Self::meta_cf(db)?, key, value)
                .map_err(|e| StoreError::WriteError(e.into_string()))
        })
    }

    fn get_meta(&self, key: &[u8]) -> Result<Vec<u8>, StoreError> {
        self.with_db(|db| match db.get_cf(Self::meta_cf(db)?, key) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(StoreError::NotFound),
            Err(e) => Err(StoreError::Backend(e.into_string())),
        })
    }

    fn close(&self) {
        let mut guard = self.db.write().unwrap_or_else(|e| e.into_inner());
        guard.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (RocksDbStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let store = RocksDbStore::open(dir.path().join("db")).expect("failed to open store");
        (store, dir)
    }

    #[test]
    fn put_get_overwrite_delete() {
        let (store, _dir) = temp_store();
        store.put(b"key", b"one").unwrap();
        store.put(b"key", b"two").unwrap();
        assert_eq!(store.get(b"key").unwrap(), b"two");

        store.delete(b"key").unwrap();
        assert_eq!(store.get(b"key"), Err(StoreError::NotFound));
    }

    #[test]
    fn empty_store_navigation() {
        let (store, _dir) = temp_store();
        assert_eq!(store.first(), Err(StoreError::NotFound));
        assert_eq!(store.last(), Err(StoreError::NotFound));
        assert_eq!(store.previous(), Err(StoreError::EmptyStore));
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn single_entry_has_no_previous() {
        let (store, _dir) = temp_store();
        store.put(&[0x42], b"v").unwrap();
        assert_eq!(store.previous(), Err(StoreError::SingleEntry));
        assert_eq!(store.first().unwrap(), (vec![0x42], b"v".to_vec()));
    }

    #[test]
    fn navigation_is_bytewise() {
        let (store, _dir) = temp_store();
        for key in [[0x90u8; 2], [0x10; 2], [0xA0; 2], [0x00; 2]] {
            store.put(&key, &key[..1]).unwrap();
        }

        assert_eq!(store.first().unwrap().0, vec![0x00, 0x00]);
        assert_eq!(store.last().unwrap().0, vec![0xA0, 0xA0]);
        assert_eq!(store.previous().unwrap(), (vec![0x90, 0x90], vec![0x90]));
        assert_eq!(store.entries().unwrap().len(), 4);
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("db");
        {
            let store = RocksDbStore::open(&path).unwrap();
            store.put(b"persist", b"me").unwrap();
            store.close();
        }

        let store = RocksDbStore::open(&path).unwrap();
        assert_eq!(store.get(b"persist").unwrap(), b"me");
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn metadata_persists_outside_record_keyspace() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("db");
        {
            let store = RocksDbStore::open(&path).unwrap();
            store.put(&[0x01], b"record").unwrap();
            store.put_meta(b"tip", &[0xEE; 32]).unwrap();
        }

        let store = RocksDbStore::open(&path).unwrap();
        assert_eq!(store.get_meta(b"tip").unwrap(), vec![0xEE; 32]);
        assert_eq!(store.get(b"tip"), Err(StoreError::NotFound));
        assert_eq!(store.entries().unwrap(), vec![(vec![0x01], b"record".to_vec())]);
        assert_eq!(store.previous(), Err(StoreError::SingleEntry));
        assert_eq!(store.get_meta(b"other"), Err(StoreError::NotFound));
    }

    #[test]
    fn destroy_removes_data() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("db");
        {
            let store = RocksDbStore::open(&path).unwrap();
            store.put(b"gone", b"soon").unwrap();
        }

        RocksDbStore::destroy(&path).unwrap();
        let store = RocksDbStore::open(&path).unwrap();
        assert_eq!(store.get(b"gone"), Err(StoreError::NotFound));
    }

    #[test]
    fn closed_store_fails_fast() {
        let (store, _dir) = temp_store();
        store.put(b"a", b"1").unwrap();
        store.close();

        assert_eq!(store.get(b"a"), Err(StoreError::ClosedStore));
        assert_eq!(store.put(b"a", b"2"), Err(StoreError::ClosedStore));
        assert_eq!(store.previous(), Err(StoreError::ClosedStore));
        assert_eq!(store.entries(), Err(StoreError::ClosedStore));
        assert_eq!(store.get_meta(b"tip"), Err(StoreError::ClosedStore));
    }

    #[test]
    fn open_fails_on_file_path() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            RocksDbStore::open(&file),
            Err(StoreError::Backend(_))
        ));
    }
}
