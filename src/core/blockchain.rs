//! Chain manager: persists blocks, tracks chain order, checks integrity and
//! drives validator selection.
//!
//! Two notions of order coexist here:
//! - store order: `first`, `last` and `previous` return whatever the
//!   [`OrderedStore`] yields in key byte order
//! - chain order: `tip`, `block_before_tip`, `sanity_check`,
//!   `pick_validator` and `validate_last_block` follow the height index and
//!   parent links

use crate::core::block::{Block, BlockError};
use crate::core::index::BlockIndex;
use crate::core::validator_pool::ValidatorPool;
use crate::storage::memory_store::MemoryStore;
use crate::storage::ordered_store::{OrderedStore, StoreError, meta_keys};
use crate::storage::rocksdb_store::RocksDbStore;
use crate::types::encoding::{Decode, DecodeError, Encode};
use crate::types::hash::Hash;
use crate::utils::log::Logger;
use crate::{error, info, warn};
use ledger_derive::Error;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("database unavailable: {0}")]
    DatabaseUnavailable(StoreError),
    #[error("block insert failed: {0}")]
    InsertFailed(String),
    #[error("{0}")]
    Store(StoreError),
    #[error("stored block is corrupt: {0}")]
    Decode(DecodeError),
    #[error("validator selection failed: {0}")]
    ValidatorSelectFailed(String),
    #[error("{0}")]
    Block(BlockError),
}

impl From<StoreError> for ChainError {
    fn from(e: StoreError) -> Self {
        ChainError::Store(e)
    }
}

impl From<BlockError> for ChainError {
    fn from(e: BlockError) -> Self {
        ChainError::Block(e)
    }
}

impl From<DecodeError> for ChainError {
    fn from(e: DecodeError) -> Self {
        ChainError::Decode(e)
    }
}

/// A single-node chain over an ordered store.
///
/// The index starts empty on open; blocks already on disk are only visible
/// through store navigation until [`reload_index`](Self::reload_index) runs.
pub struct Blockchain<S: OrderedStore = RocksDbStore> {
    store: S,
    last_block: Option<Block>,
    /// `None` once the chain is closed.
    index: Option<BlockIndex>,
    sane: bool,
    validators: ValidatorPool,
    logger: Logger,
}

impl Blockchain<RocksDbStore> {
    /// Opens or creates a RocksDB-backed chain at `path`.
    pub fn open(path: impl AsRef<Path>, logger: Logger) -> Result<Self, ChainError> {
        let path = path.as_ref();
        let store = RocksDbStore::open(path).map_err(ChainError::DatabaseUnavailable)?;
        info!(logger, "opened chain database at {}", path.display());
        Ok(Self::with_store(store, logger))
    }

    /// Deletes the chain database at `path`, if any.
    pub fn destroy(path: impl AsRef<Path>, logger: &Logger) -> Result<(), ChainError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(());
        }
        RocksDbStore::destroy(path).map_err(ChainError::DatabaseUnavailable)?;
        warn!(logger, "deleted chain database at {}", path.display());
        Ok(())
    }
}

impl Blockchain<MemoryStore> {
    /// Chain over a volatile store.
    pub fn in_memory(logger: Logger) -> Self {
        Self::with_store(MemoryStore::new(), logger)
    }
}

impl<S: OrderedStore> Blockchain<S> {
    pub fn with_store(store: S, logger: Logger) -> Self {
        Self {
            store,
            last_block: None,
            index: Some(BlockIndex::new()),
            sane: false,
            validators: ValidatorPool::new(),
            logger,
        }
    }

    /// Persists `block` under its digest and indexes it. A block that takes
    /// the tip also has its digest saved as the stored tip.
    ///
    /// There is no duplicate guard: inserting the same digest again
    /// overwrites both the record and the index entry. The index is left
    /// untouched when a store write fails.
    pub fn insert(&mut self, block: Block) -> Result<(), ChainError> {
        let Some(index) = self.index.as_mut() else {
            return Err(ChainError::InsertFailed("block index has been torn down".into()));
        };

        self.store
            .put(block.hash.as_slice(), &block.to_bytes())
            .map_err(|e| ChainError::InsertFailed(e.to_string()))?;
        if index.takes_tip(&block) {
            self.store
                .put_meta(meta_keys::TIP, block.hash.as_slice())
                .map_err(|e| ChainError::InsertFailed(e.to_string()))?;
        }

        info!(
            self.logger,
            "inserted block height={} hash={} transactions={}",
            block.height,
            block.hash,
            block.transactions.len()
        );
        index.insert(block);
        Ok(())
    }

    fn decode_entry(value: &[u8]) -> Result<Block, ChainError> {
        Ok(Block::from_bytes(value)?)
    }

    /// Block stored under the smallest key.
    pub fn first(&self) -> Result<Block, ChainError> {
        let (_, value) = self.store.first()?;
        Self::decode_entry(&value)
    }

    /// Block stored under the largest key. Recorded as the last block read.
    pub fn last(&mut self) -> Result<Block, ChainError> {
        let (_, value) = self.store.last()?;
        let block = Self::decode_entry(&value)?;
        self.last_block = Some(block.clone());
        Ok(block)
    }

    /// Block stored immediately before the largest key. Recorded as the last
    /// block read.
    pub fn previous(&mut self) -> Result<Block, ChainError> {
        let (_, value) = self.store.previous()?;
        let block = Self::decode_entry(&value)?;
        self.last_block = Some(block.clone());
        Ok(block)
    }

    /// Block most recently returned by [`last`](Self::last) or
    /// [`previous`](Self::previous).
    pub fn last_block(&self) -> Option<&Block> {
        self.last_block.as_ref()
    }

    /// Looks up an indexed block by its hex digest.
    pub fn locate_block(&self, hash_hex: &str) -> Option<&Block> {
        self.index.as_ref()?.locate(hash_hex)
    }

    /// Reads a block from the store by digest, whether indexed or not.
    pub fn get_block(&self, hash: &Hash) -> Result<Block, ChainError> {
        let value = self.store.get(hash.as_slice())?;
        Self::decode_entry(&value)
    }

    /// Indexed block with the greatest height.
    pub fn tip(&self) -> Option<&Block> {
        self.index.as_ref()?.tip()
    }

    pub fn height(&self) -> Option<u64> {
        self.tip().map(|b| b.height)
    }

    /// Indexed blocks at `height`, oldest insert first. More than one means
    /// the chain forked there.
    pub fn blocks_at_height(&self, height: u64) -> Vec<&Block> {
        self.index
            .as_ref()
            .map(|i| i.at_height(height).collect())
            .unwrap_or_default()
    }

    /// Parent of the tip, from the index or else from the store.
    pub fn block_before_tip(&self) -> Result<Block, ChainError> {
        let tip = self.tip().ok_or(StoreError::EmptyStore)?;
        if tip.is_genesis() {
            return Err(StoreError::SingleEntry.into());
        }

        match self.index.as_ref().and_then(|i| i.get(&tip.parent_hash)) {
            Some(parent) => Ok(parent.clone()),
            None => self.get_block(&tip.parent_hash),
        }
    }

    /// Walks parent links from the tip through the index.
    ///
    /// Holds only if every ancestor is indexed under a matching digest and
    /// the walk ends at the zero hash. The result is kept in
    /// [`is_sane`](Self::is_sane).
    pub fn sanity_check(&mut self) -> bool {
        self.sane = self.walk_from_tip();
        if !self.sane {
            warn!(self.logger, "sanity check failed");
        }
        self.sane
    }

    fn walk_from_tip(&self) -> bool {
        let Some(index) = self.index.as_ref() else {
            return false;
        };
        let Some(mut current) = index.tip() else {
            return false;
        };

        // Each step consumes one indexed block, so a walk longer than the
        // index can only be a cycle.
        for _ in 0..index.len() {
            if current.parent_hash.is_zero() {
                return true;
            }
            match index.get(&current.parent_hash) {
                Some(parent) if parent.hash == current.parent_hash => current = parent,
                _ => return false,
            }
        }
        false
    }

    /// Result of the last [`sanity_check`](Self::sanity_check).
    pub fn is_sane(&self) -> bool {
        self.sane
    }

    /// Selects a validator seeded by the digest of the block before the tip.
    ///
    /// Returns the selected validator's address.
    pub fn pick_validator(&mut self) -> Result<String, ChainError> {
        let tip = self.tip().ok_or(StoreError::EmptyStore)?;
        if tip.is_genesis() {
            return Err(StoreError::SingleEntry.into());
        }
        let seed = tip.parent_hash;

        let address = self
            .validators
            .select_validator(seed.as_slice())
            .map_err(|e| ChainError::ValidatorSelectFailed(e.to_string()))?;
        if self.validators.validator(&address).is_none() {
            return Err(ChainError::ValidatorSelectFailed(format!(
                "selected address {address} is not registered"
            )));
        }

        info!(self.logger, "selected validator {}", address);
        Ok(address)
    }

    /// Has the selected validator judge the tip block.
    ///
    /// Every failure, including selection failures, is logged and reported
    /// as `false`.
    pub fn validate_last_block(&mut self) -> bool {
        let address = match self.pick_validator() {
            Ok(address) => address,
            Err(e) => {
                error!(self.logger, "cannot pick a validator: {}", e);
                return false;
            }
        };

        let Some(tip) = self.tip().cloned() else {
            error!(self.logger, "no block to validate");
            return false;
        };
        let Some(validator) = self.validators.get_mut(&address) else {
            error!(self.logger, "validator {} vanished from the pool", address);
            return false;
        };

        match validator.try_validate_block(&tip) {
            Ok(()) => {
                info!(
                    self.logger,
                    "validator {} accepted block height={} hash={}", address, tip.height, tip.hash
                );
                true
            }
            Err(e) => {
                warn!(
                    self.logger,
                    "validator {} rejected block {}: {}", address, tip.hash, e
                );
                false
            }
        }
    }

    /// Drops a block from the index. The stored record stays.
    pub fn evict(&mut self, hash: &Hash) -> Option<Block> {
        self.index.as_mut()?.remove(hash)
    }

    /// Rebuilds the index from every stored record and reinstates the stored
    /// tip. Returns the number of blocks indexed.
    ///
    /// Records come back in key order, so without a stored tip a tie at the
    /// greatest height goes to the largest digest.
    pub fn reload_index(&mut self) -> Result<usize, ChainError> {
        let mut index = BlockIndex::new();
        for (_, value) in self.store.entries()? {
            index.insert(Self::decode_entry(&value)?);
        }

        match self.store.get_meta(meta_keys::TIP) {
            Ok(raw) => {
                let tip = Hash::from_bytes(&raw)?;
                if !index.restore_tip(&tip) {
                    warn!(self.logger, "stored tip {} is not at the top of the index", tip);
                }
            }
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let count = index.len();
        self.index = Some(index);
        info!(self.logger, "reloaded {} blocks into the index", count);
        Ok(count)
    }

    pub fn validators(&self) -> &ValidatorPool {
        &self.validators
    }

    pub fn validators_mut(&mut self) -> &mut ValidatorPool {
        &mut self.validators
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tears down the index, the validator registry and the store.
    pub fn close(&mut self) {
        self.index = None;
        self.last_block = None;
        self.validators.close();
        self.store.close();
        info!(self.logger, "chain closed");
    }
}
