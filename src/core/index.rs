//! Volatile digest → block index with a height view and a tip pointer.

use crate::core::block::Block;
use crate::types::hash::Hash;
use std::collections::{BTreeMap, HashMap};

/// In-memory view of the blocks the chain has inserted.
///
/// Rebuilt only through explicit inserts; it is never loaded from disk
/// implicitly. The tip is the block with the greatest height, the most
/// recent insert winning ties. A rebuild that does not replay the original
/// insert order pins the tip back with [`restore_tip`](Self::restore_tip).
#[derive(Debug, Default)]
pub struct BlockIndex {
    blocks: HashMap<Hash, Block>,
    by_height: BTreeMap<u64, Vec<Hash>>,
    tip: Option<Hash>,
}

impl BlockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes `block`, replacing any entry with the same digest.
    pub fn insert(&mut self, block: Block) {
        let hash = block.hash;
        let height = block.height;

        let takes_tip = self.takes_tip(&block);

        if let Some(old) = self.blocks.insert(hash, block) {
            self.unlink_height(old.height, &hash);
        }
        self.by_height.entry(height).or_default().push(hash);

        if takes_tip {
            self.tip = Some(hash);
        }
    }

    /// Whether inserting `block` would make it the tip.
    pub fn takes_tip(&self, block: &Block) -> bool {
        self.tip().is_none_or(|t| block.height >= t.height)
    }

    /// Makes `hash` the tip if it is indexed at the greatest height.
    pub fn restore_tip(&mut self, hash: &Hash) -> bool {
        let top = self.by_height.keys().next_back().copied();
        match self.blocks.get(hash) {
            Some(block) if Some(block.height) == top => {
                self.tip = Some(*hash);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, hash: &Hash) -> Option<&Block> {
        self.blocks.get(hash)
    }

    /// Removes a block. If it was the tip, the newest block at the greatest
    /// remaining height takes over.
    pub fn remove(&mut self, hash: &Hash) -> Option<Block> {
        let block = self.blocks.remove(hash)?;
        self.unlink_height(block.height, hash);

        if self.tip == Some(*hash) {
            self.tip = self
                .by_height
                .values()
                .next_back()
                .and_then(|hashes| hashes.last().copied());
        }
        Some(block)
    }

    /// Linear scan for a block whose hex digest equals `hash_hex`.
    pub fn locate(&self, hash_hex: &str) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|(hash, _)| hash.to_hex().eq_ignore_ascii_case(hash_hex))
            .map(|(_, block)| block)
    }

    pub fn tip(&self) -> Option<&Block> {
        self.tip.and_then(|hash| self.blocks.get(&hash))
    }

    /// Blocks indexed at `height`, oldest insert first.
    pub fn at_height(&self, height: u64) -> impl Iterator<Item = &Block> {
        self.by_height
            .get(&height)
            .into_iter()
            .flatten()
            .filter_map(|hash| self.blocks.get(hash))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn unlink_height(&mut self, height: u64, hash: &Hash) {
        if let Some(hashes) = self.by_height.get_mut(&height) {
            hashes.retain(|h| h != hash);
            if hashes.is_empty() {
                self.by_height.remove(&height);
            }
        }
    }
}
