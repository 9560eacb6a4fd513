//! Hash-linked blocks.

use crate::core::transaction::Transaction;
use crate::types::encoding::{Decode, DecodeError, Encode, EncodeSink};
use crate::types::hash::Hash;
use crate::types::merkle_tree::MerkleTree;
use ledger_derive::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("block {0} is at the maximum height")]
    HeightExhausted(Hash),
}

/// A block of transactions linked to its parent by digest.
///
/// The block digest covers every field except `hash` itself: it is computed
/// over the full encoding with `hash` written as zeros. `tx_digest` and
/// `height` are filled in before that, so changing either changes the digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Unix timestamp in seconds.
    pub time: i64,
    pub hash: Hash,
    /// Zero for genesis.
    pub parent_hash: Hash,
    /// Reserved; always zero for locally produced blocks.
    pub uncle_hash: Hash,
    pub transactions: Vec<Transaction>,
    /// Merkle root of the transaction hashes, or the empty-set sentinel.
    pub tx_digest: Hash,
    /// Distance from genesis. Keys the chain's height index and the
    /// validators' same-height fork check.
    pub height: u64,
}

impl Block {
    /// Creates a sealed block: `tx_digest` and `hash` are computed here.
    pub fn new(time: i64, parent_hash: Hash, height: u64, transactions: Vec<Transaction>) -> Self {
        let mut block = Self {
            time,
            hash: Hash::zero(),
            parent_hash,
            uncle_hash: Hash::zero(),
            tx_digest: MerkleTree::from_transactions(&transactions),
            transactions,
            height,
        };
        block.hash = block.compute_hash();
        block
    }

    /// Creates a block with no parent at height 0.
    pub fn genesis(time: i64, transactions: Vec<Transaction>) -> Self {
        Self::new(time, Hash::zero(), 0, transactions)
    }

    /// Creates the next block on top of `parent`.
    pub fn child_of(
        parent: &Block,
        time: i64,
        transactions: Vec<Transaction>,
    ) -> Result<Self, BlockError> {
        let height = parent
            .height
            .checked_add(1)
            .ok_or(BlockError::HeightExhausted(parent.hash))?;
        Ok(Self::new(time, parent.hash, height, transactions))
    }

    pub fn is_genesis(&self) -> bool {
        self.parent_hash.is_zero()
    }

    /// Digest of the block encoded with a zero `hash` field.
    pub fn compute_hash(&self) -> Hash {
        let mut h = Hash::sha3();
        self.encode_with_hash(&Hash::zero(), &mut h);
        h.finalize()
    }

    /// Checks the stored digests against the block content.
    pub fn verify_integrity(&self) -> bool {
        self.hash == self.compute_hash()
            && self.tx_digest == MerkleTree::from_transactions(&self.transactions)
            && self.transactions.iter().all(Transaction::verify_hash)
    }

    fn encode_with_hash<S: EncodeSink>(&self, hash: &Hash, out: &mut S) {
        self.time.encode(out);
        hash.encode(out);
        self.parent_hash.encode(out);
        self.uncle_hash.encode(out);
        self.transactions.encode(out);
        self.tx_digest.encode(out);
        self.height.encode(out);
    }
}

impl Encode for Block {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.encode_with_hash(&self.hash, out);
    }
}

impl Decode for Block {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            time: i64::decode(input)?,
            hash: Hash::decode(input)?,
            parent_hash: Hash::decode(input)?,
            uncle_hash: Hash::decode(input)?,
            transactions: Vec::<Transaction>::decode(input)?,
            tx_digest: Hash::decode(input)?,
            height: u64::decode(input)?,
        })
    }
}
