//! Per-block acceptance rules applied by a single validator.
//!
//! A [`Validator`] accepts a block when:
//! - its timestamp is non-negative and at most [`MAX_FUTURE_DRIFT_SECS`]
//!   ahead of the local clock
//! - it does not fork a height the validator has already accepted with a
//!   different block
//!
//! Accepted blocks are appended to the validator's history, which is never
//! pruned. Transactions are not inspected.

use crate::core::block::Block;
use crate::crypto::wallet::{Wallet, WalletError};
use crate::types::hash::Hash;
use ledger_derive::Error;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// How far ahead of the local clock a block timestamp may be, in seconds.
pub const MAX_FUTURE_DRIFT_SECS: i64 = 600;

/// Reasons a validator rejects a block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockValidatorError {
    #[error("block timestamp {0} is negative")]
    NegativeTime(i64),

    #[error("block timestamp {time} is past the acceptance limit {limit}")]
    FromTheFuture { time: i64, limit: i64 },

    #[error("height {height} already accepted with block {existing}")]
    ForkAtHeight { height: u64, existing: Hash },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidatorError {
    #[error("validator identity unavailable: {0}")]
    NoIdentity(WalletError),
}

/// Current unix time in seconds.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// A participant eligible for selection, with the blocks it has accepted.
#[derive(Debug, Clone)]
pub struct Validator {
    identity: Wallet,
    validated_blocks: Vec<Block>,
}

impl Validator {
    pub fn new(identity: Wallet) -> Self {
        Self {
            identity,
            validated_blocks: Vec::new(),
        }
    }

    /// Builds a validator from the identity persisted at `path`.
    pub fn from_wallet_file(path: impl AsRef<Path>) -> Result<Self, ValidatorError> {
        Wallet::load(path)
            .map(Self::new)
            .map_err(ValidatorError::NoIdentity)
    }

    /// Hex form of the identity's address; the validator's registry key.
    pub fn address(&self) -> String {
        self.identity.address().to_hex()
    }

    pub fn identity(&self) -> &Wallet {
        &self.identity
    }

    /// Blocks accepted so far, in acceptance order.
    pub fn validated_blocks(&self) -> &[Block] {
        &self.validated_blocks
    }

    /// Applies the acceptance rules against the clock value `now`.
    pub fn try_validate_block_at(&mut self, block: &Block, now: i64) -> Result<(), BlockValidatorError> {
        if block.time < 0 {
            return Err(BlockValidatorError::NegativeTime(block.time));
        }

        let limit = now.saturating_add(MAX_FUTURE_DRIFT_SECS);
        if block.time > limit {
            return Err(BlockValidatorError::FromTheFuture {
                time: block.time,
                limit,
            });
        }

        if let Some(existing) = self
            .validated_blocks
            .iter()
            .find(|b| b.height == block.height && b.hash != block.hash)
        {
            return Err(BlockValidatorError::ForkAtHeight {
                height: block.height,
                existing: existing.hash,
            });
        }

        self.validated_blocks.push(block.clone());
        Ok(())
    }

    pub fn try_validate_block(&mut self, block: &Block) -> Result<(), BlockValidatorError> {
        self.try_validate_block_at(block, unix_now())
    }

    /// Returns `true` and records the block if it is acceptable.
    pub fn validate_block(&mut self, block: &Block) -> bool {
        self.try_validate_block(block).is_ok()
    }
}
