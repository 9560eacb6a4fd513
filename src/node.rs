//! Single-node bootstrap: identity, chain, one validator, a few blocks.

use crate::config::NodeConfig;
use crate::core::block::Block;
use crate::core::blockchain::{Blockchain, ChainError};
use crate::core::validator::{Validator, ValidatorError, unix_now};
use crate::core::validator_pool::PoolError;
use crate::crypto::wallet::{Wallet, WalletError};
use crate::storage::ordered_store::StoreError;
use crate::types::hash::Hash;
use crate::utils::log::Logger;
use crate::{info, warn};
use ledger_derive::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("identity: {0}")]
    Wallet(WalletError),
    #[error("{0}")]
    Validator(ValidatorError),
    #[error("chain: {0}")]
    Chain(ChainError),
    #[error("validator registration: {0}")]
    Registration(PoolError),
    #[error("chain failed its sanity check")]
    Insane,
    #[error("tip block {0} was not accepted")]
    Rejected(Hash),
}

impl From<WalletError> for NodeError {
    fn from(e: WalletError) -> Self {
        NodeError::Wallet(e)
    }
}

impl From<ValidatorError> for NodeError {
    fn from(e: ValidatorError) -> Self {
        NodeError::Validator(e)
    }
}

impl From<ChainError> for NodeError {
    fn from(e: ChainError) -> Self {
        NodeError::Chain(e)
    }
}

impl From<PoolError> for NodeError {
    fn from(e: PoolError) -> Self {
        NodeError::Registration(e)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub validator: String,
    pub tip: Hash,
    pub height: u64,
    pub inserted: u64,
}

/// Writes a fresh identity to `config.wallet_path` unless one already exists.
pub fn ensure_identity(config: &NodeConfig, logger: &Logger) -> Result<(), NodeError> {
    if config.wallet_path.exists() {
        return Ok(());
    }

    let wallet = Wallet::generate();
    wallet.save(&config.wallet_path)?;
    info!(
        logger,
        "generated identity {} at {}",
        wallet.address(),
        config.wallet_path.display()
    );
    Ok(())
}

/// Runs the bootstrap sequence, stopping at the first failure.
///
/// Blocks already on disk are reloaded first, so repeated runs extend the
/// same chain.
pub fn run(config: &NodeConfig, logger: &Logger) -> Result<RunReport, NodeError> {
    ensure_identity(config, logger)?;

    if config.reset {
        Blockchain::destroy(config.chain_path(), logger)?;
    }
    let mut chain = Blockchain::open(config.chain_path(), logger.named("chain"))?;
    let validator = Validator::from_wallet_file(&config.wallet_path)?;
    let address = validator.address();
    chain.validators_mut().add_validator(validator)?;
    info!(logger, "registered validator {}", address);

    let existing = chain.reload_index()?;
    if existing > 0 {
        info!(logger, "resuming chain with {} stored blocks", existing);
    }
    if let Some(height) = chain.height() {
        let competing = chain.blocks_at_height(height).len();
        if competing > 1 {
            warn!(
                logger,
                "{} blocks compete at height {}; extending the stored tip",
                competing,
                height
            );
        }
    }

    let mut parent = chain.tip().cloned();
    for _ in 0..config.blocks {
        let block = match &parent {
            Some(p) => Block::child_of(p, unix_now(), Vec::new()).map_err(ChainError::from)?,
            None => Block::genesis(unix_now(), Vec::new()),
        };
        chain.insert(block.clone())?;
        parent = Some(block);
    }

    if !chain.sanity_check() {
        chain.close();
        return Err(NodeError::Insane);
    }

    let (tip, height) = match chain.tip() {
        Some(t) => (t.hash, t.height),
        None => {
            chain.close();
            return Err(NodeError::Chain(ChainError::Store(StoreError::EmptyStore)));
        }
    };

    if !chain.validate_last_block() {
        warn!(logger, "tip {} rejected", tip);
        chain.close();
        return Err(NodeError::Rejected(tip));
    }

    let validator = chain
        .validators()
        .selected()
        .map(str::to_string)
        .unwrap_or(address);
    chain.close();

    info!(logger, "tip {} at height {} accepted by {}", tip, height, validator);
    Ok(RunReport {
        validator,
        tip,
        height,
        inserted: config.blocks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::BlockError;
    use crate::utils::test_utils::utils::test_logger;
    use std::path::Path;

    fn config(dir: &Path, blocks: u64) -> NodeConfig {
        NodeConfig {
            data_dir: dir.to_path_buf(),
            wallet_path: dir.join("wallet.key"),
            blocks,
            quiet: true,
            reset: false,
        }
    }

    #[test]
    fn fresh_run_builds_and_validates_chain() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), 3);

        let report = run(&cfg, &test_logger()).unwrap();
        assert_eq!(report.height, 2);
        assert_eq!(report.inserted, 3);

        let wallet = Wallet::load(&cfg.wallet_path).unwrap();
        assert_eq!(report.validator, wallet.address().to_hex());
    }

    #[test]
    fn second_run_extends_chain_and_keeps_identity() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), 2);

        let first = run(&cfg, &test_logger()).unwrap();
        let second = run(&cfg, &test_logger()).unwrap();
        assert_eq!(first.height, 1);
        assert_eq!(second.height, 3);
        assert_eq!(first.validator, second.validator);
    }

    #[test]
    fn reset_starts_a_new_chain() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), 2);
        run(&cfg, &test_logger()).unwrap();

        cfg.reset = true;
        let report = run(&cfg, &test_logger()).unwrap();
        assert_eq!(report.height, 1);
    }

    #[test]
    fn genesis_only_chain_cannot_pick_validator() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), 1);
        assert!(matches!(
            run(&cfg, &test_logger()),
            Err(NodeError::Rejected(_))
        ));
    }

    #[test]
    fn exhausted_height_fails_instead_of_wrapping() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), 1);
        let top = Block::new(unix_now(), Hash::zero(), u64::MAX, Vec::new());
        {
            let mut chain = Blockchain::open(cfg.chain_path(), test_logger()).unwrap();
            chain.insert(top.clone()).unwrap();
        }

        assert!(matches!(
            run(&cfg, &test_logger()),
            Err(NodeError::Chain(ChainError::Block(BlockError::HeightExhausted(h))))
                if h == top.hash
        ));
    }

    #[test]
    fn corrupt_identity_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), 3);
        std::fs::write(&cfg.wallet_path, "zz").unwrap();

        assert!(matches!(
            run(&cfg, &test_logger()),
            Err(NodeError::Validator(ValidatorError::NoIdentity(
                WalletError::InvalidKey
            )))
        ));
    }
}
