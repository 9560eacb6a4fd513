//! Shared helpers for unit tests.

#[cfg(test)]
pub mod utils {
    use crate::core::block::Block;
    use crate::core::transaction::Transaction;
    use crate::types::address::Address;
    use crate::types::hash::{HASH_LEN, Hash};
    use crate::utils::log::Logger;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    /// Distinct hash per call.
    pub fn random_hash() -> Hash {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut value = [0u8; HASH_LEN];
        value[..8].copy_from_slice(&n.to_le_bytes());
        Hash(value)
    }

    pub fn test_logger() -> Logger {
        Logger::new("test")
    }

    pub fn transfer(amount: i64) -> Transaction {
        Transaction::new(
            0,
            1,
            Address::from_public_key(random_hash().as_slice()),
            Address::from_public_key(random_hash().as_slice()),
            amount,
        )
    }

    /// `n` parent-linked blocks starting at genesis, one second apart, the
    /// last one stamped `tip_time`. Each block carries one transfer.
    pub fn build_chain(n: usize, tip_time: i64) -> Vec<Block> {
        let mut blocks: Vec<Block> = Vec::with_capacity(n);
        for i in 0..n {
            let time = tip_time - (n - 1 - i) as i64;
            let txs = vec![transfer(i as i64 + 1)];
            let block = match blocks.last() {
                Some(parent) => Block::child_of(parent, time, txs).unwrap(),
                None => Block::genesis(time, txs),
            };
            blocks.push(block);
        }
        blocks
    }
}
