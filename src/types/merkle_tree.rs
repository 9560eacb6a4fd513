//! Merkle roots over transaction hashes, used as a block's `tx_digest`.
//!
//! - An empty list yields [`EMPTY_TX_DIGEST`], the fixed "no transactions"
//!   sentinel.
//! - Odd levels duplicate their last node before pairing.

use crate::core::transaction::Transaction;
use crate::types::hash::Hash;
use std::sync::LazyLock;

const MERKLE_NODE_SEPARATION: &[u8] = b"MERKLE_TX_NODE";

/// Digest carried by blocks without transactions.
pub static EMPTY_TX_DIGEST: LazyLock<Hash> =
    LazyLock::new(|| Hash::digest(b"000000000000000000000000000000"));

pub struct MerkleTree;

impl MerkleTree {
    fn hash_pair(left: Hash, right: Hash) -> Hash {
        Hash::sha3()
            .chain(MERKLE_NODE_SEPARATION)
            .chain(left.as_slice())
            .chain(right.as_slice())
            .finalize()
    }

    /// Reduces `nodes` in place to a single root.
    pub fn from_raw(mut nodes: Vec<Hash>) -> Hash {
        if nodes.is_empty() {
            return *EMPTY_TX_DIGEST;
        }

        let mut len = nodes.len();
        while len > 1 {
            let mut write = 0;
            let mut read = 0;
            while read < len {
                let left = nodes[read];
                let right = if read + 1 < len { nodes[read + 1] } else { left };
                nodes[write] = Self::hash_pair(left, right);
                write += 1;
                read += 2;
            }
            len = write;
        }

        nodes[0]
    }

    /// Root over the transactions' own hashes, in list order.
    pub fn from_transactions(txs: &[Transaction]) -> Hash {
        Self::from_raw(txs.iter().map(|tx| tx.hash).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::address::Address;

    #[test]
    fn empty_returns_sentinel() {
        assert_eq!(MerkleTree::from_raw(Vec::new()), *EMPTY_TX_DIGEST);
        assert_eq!(MerkleTree::from_transactions(&[]), *EMPTY_TX_DIGEST);
        assert!(!EMPTY_TX_DIGEST.is_zero());
    }

    #[test]
    fn single_leaf_returns_leaf() {
        let leaf = Hash::digest(b"leaf");
        assert_eq!(MerkleTree::from_raw(vec![leaf]), leaf);
    }

    #[test]
    fn odd_level_duplicates_last_node() {
        let a = Hash::digest(b"a");
        let b = Hash::digest(b"b");
        let c = Hash::digest(b"c");

        let expected = MerkleTree::hash_pair(
            MerkleTree::hash_pair(a, b),
            MerkleTree::hash_pair(c, c),
        );
        assert_eq!(MerkleTree::from_raw(vec![a, b, c]), expected);
    }

    #[test]
    fn order_of_transactions_matters() {
        let sender = Address::from_public_key(b"sender");
        let recipient = Address::from_public_key(b"recipient");
        let t1 = Transaction::new(1, 0, sender, recipient, 5);
        let t2 = Transaction::new(2, 0, sender, recipient, 6);

        let forward = MerkleTree::from_transactions(&[t1.clone(), t2.clone()]);
        let backward = MerkleTree::from_transactions(&[t2, t1]);
        assert_ne!(forward, backward);
    }
}
