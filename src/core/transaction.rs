//! Value transfers between two addresses.

use crate::types::address::Address;
use crate::types::encoding::Encode;
use crate::types::hash::Hash;
use ledger_derive::BinaryCodec;

/// Domain separator so a transaction digest can never equal a block digest
/// over the same bytes.
const TRANSACTION_DOMAIN: &[u8] = b"TRANSACTION";

/// A transfer record.
///
/// Carries no signature and is never checked for balance or sign of `amount`;
/// it is a payload the chain stores and digests, nothing more.
#[derive(Debug, Clone, PartialEq, Eq, BinaryCodec)]
pub struct Transaction {
    /// Unix timestamp in seconds.
    pub time: i64,
    pub fee: u64,
    pub sender: Address,
    pub recipient: Address,
    /// Signed, unchecked.
    pub amount: i64,
    /// Content digest, computed with this field zeroed.
    pub hash: Hash,
}

impl Transaction {
    /// Creates a transaction and populates its content digest.
    pub fn new(time: i64, fee: u64, sender: Address, recipient: Address, amount: i64) -> Self {
        let mut tx = Self {
            time,
            fee,
            sender,
            recipient,
            amount,
            hash: Hash::zero(),
        };
        tx.hash = tx.compute_hash();
        tx
    }

    /// Digest of the encoding with `hash` zeroed, whatever `hash` currently holds.
    pub fn compute_hash(&self) -> Hash {
        let mut h = Hash::sha3();
        h.update(TRANSACTION_DOMAIN);
        self.time.encode(&mut h);
        self.fee.encode(&mut h);
        self.sender.encode(&mut h);
        self.recipient.encode(&mut h);
        self.amount.encode(&mut h);
        Hash::zero().encode(&mut h);
        h.finalize()
    }

    /// Returns true if the stored digest matches the content.
    pub fn verify_hash(&self) -> bool {
        self.hash == self.compute_hash()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::encoding::Decode;

    fn addr(seed: &[u8]) -> Address {
        Address::from_public_key(seed)
    }

    #[test]
    fn new_populates_hash() {
        let tx = Transaction::new(100, 1, addr(b"a"), addr(b"b"), 50);
        assert!(!tx.hash.is_zero());
        assert!(tx.verify_hash());
    }

    #[test]
    fn hash_is_deterministic() {
        let t1 = Transaction::new(100, 1, addr(b"a"), addr(b"b"), 50);
        let t2 = Transaction::new(100, 1, addr(b"a"), addr(b"b"), 50);
        assert_eq!(t1.hash, t2.hash);
    }

    #[test]
    fn every_field_changes_hash() {
        let base = Transaction::new(100, 1, addr(b"a"), addr(b"b"), 50);
        let variants = [
            Transaction::new(101, 1, addr(b"a"), addr(b"b"), 50),
            Transaction::new(100, 2, addr(b"a"), addr(b"b"), 50),
            Transaction::new(100, 1, addr(b"c"), addr(b"b"), 50),
            Transaction::new(100, 1, addr(b"a"), addr(b"c"), 50),
            Transaction::new(100, 1, addr(b"a"), addr(b"b"), -50),
        ];
        for v in variants {
            assert_ne!(v.hash, base.hash);
        }
    }

    #[test]
    fn tampering_is_detected() {
        let mut tx = Transaction::new(100, 1, addr(b"a"), addr(b"b"), 50);
        tx.amount = i64::MAX;
        assert!(!tx.verify_hash());
    }

    #[test]
    fn negative_amount_survives_encoding() {
        let tx = Transaction::new(-5, u64::MAX, addr(b"a"), addr(b"b"), i64::MIN);
        let decoded = Transaction::from_bytes(&tx.to_bytes()).unwrap();
        assert_eq!(decoded, tx);
    }
}
