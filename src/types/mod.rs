//! Primitive ledger types.
//!
//! - `Hash`: 32-byte SHA3-256 digest, also the block storage key
//! - `Address`: 20-byte participant identifier
//! - `Encode`/`Decode`: the deterministic binary format shared by storage
//!   and hashing
//! - `MerkleTree`: transaction-list digests

pub mod address;
pub mod encoding;
pub mod hash;
pub mod merkle_tree;
