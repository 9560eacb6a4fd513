//! 20-byte participant addresses derived from public keys.

use crate::types::hash::Hash;
use ledger_derive::BinaryCodec;
use std::fmt;

/// Address length in bytes.
pub const ADDRESS_SIZE: usize = 20;

/// Identifies a participant: the last 20 bytes of the SHA3-256 digest of its
/// public key encoding.
///
/// Orders by its bytes, which is the same order as its lowercase hex form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, BinaryCodec)]
pub struct Address(pub [u8; ADDRESS_SIZE]);

impl Address {
    /// Derives an address from a public key encoding.
    pub fn from_public_key(key_bytes: &[u8]) -> Address {
        let full = Hash::digest(key_bytes);
        let mut addr = [0u8; ADDRESS_SIZE];
        addr.copy_from_slice(&full.0[32 - ADDRESS_SIZE..]);
        Address(addr)
    }

    pub fn from_hex(s: &str) -> Option<Address> {
        let bytes = hex::decode(s).ok()?;
        <[u8; ADDRESS_SIZE]>::try_from(bytes.as_slice())
            .ok()
            .map(Address)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
