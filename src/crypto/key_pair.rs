//! secp256k1 key pairs (BIP-340 Schnorr keys).

use crate::types::address::Address;
use k256::schnorr::{SigningKey, VerifyingKey};
use rand_core::OsRng;
use zeroize::Zeroizing;

/// Private half of an identity.
///
/// Generated from OS entropy. Only ever leaves memory through
/// [`Wallet::save`](crate::crypto::wallet::Wallet::save).
#[derive(Clone)]
pub struct PrivateKey {
    key: SigningKey,
}

/// Public half of an identity together with its derived address.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub key: VerifyingKey,
    pub address: Address,
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PrivateKey {
    /// Generates a new random private key using OS-provided entropy.
    pub fn new() -> Self {
        let mut rng = OsRng;
        Self {
            key: SigningKey::random(&mut rng),
        }
    }

    /// Returns `None` if the bytes are not a valid secp256k1 scalar.
    pub fn from_bytes(bytes: &[u8; 32]) -> Option<Self> {
        SigningKey::from_bytes(bytes).ok().map(|key| Self { key })
    }

    /// Raw scalar bytes, wiped on drop.
    pub(crate) fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.key.to_bytes().into())
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::new(self)
    }
}

impl PublicKey {
    /// Address derivation: SHA3-256(verifying_key_bytes)[12..32]
    pub(crate) fn new(private: &PrivateKey) -> Self {
        let vk = *private.key.verifying_key();
        PublicKey {
            key: vk,
            address: Address::from_public_key(&vk.to_bytes()),
        }
    }
}
