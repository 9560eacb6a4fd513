//! Node identities: secp256k1 key pairs and their on-disk wallet file.

pub mod key_pair;
pub mod wallet;
