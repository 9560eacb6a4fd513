//! Ledger core.
//!
//! - `Block` and `Transaction`: the hash-linked records
//! - `BlockIndex`: volatile digest → block view with a tip pointer
//! - `Validator` and `ValidatorPool`: acceptance rules and seeded selection
//! - `Blockchain`: ties the store, the index and the pool together

pub mod block;
pub mod blockchain;
pub mod index;
pub mod transaction;
pub mod validator;
pub mod validator_pool;
