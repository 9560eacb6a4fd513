//! Single-node ledger core.
//!
//! Hash-linked blocks persisted in a byte-ordered store, a seeded validator
//! pool standing in for consensus, and per-block acceptance rules.

pub mod config;
pub mod core;
pub mod crypto;
pub mod node;
pub mod storage;
pub mod types;
pub mod utils;
