//! Registry of validators with seeded pseudo-random selection.

use crate::core::validator::Validator;
use crate::types::hash::Hash;
use ledger_derive::Error;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("no validators registered")]
    NoValidators,
    #[error("validator registry has been torn down")]
    RegistrationFailed,
}

/// Validators keyed by hex address.
///
/// Keys are always `validator.address()`. Iteration order is address order,
/// which is what seeded selection indexes into.
#[derive(Debug)]
pub struct ValidatorPool {
    registry: Option<BTreeMap<String, Validator>>,
    selected: Option<String>,
}

impl Default for ValidatorPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidatorPool {
    pub fn new() -> Self {
        Self {
            registry: Some(BTreeMap::new()),
            selected: None,
        }
    }

    /// Registers `validator`, replacing any validator with the same address.
    pub fn add_validator(&mut self, validator: Validator) -> Result<(), PoolError> {
        let registry = self.registry.as_mut().ok_or(PoolError::RegistrationFailed)?;
        registry.insert(validator.address(), validator);
        Ok(())
    }

    /// Picks a registered address from `seed` and records it as selected.
    ///
    /// The seed is digested, the digest read as a big-endian integer and
    /// reduced modulo the number of validators. The result depends only on
    /// the seed and the set of registered addresses.
    pub fn select_validator(&mut self, seed: &[u8]) -> Result<String, PoolError> {
        let registry = self
            .registry
            .as_ref()
            .filter(|r| !r.is_empty())
            .ok_or(PoolError::NoValidators)?;

        let slot = reduce_be(&Hash::digest(seed), registry.len());
        let address = registry
            .keys()
            .nth(slot)
            .cloned()
            .ok_or(PoolError::NoValidators)?;

        self.selected = Some(address.clone());
        Ok(address)
    }

    pub fn validator(&self, address: &str) -> Option<&Validator> {
        self.registry.as_ref()?.get(address)
    }

    pub fn get_mut(&mut self, address: &str) -> Option<&mut Validator> {
        self.registry.as_mut()?.get_mut(address)
    }

    /// Address chosen by the last successful selection.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn len(&self) -> usize {
        self.registry.as_ref().map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every validator. Later registrations fail.
    pub fn close(&mut self) {
        self.registry = None;
        self.selected = None;
    }
}

/// `digest mod n`, treating the digest as a big-endian unsigned integer.
fn reduce_be(digest: &Hash, n: usize) -> usize {
    let n = n as u128;
    let rem = digest
        .as_slice()
        .iter()
        .fold(0u128, |acc, &b| (acc * 256 + b as u128) % n);
    rem as usize
}
