//! Node identity persisted as a hex-encoded private key file.

use crate::crypto::key_pair::{PrivateKey, PublicKey};
use crate::types::address::Address;
use ledger_derive::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use zeroize::Zeroizing;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("identity file {0} not found; generate one with `ledger-node <data_dir> --wallet {0}`")]
    NotFound(String),
    #[error("identity file i/o failed: {0}")]
    Io(String),
    #[error("identity file does not hold a valid private key")]
    InvalidKey,
}

impl From<io::Error> for WalletError {
    fn from(e: io::Error) -> Self {
        WalletError::Io(e.to_string())
    }
}

/// A key pair owned by this node.
#[derive(Clone)]
pub struct Wallet {
    private: PrivateKey,
    public: PublicKey,
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.public.address)
            .finish_non_exhaustive()
    }
}

impl Wallet {
    /// Creates a wallet around a fresh random key.
    pub fn generate() -> Self {
        Self::from_private_key(PrivateKey::new())
    }

    pub fn from_private_key(private: PrivateKey) -> Self {
        let public = private.public_key();
        Self { private, public }
    }

    pub fn address(&self) -> Address {
        self.public.address
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Writes the private key as hex, creating parent directories.
    ///
    /// On unix the file is created with mode `0600`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), WalletError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let key = self.private.to_bytes();
        let encoded = Zeroizing::new(hex::encode(key.as_slice()));
        write_owner_only(path, encoded.as_bytes())?;
        Ok(())
    }

    /// Reads a wallet written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(s) => Zeroizing::new(s),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(WalletError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let raw = Zeroizing::new(
            hex::decode(contents.trim()).map_err(|_| WalletError::InvalidKey)?,
        );
        let bytes: &[u8; 32] = raw
            .as_slice()
            .try_into()
            .map_err(|_| WalletError::InvalidKey)?;

        PrivateKey::from_bytes(bytes)
            .map(Self::from_private_key)
            .ok_or(WalletError::InvalidKey)
    }
}

#[cfg(unix)]
fn write_owner_only(path: &Path, data: &[u8]) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_owner_only(path: &Path, data: &[u8]) -> io::Result<()> {
    fs::write(path, data)
}
