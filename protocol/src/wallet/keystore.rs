//! Key persistence behind a trait.
//!
//! The wallet layer never touches the filesystem. It is handed a
//! [`KeyStore`] and calls `save`/`load` on it; whether the keys end up in
//! memory, in sled ([`crate::storage::SledKeyStore`]) or in an HSM is the
//! caller's decision.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use thiserror::Error;

use crate::crypto::keys::KeyError;

/// Errors returned by key store implementations.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("stored key for {address} is corrupt: {source}")]
    Corrupt {
        address: String,
        #[source]
        source: KeyError,
    },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persistence contract for wallet secret keys, keyed by address.
///
/// Implementations store the 32-byte secret scalar only; the public key
/// and address are re-derived on load.
pub trait KeyStore: Send + Sync {
    /// Persist the secret key for `address`, replacing any previous entry.
    fn save(&self, address: &str, secret_key: &[u8; 32]) -> Result<(), KeyStoreError>;

    /// Load the secret key for `address`, if one was saved.
    fn load(&self, address: &str) -> Result<Option<[u8; 32]>, KeyStoreError>;

    /// All addresses with a stored key, in ascending order.
    fn addresses(&self) -> Result<Vec<String>, KeyStoreError>;
}

/// In-memory [`KeyStore`]. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    keys: RwLock<BTreeMap<String, [u8; 32]>>,
}

impl MemoryKeyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    /// Returns `true` if nothing has been saved.
    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }
}

impl KeyStore for MemoryKeyStore {
    fn save(&self, address: &str, secret_key: &[u8; 32]) -> Result<(), KeyStoreError> {
        self.keys.write().insert(address.to_string(), *secret_key);
        Ok(())
    }

    fn load(&self, address: &str) -> Result<Option<[u8; 32]>, KeyStoreError> {
        Ok(self.keys.read().get(address).copied())
    }

    fn addresses(&self) -> Result<Vec<String>, KeyStoreError> {
        Ok(self.keys.read().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let store = MemoryKeyStore::new();
        store.save("addr1", &[9u8; 32]).unwrap();
        assert_eq!(store.load("addr1").unwrap(), Some([9u8; 32]));
        assert_eq!(store.load("missing").unwrap(), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn addresses_are_sorted() {
        let store = MemoryKeyStore::new();
        store.save("b", &[1u8; 32]).unwrap();
        store.save("a", &[2u8; 32]).unwrap();
        assert_eq!(store.addresses().unwrap(), vec!["a", "b"]);
    }
}
