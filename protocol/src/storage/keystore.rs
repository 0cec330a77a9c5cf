//! sled-backed [`KeyStore`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::Tree;
use tracing::debug;

use super::db::{DbError, SwarmDB};
use crate::wallet::keystore::{KeyStore, KeyStoreError};

const KEYS_TREE: &str = "keys";

/// What is persisted per address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Zero-padded 32-byte secret scalar.
    pub secret_key: [u8; 32],
    pub created_at: DateTime<Utc>,
}

/// Stores wallet keys in the `keys` tree of a [`SwarmDB`].
#[derive(Debug, Clone)]
pub struct SledKeyStore {
    db: SwarmDB,
    keys: Tree,
}

impl SledKeyStore {
    pub fn new(db: SwarmDB) -> Result<Self, DbError> {
        let keys = db.open_tree(KEYS_TREE)?;
        Ok(Self { db, keys })
    }

    /// Full record for `address`, including its creation time.
    pub fn record(&self, address: &str) -> Result<Option<KeyRecord>, KeyStoreError> {
        let Some(bytes) = self.keys.get(address.as_bytes()).map_err(backend)? else {
            return Ok(None);
        };
        let record = bincode::deserialize(&bytes)
            .map_err(|e| KeyStoreError::Serialization(e.to_string()))?;
        Ok(Some(record))
    }
}

fn backend(err: impl std::fmt::Display) -> KeyStoreError {
    KeyStoreError::Backend(err.to_string())
}

impl KeyStore for SledKeyStore {
    fn save(&self, address: &str, secret_key: &[u8; 32]) -> Result<(), KeyStoreError> {
        let record = KeyRecord {
            secret_key: *secret_key,
            created_at: Utc::now(),
        };
        let bytes =
            bincode::serialize(&record).map_err(|e| KeyStoreError::Serialization(e.to_string()))?;
        self.keys.insert(address.as_bytes(), bytes).map_err(backend)?;
        self.db.flush().map_err(backend)?;
        debug!(%address, "key persisted");
        Ok(())
    }

    fn load(&self, address: &str) -> Result<Option<[u8; 32]>, KeyStoreError> {
        Ok(self.record(address)?.map(|record| record.secret_key))
    }

    fn addresses(&self) -> Result<Vec<String>, KeyStoreError> {
        self.keys
            .iter()
            .keys()
            .map(|key| {
                let key = key.map_err(backend)?;
                String::from_utf8(key.to_vec())
                    .map_err(|e| KeyStoreError::Serialization(e.to_string()))
            })
            .collect()
    }
}
