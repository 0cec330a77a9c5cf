//! Wallets: a keypair plus the address derived from it, and a registry
//! of wallets backed by an injected [`KeyStore`].

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::address::{address_from_pub_key, hash_pub_key};
use super::keystore::{KeyStore, KeyStoreError};
use crate::crypto::keys::Keypair;

/// A single wallet identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    keypair: Keypair,
    address: String,
}

impl Wallet {
    /// Generates a wallet with a fresh keypair.
    pub fn generate() -> Self {
        Self::from_keypair(Keypair::generate())
    }

    /// Wraps an existing keypair.
    pub fn from_keypair(keypair: Keypair) -> Self {
        let address = address_from_pub_key(&keypair.public_key());
        Self { keypair, address }
    }

    /// The wallet's Base58 address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The raw `X || Y` public key.
    pub fn public_key(&self) -> Vec<u8> {
        self.keypair.public_key()
    }

    /// HASH160 of the public key; what outputs locked to this wallet carry.
    pub fn pub_key_hash(&self) -> Vec<u8> {
        hash_pub_key(&self.keypair.public_key())
    }

    /// The signing keypair.
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

/// The set of wallets a node knows about.
pub struct Wallets {
    wallets: BTreeMap<String, Wallet>,
    store: Arc<dyn KeyStore>,
}

impl std::fmt::Debug for Wallets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallets")
            .field("addresses", &self.wallets.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Wallets {
    /// Opens the registry and loads every key already in `store`.
    pub fn load(store: Arc<dyn KeyStore>) -> Result<Self, KeyStoreError> {
        let mut wallets = BTreeMap::new();
        for address in store.addresses()? {
            let Some(secret) = store.load(&address)? else {
                continue;
            };
            let keypair =
                Keypair::from_secret_bytes(&secret).map_err(|source| KeyStoreError::Corrupt {
                    address: address.clone(),
                    source,
                })?;
            wallets.insert(address, Wallet::from_keypair(keypair));
        }
        debug!(count = wallets.len(), "wallets loaded from key store");
        Ok(Self { wallets, store })
    }

    /// Generates a new wallet, persists its key and returns its address.
    pub fn create_wallet(&mut self) -> Result<String, KeyStoreError> {
        let wallet = Wallet::generate();
        let address = wallet.address().to_string();
        self.store
            .save(&address, &wallet.keypair().secret_key_bytes())?;
        self.wallets.insert(address.clone(), wallet);
        info!(%address, "wallet created");
        Ok(address)
    }

    /// Addresses of all known wallets, sorted.
    pub fn addresses(&self) -> Vec<String> {
        self.wallets.keys().cloned().collect()
    }

    /// Looks up a wallet by address.
    pub fn get(&self, address: &str) -> Option<&Wallet> {
        self.wallets.get(address)
    }

    /// Number of wallets held.
    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    /// Returns `true` if no wallets are held.
    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}
