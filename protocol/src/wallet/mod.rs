//! # Wallet Module
//!
//! Key material and the identities derived from it.
//!
//! ```text
//! address.rs  — HASH160 owner hashes and Base58Check addresses
//! keystore.rs — KeyStore trait and an in-memory implementation
//! wallets.rs  — Wallet (keypair + address) and the Wallets registry
//! ```
//!
//! Secret keys only ever leave a [`Wallet`] through a [`KeyStore`], which
//! is injected by the caller. Nothing in this module performs file I/O.

pub mod address;
pub mod keystore;
pub mod wallets;

pub use address::{
    address_from_pub_key, address_from_pub_key_hash, hash_pub_key, pub_key_hash_from_address,
    validate_address, AddressError,
};
pub use keystore::{KeyStore, KeyStoreError, MemoryKeyStore};
pub use wallets::{Wallet, Wallets};
