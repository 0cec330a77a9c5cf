//! # Addresses
//!
//! An address is the human-facing name of a public key:
//!
//! ```text
//! public_key (64 bytes, X || Y)
//!     -> HASH160(public_key)                    -> 20 bytes
//!     -> version (1) || hash (20)               -> payload
//!     -> payload || double_sha256(payload)[..4] -> 25 bytes
//!     -> Base58                                 -> 1A2b3C...
//! ```
//!
//! The address is a pure function of the public key. The checksum catches
//! typos before funds are locked to a hash nobody owns.

use thiserror::Error;

use crate::config::{ADDRESS_CHECKSUM_LEN, ADDRESS_VERSION, PUBLIC_KEY_HASH_LEN};
use crate::crypto::hash::{double_sha256, hash160};

/// Errors produced while decoding an address.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is not valid base58: {0}")]
    Base58(String),

    #[error("invalid address length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("unsupported address version 0x{0:02x}")]
    UnknownVersion(u8),

    #[error("address checksum mismatch")]
    ChecksumMismatch,
}

/// Hash a public key into the 20-byte owner hash used by outputs.
pub fn hash_pub_key(public_key: &[u8]) -> Vec<u8> {
    hash160(public_key)
}

/// First four bytes of `double_sha256(payload)`.
pub fn checksum(payload: &[u8]) -> Vec<u8> {
    double_sha256(payload)[..ADDRESS_CHECKSUM_LEN].to_vec()
}

/// Encode a public-key hash as a versioned, checksummed Base58 address.
pub fn address_from_pub_key_hash(pub_key_hash: &[u8]) -> String {
    let mut payload = Vec::with_capacity(1 + pub_key_hash.len() + ADDRESS_CHECKSUM_LEN);
    payload.push(ADDRESS_VERSION);
    payload.extend_from_slice(pub_key_hash);
    let check = checksum(&payload);
    payload.extend_from_slice(&check);
    bs58::encode(payload).into_string()
}

/// Derive the address for a raw public key.
pub fn address_from_pub_key(public_key: &[u8]) -> String {
    address_from_pub_key_hash(&hash_pub_key(public_key))
}

/// Decode an address back into the public-key hash it names.
///
/// Validates the Base58 alphabet, the total length, the version byte and
/// the checksum, in that order.
pub fn pub_key_hash_from_address(address: &str) -> Result<Vec<u8>, AddressError> {
    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|e| AddressError::Base58(e.to_string()))?;

    let expected = 1 + PUBLIC_KEY_HASH_LEN + ADDRESS_CHECKSUM_LEN;
    if decoded.len() != expected {
        return Err(AddressError::InvalidLength {
            expected,
            got: decoded.len(),
        });
    }

    let (payload, actual_checksum) = decoded.split_at(decoded.len() - ADDRESS_CHECKSUM_LEN);
    if payload[0] != ADDRESS_VERSION {
        return Err(AddressError::UnknownVersion(payload[0]));
    }
    if checksum(payload) != actual_checksum {
        return Err(AddressError::ChecksumMismatch);
    }

    Ok(payload[1..].to_vec())
}

/// Returns `true` if `address` decodes cleanly.
pub fn validate_address(address: &str) -> bool {
    pub_key_hash_from_address(address).is_ok()
}
