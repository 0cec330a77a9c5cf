//! # Hashing Utilities
//!
//! The transaction core needs exactly three digests:
//!
//! - **SHA-256** for transaction ids and as the message digest inside ECDSA.
//! - **double SHA-256** for address checksums.
//! - **HASH160** (`RIPEMD-160(SHA-256(x))`) for public-key hashes, so an
//!   output names its owner without revealing the key until it is spent.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use swarm_protocol::crypto::sha256;
///
/// let hash = sha256(b"swarm");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    sha256_array(data).to_vec()
}

/// Compute the SHA-256 hash and return a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute the double-SHA-256 hash: `SHA-256(SHA-256(data))`.
pub fn double_sha256(data: &[u8]) -> Vec<u8> {
    sha256(&sha256_array(data))
}

/// Compute `RIPEMD-160(SHA-256(data))`, 20 bytes.
pub fn hash160(data: &[u8]) -> Vec<u8> {
    let inner = sha256_array(data);
    Ripemd160::digest(inner).to_vec()
}
