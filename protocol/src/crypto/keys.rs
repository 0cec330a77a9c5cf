//! # Key Management
//!
//! secp256k1 keypair generation, serialization and raw ECDSA operations.
//!
//! Every wallet owns exactly one [`Keypair`]. The public half travels in
//! transaction inputs as the 64-byte `X || Y` coordinate pair; the secret
//! half never leaves the wallet except through an explicit
//! [`Keypair::secret_key_bytes`] call made by a key store.
//!
//! ## Signature format
//!
//! Signatures are `r || s`, each component a zero-padded 32-byte big-endian
//! integer. Splitting a stored signature is therefore always a split at
//! byte 32, never a guess based on the buffer length.
//!
//! ## Security considerations
//!
//! - Key generation uses the OS RNG (`OsRng`).
//! - Nonces are derived deterministically (RFC 6979), so signing needs no
//!   randomness and the same `(key, message)` pair yields the same signature.
//! - Key bytes are never logged.

use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;

use crate::config::{PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH, SIGNATURE_LENGTH};

/// SEC1 tag for an uncompressed point.
const SEC1_UNCOMPRESSED_TAG: u8 = 0x04;

/// Errors that can occur during key operations.
///
/// Deliberately terse: error messages must not describe key material.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a point on secp256k1")]
    InvalidPublicKey,
}

/// A secp256k1 keypair.
///
/// `Keypair` intentionally does not implement `Serialize`. Persisting a
/// secret key has to go through [`secret_key_bytes`](Self::secret_key_bytes)
/// so that it is always a visible decision.
///
/// # Examples
///
/// ```
/// use swarm_protocol::crypto::keys::{verify, Keypair};
///
/// let kp = Keypair::generate();
/// let sig = kp.sign(b"send 10 to bob");
/// assert!(verify(&kp.public_key(), b"send 10 to bob", &sig));
/// ```
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Reconstruct a keypair from a big-endian secret scalar.
    ///
    /// Scalars shorter than 32 bytes are left-padded with zeros, so a key
    /// exported by a system that strips leading zero bytes still loads.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.is_empty() || bytes.len() > SECRET_KEY_LENGTH {
            return Err(KeyError::InvalidSecretKey);
        }
        let padded = padded_secret(bytes);
        let signing_key =
            SigningKey::from_slice(&padded).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self { signing_key })
    }

    /// Reconstruct a keypair from a hex-encoded secret scalar.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str).map_err(|_| KeyError::InvalidSecretKey)?;
        Self::from_secret_bytes(&bytes)
    }

    /// The public key as `X || Y`, 64 bytes.
    pub fn public_key(&self) -> Vec<u8> {
        let point = self.signing_key.verifying_key().to_encoded_point(false);
        // Drop the SEC1 0x04 tag.
        point.as_bytes()[1..].to_vec()
    }

    /// The 32-byte zero-padded secret scalar.
    ///
    /// **Handle with care.** This is the only thing standing between an
    /// attacker and every output locked to this key.
    pub fn secret_key_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        let mut out = [0u8; SECRET_KEY_LENGTH];
        out.copy_from_slice(&self.signing_key.to_bytes());
        out
    }

    /// Sign a message, returning `r || s` (64 bytes).
    ///
    /// The message is hashed with SHA-256 internally.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let signature: Signature = self.signing_key.sign(message);
        signature.to_bytes().to_vec()
    }

    /// Hex-encoded public key. Safe to log.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material in debug output.
        write!(f, "Keypair(pub={})", self.public_key_hex())
    }
}

impl PartialEq for Keypair {
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for Keypair {}

/// Parse a 64-byte `X || Y` public key into a verifying key.
pub fn verifying_key_from_bytes(public_key: &[u8]) -> Result<VerifyingKey, KeyError> {
    if public_key.len() != PUBLIC_KEY_LENGTH {
        return Err(KeyError::InvalidPublicKey);
    }
    let mut sec1 = Vec::with_capacity(PUBLIC_KEY_LENGTH + 1);
    sec1.push(SEC1_UNCOMPRESSED_TAG);
    sec1.extend_from_slice(public_key);
    VerifyingKey::from_sec1_bytes(&sec1).map_err(|_| KeyError::InvalidPublicKey)
}

/// Verify an `r || s` signature over `message` against an `X || Y` public key.
///
/// Returns `false` for anything that does not verify, including malformed
/// keys and signatures of the wrong length. An invalid signature is an
/// expected outcome on adversarial input, not an error.
pub fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    if signature.len() != SIGNATURE_LENGTH {
        return false;
    }
    let Ok(verifying_key) = verifying_key_from_bytes(public_key) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    verifying_key.verify(message, &signature).is_ok()
}

/// Left-pad a big-endian scalar to 32 bytes.
fn padded_secret(src: &[u8]) -> [u8; SECRET_KEY_LENGTH] {
    let mut out = [0u8; SECRET_KEY_LENGTH];
    out[SECRET_KEY_LENGTH - src.len()..].copy_from_slice(src);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
