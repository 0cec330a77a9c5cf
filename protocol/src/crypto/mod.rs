//! # Cryptographic Primitives
//!
//! Thin, typed wrappers over audited implementations: `k256` for
//! secp256k1 ECDSA, `sha2` and `ripemd` for digests. Nothing here
//! implements a primitive by hand.

pub mod hash;
pub mod keys;

pub use hash::{double_sha256, hash160, sha256, sha256_array};
pub use keys::{verify, KeyError, Keypair};
