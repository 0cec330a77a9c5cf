//! # Protocol Configuration & Constants
//!
//! Every magic number in the transaction core lives here. If you're
//! hardcoding one of these somewhere else, move it here instead.
//!
//! Changing any of the encoding or address constants after launch changes
//! transaction ids and addresses, so treat them as frozen.

// ---------------------------------------------------------------------------
// Monetary Parameters
// ---------------------------------------------------------------------------

/// Reward paid by every coinbase transaction, in the smallest unit.
pub const SUBSIDY: u64 = 50;

/// Number of random bytes drawn for a coinbase payload when the caller
/// does not supply one. The payload is stored hex-encoded, so the input
/// field ends up twice this long.
pub const COINBASE_DATA_LEN: usize = 50;

/// Output index carried by the single input of a coinbase transaction.
pub const COINBASE_OUTPUT_INDEX: i64 = -1;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Secret scalar length in bytes. Shorter scalars are left-padded with zeros.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Public key length on the wire: the X and Y coordinates, 32 bytes each,
/// without the SEC1 `0x04` tag.
pub const PUBLIC_KEY_LENGTH: usize = 64;

/// Signature length: `r || s`, each a zero-padded 32-byte big-endian integer.
/// Fixed width so the split point never depends on the integers' magnitude.
pub const SIGNATURE_LENGTH: usize = 64;

/// Output length of SHA-256, used for transaction ids.
pub const HASH_OUTPUT_LENGTH: usize = 32;

/// Length of a public-key hash: RIPEMD-160 over SHA-256.
pub const PUBLIC_KEY_HASH_LEN: usize = 20;

// ---------------------------------------------------------------------------
// Address Format
// ---------------------------------------------------------------------------

/// Version byte prepended to the public-key hash before Base58 encoding.
pub const ADDRESS_VERSION: u8 = 0x00;

/// Number of double-SHA-256 bytes appended as an address checksum.
pub const ADDRESS_CHECKSUM_LEN: usize = 4;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Maximum encoded transaction size the decoder will accept.
pub const MAX_TX_SIZE_BYTES: usize = 256 * 1024;

/// Priority used when a freshly built spend is parked in the submission queue.
pub const PENDING_PRIORITY: u64 = 1;

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Template for a node's key store directory. `{}` is the sanitised node id.
pub const KEY_STORE_DIR_TEMPLATE: &str = "wallet_{}";

/// Builds the key store directory name for a node id.
///
/// Node ids are frequently `host:port` pairs, and `:` is not welcome in
/// file names on every platform, so it is replaced with `_`.
pub fn key_store_name(node_id: &str) -> String {
    KEY_STORE_DIR_TEMPLATE.replace("{}", &node_id.replace(':', "_"))
}
