//! Core transaction value types.
//!
//! A [`Transaction`] spends outputs of earlier transactions through its
//! [`TxInput`]s and creates new [`TxOutput`]s locked to public-key hashes.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::codec;
use crate::config::COINBASE_OUTPUT_INDEX;
use crate::crypto::hash::sha256;
use crate::wallet::address::{pub_key_hash_from_address, AddressError};

// ---------------------------------------------------------------------------
// TxInput
// ---------------------------------------------------------------------------

/// A reference to a previously created output being spent.
///
/// For a coinbase input `prev_tx_id` is empty, `output_index` is `-1` and
/// `public_key` carries arbitrary data instead of a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    /// Id of the transaction holding the spent output.
    #[serde(with = "hex_bytes")]
    pub prev_tx_id: Vec<u8>,

    /// Position of the spent output in that transaction.
    pub output_index: i64,

    /// `r || s` over this input's trimmed view. `None` until signed.
    #[serde(with = "opt_hex_bytes")]
    pub signature: Option<Vec<u8>>,

    /// Spender's raw `X || Y` public key.
    #[serde(with = "opt_hex_bytes")]
    pub public_key: Option<Vec<u8>>,
}

impl TxInput {
    /// An unsigned input spending `prev_tx_id[output_index]`.
    pub fn new(prev_tx_id: Vec<u8>, output_index: i64, public_key: Vec<u8>) -> Self {
        Self {
            prev_tx_id,
            output_index,
            signature: None,
            public_key: Some(public_key),
        }
    }

    /// Returns `true` if the declared public key hashes to `pub_key_hash`.
    pub fn uses_key(&self, pub_key_hash: &[u8]) -> bool {
        self.public_key
            .as_deref()
            .is_some_and(|pk| crate::wallet::address::hash_pub_key(pk) == pub_key_hash)
    }
}

// ---------------------------------------------------------------------------
// TxOutput
// ---------------------------------------------------------------------------

/// A value locked to the hash of its owner's public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Amount in the smallest unit.
    pub value: u64,

    /// HASH160 of the owner's public key.
    #[serde(with = "hex_bytes")]
    pub owner_hash: Vec<u8>,
}

impl TxOutput {
    /// An output of `value` locked to `address`.
    pub fn new(value: u64, address: &str) -> Result<Self, AddressError> {
        Ok(Self {
            value,
            owner_hash: pub_key_hash_from_address(address)?,
        })
    }

    /// An output of `value` locked directly to a key hash.
    pub fn to_key_hash(value: u64, owner_hash: Vec<u8>) -> Self {
        Self { value, owner_hash }
    }

    /// Returns `true` if the output is locked to `pub_key_hash`.
    pub fn is_locked_with_key(&self, pub_key_hash: &[u8]) -> bool {
        self.owner_hash == pub_key_hash
    }
}

// ---------------------------------------------------------------------------
// SizeCache
// ---------------------------------------------------------------------------

/// Memoized encoded size of a transaction.
///
/// A single atomic cell where `0` means "not computed". Racing callers may
/// both compute and store; they store the same number, so the race is
/// wasteful but harmless. Cache state never takes part in equality.
#[derive(Debug, Default)]
pub struct SizeCache(AtomicU64);

impl SizeCache {
    pub(crate) fn primed(size: u64) -> Self {
        Self(AtomicU64::new(size))
    }

    fn get(&self) -> Option<u64> {
        match self.0.load(Ordering::Acquire) {
            0 => None,
            size => Some(size),
        }
    }

    fn set(&self, size: u64) {
        self.0.store(size, Ordering::Release);
    }

    fn clear(&self) {
        self.0.store(0, Ordering::Release);
    }
}

impl Clone for SizeCache {
    fn clone(&self) -> Self {
        Self(AtomicU64::new(self.0.load(Ordering::Acquire)))
    }
}

impl PartialEq for SizeCache {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for SizeCache {}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A value-transfer record.
///
/// `id` is SHA-256 of [`canonical_encode`](Self::canonical_encode), which is
/// the full encoding with the id field blanked. It is assigned once the
/// inputs and outputs are assembled and before signatures are attached.
///
/// After construction the only sanctioned mutation is attaching input
/// signatures, and that must finish before the record is shared between
/// threads. [`size`](Self::size) is the exception: it may be called
/// concurrently on a shared record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// SHA-256 of the canonical encoding. Empty until assigned.
    #[serde(with = "hex_bytes")]
    pub id: Vec<u8>,

    /// Spent outputs, in signing order.
    pub inputs: Vec<TxInput>,

    /// Created outputs. Order matters: output indices are positions here.
    pub outputs: Vec<TxOutput>,

    /// Creation time, unix seconds.
    pub timestamp: i64,

    #[serde(skip)]
    pub(crate) size: SizeCache,
}

impl Transaction {
    /// A record timestamped now, with no id yet.
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Self::with_timestamp(inputs, outputs, Utc::now().timestamp())
    }

    /// A record with an explicit timestamp. Mostly for tests and replay.
    pub fn with_timestamp(inputs: Vec<TxInput>, outputs: Vec<TxOutput>, timestamp: i64) -> Self {
        Self {
            id: Vec::new(),
            inputs,
            outputs,
            timestamp,
            size: SizeCache::default(),
        }
    }

    /// Returns `true` for a reward-minting transaction: exactly one input,
    /// with an empty previous id and the `-1` sentinel index.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1
            && self.inputs[0].prev_tx_id.is_empty()
            && self.inputs[0].output_index == COINBASE_OUTPUT_INDEX
    }

    /// The deterministic encoding of every field, with `id` blanked.
    pub fn canonical_encode(&self) -> Vec<u8> {
        codec::encode_with_id(self, &[])
    }

    /// SHA-256 of [`canonical_encode`](Self::canonical_encode). 32 bytes.
    pub fn identity_hash(&self) -> Vec<u8> {
        sha256(&self.canonical_encode())
    }

    /// Sets `id` from the current content and primes the size cache.
    pub fn assign_id(&mut self) {
        self.id = self.identity_hash();
        self.size.set(codec::encoded_len(self) as u64);
    }

    /// Full wire encoding, `id` included.
    pub fn serialize(&self) -> Vec<u8> {
        codec::encode(self)
    }

    /// Strictly decodes a wire encoding.
    pub fn deserialize(data: &[u8]) -> Result<Self, codec::CodecError> {
        codec::decode(data)
    }

    /// Encoded size in bytes, memoized.
    ///
    /// Safe to call from several threads on the same record.
    pub fn size(&self) -> u64 {
        if let Some(size) = self.size.get() {
            return size;
        }
        let size = codec::encoded_len(self) as u64;
        self.size.set(size);
        size
    }

    /// Drops the memoized size. Called after signatures are attached.
    pub fn invalidate_size(&self) {
        self.size.clear();
    }

    /// A copy with every input's `signature` and `public_key` cleared.
    ///
    /// This is the scratch object each input's signature is computed over.
    /// The copy has its own, empty size cache.
    pub fn trimmed_view(&self) -> Transaction {
        let inputs = self
            .inputs
            .iter()
            .map(|input| TxInput {
                prev_tx_id: input.prev_tx_id.clone(),
                output_index: input.output_index,
                signature: None,
                public_key: None,
            })
            .collect();
        let outputs = self
            .outputs
            .iter()
            .map(|output| TxOutput::to_key_hash(output.value, output.owner_hash.clone()))
            .collect();

        Transaction {
            id: self.id.clone(),
            inputs,
            outputs,
            timestamp: self.timestamp,
            size: SizeCache::default(),
        }
    }

    /// Sum of all output values. `None` on overflow.
    pub fn total_output_value(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, output| acc.checked_add(output.value))
    }

    /// Hex-encoded id.
    pub fn id_hex(&self) -> String {
        hex::encode(&self.id)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Transaction {}:", self.id_hex())?;
        for (i, input) in self.inputs.iter().enumerate() {
            writeln!(f, "     Input {}:", i)?;
            writeln!(f, "       TXID:      {}", hex::encode(&input.prev_tx_id))?;
            writeln!(f, "       Out:       {}", input.output_index)?;
            writeln!(
                f,
                "       Signature: {}",
                hex::encode(input.signature.as_deref().unwrap_or_default())
            )?;
            writeln!(
                f,
                "       PubKey:    {}",
                hex::encode(input.public_key.as_deref().unwrap_or_default())
            )?;
        }
        for (i, output) in self.outputs.iter().enumerate() {
            writeln!(f, "     Output {}:", i)?;
            writeln!(f, "       Value:  {}", output.value)?;
            writeln!(f, "       Script: {}", hex::encode(&output.owner_hash))?;
        }
        write!(f, "       Timestamp: {}", self.timestamp)
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(d)?;
        hex::decode(text).map_err(serde::de::Error::custom)
    }
}

mod opt_hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => s.serialize_some(&hex::encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|text| hex::decode(text).map_err(serde::de::Error::custom))
            .transpose()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
