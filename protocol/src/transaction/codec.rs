//! Canonical byte encoding for transactions.
//!
//! The same encoding serves three purposes: it is what gets hashed into the
//! transaction id, what gets signed per input (over the trimmed view), and
//! what goes over the wire or into storage.
//!
//! ## Layout
//!
//! Every field is introduced by a one-byte tag so that a stream with fields
//! out of order is rejected at the first misplaced tag instead of being
//! silently misread. Integers are fixed-width big-endian. Byte strings are
//! prefixed with a `u32` big-endian length. Optional byte strings carry a
//! presence byte (`0x00` absent, `0x01` present) ahead of the length, so an
//! absent signature and an empty one encode differently.
//!
//! ```text
//! 0x01 id            len:u32 bytes
//! 0x02 inputs        count:u32
//!   0x03 input       prev_tx_id(len bytes) output_index:i64
//!                    signature(flag [len bytes]) public_key(flag [len bytes])
//! 0x04 outputs       count:u32
//!   0x05 output      value:u64 owner_hash(len bytes)
//! 0x06 timestamp     i64
//! ```
//!
//! Decoding is strict: a missing byte, an unexpected tag, an unknown
//! presence flag or trailing garbage are all structural errors.

use thiserror::Error;

use super::types::{SizeCache, Transaction, TxInput, TxOutput};
use crate::config::MAX_TX_SIZE_BYTES;

const TAG_ID: u8 = 0x01;
const TAG_INPUTS: u8 = 0x02;
const TAG_INPUT: u8 = 0x03;
const TAG_OUTPUTS: u8 = 0x04;
const TAG_OUTPUT: u8 = 0x05;
const TAG_TIMESTAMP: u8 = 0x06;

const ABSENT: u8 = 0x00;
const PRESENT: u8 = 0x01;

/// Structural errors raised while decoding a transaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("truncated encoding: needed {needed} more bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("unexpected field tag 0x{found:02x} (expected 0x{expected:02x})")]
    UnexpectedTag { expected: u8, found: u8 },

    #[error("invalid presence flag 0x{0:02x}")]
    InvalidPresenceFlag(u8),

    #[error("{0} trailing bytes after transaction")]
    TrailingBytes(usize),

    #[error("encoding is {size} bytes, maximum is {max}")]
    TooLarge { size: usize, max: usize },
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encodes `tx` with its own id.
pub fn encode(tx: &Transaction) -> Vec<u8> {
    encode_with_id(tx, &tx.id)
}

/// Encodes `tx` with `id` in place of its id field.
///
/// Passing an empty slice gives the form that the id itself is hashed from.
pub fn encode_with_id(tx: &Transaction, id: &[u8]) -> Vec<u8> {
    let mut w = Writer::with_capacity(encoded_len_with_id(tx, id.len()));

    w.tag(TAG_ID);
    w.bytes(id);

    w.tag(TAG_INPUTS);
    w.count(tx.inputs.len());
    for input in &tx.inputs {
        w.tag(TAG_INPUT);
        w.bytes(&input.prev_tx_id);
        w.buf.extend_from_slice(&input.output_index.to_be_bytes());
        w.opt_bytes(input.signature.as_deref());
        w.opt_bytes(input.public_key.as_deref());
    }

    w.tag(TAG_OUTPUTS);
    w.count(tx.outputs.len());
    for output in &tx.outputs {
        w.tag(TAG_OUTPUT);
        w.buf.extend_from_slice(&output.value.to_be_bytes());
        w.bytes(&output.owner_hash);
    }

    w.tag(TAG_TIMESTAMP);
    w.buf.extend_from_slice(&tx.timestamp.to_be_bytes());

    w.buf
}

/// Length of [`encode`]'s output, computed without allocating.
pub fn encoded_len(tx: &Transaction) -> usize {
    encoded_len_with_id(tx, tx.id.len())
}

fn encoded_len_with_id(tx: &Transaction, id_len: usize) -> usize {
    let bytes = |n: usize| 4 + n;
    let opt = |v: Option<&Vec<u8>>| 1 + v.map_or(0, |b| bytes(b.len()));

    let inputs: usize = tx
        .inputs
        .iter()
        .map(|i| {
            1 + bytes(i.prev_tx_id.len()) + 8 + opt(i.signature.as_ref()) + opt(i.public_key.as_ref())
        })
        .sum();
    let outputs: usize = tx
        .outputs
        .iter()
        .map(|o| 1 + 8 + bytes(o.owner_hash.len()))
        .sum();

    (1 + bytes(id_len)) + (1 + 4 + inputs) + (1 + 4 + outputs) + (1 + 8)
}

struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    fn tag(&mut self, tag: u8) {
        self.buf.push(tag);
    }

    /// Lengths are bounded by `MAX_TX_SIZE_BYTES` long before `u32::MAX`.
    fn count(&mut self, n: usize) {
        let n = u32::try_from(n);
        debug_assert!(n.is_ok(), "length prefix exceeds u32");
        self.buf.extend_from_slice(&n.unwrap_or(u32::MAX).to_be_bytes());
    }

    fn bytes(&mut self, data: &[u8]) {
        self.count(data.len());
        self.buf.extend_from_slice(data);
    }

    fn opt_bytes(&mut self, data: Option<&[u8]>) {
        match data {
            Some(data) => {
                self.buf.push(PRESENT);
                self.bytes(data);
            }
            None => self.buf.push(ABSENT),
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes a transaction, rejecting any structural deviation.
///
/// The returned record has its size cache primed with `data.len()`.
pub fn decode(data: &[u8]) -> Result<Transaction, CodecError> {
    if data.len() > MAX_TX_SIZE_BYTES {
        return Err(CodecError::TooLarge {
            size: data.len(),
            max: MAX_TX_SIZE_BYTES,
        });
    }

    let mut r = Reader { buf: data, pos: 0 };

    r.expect_tag(TAG_ID)?;
    let id = r.bytes()?;

    r.expect_tag(TAG_INPUTS)?;
    let input_count = r.u32()?;
    let mut inputs = Vec::new();
    for _ in 0..input_count {
        r.expect_tag(TAG_INPUT)?;
        let prev_tx_id = r.bytes()?;
        let output_index = i64::from_be_bytes(r.array()?);
        let signature = r.opt_bytes()?;
        let public_key = r.opt_bytes()?;
        inputs.push(TxInput {
            prev_tx_id,
            output_index,
            signature,
            public_key,
        });
    }

    r.expect_tag(TAG_OUTPUTS)?;
    let output_count = r.u32()?;
    let mut outputs = Vec::new();
    for _ in 0..output_count {
        r.expect_tag(TAG_OUTPUT)?;
        let value = u64::from_be_bytes(r.array()?);
        let owner_hash = r.bytes()?;
        outputs.push(TxOutput { value, owner_hash });
    }

    r.expect_tag(TAG_TIMESTAMP)?;
    let timestamp = i64::from_be_bytes(r.array()?);

    let trailing = data.len() - r.pos;
    if trailing != 0 {
        return Err(CodecError::TrailingBytes(trailing));
    }

    Ok(Transaction {
        id,
        inputs,
        outputs,
        timestamp,
        size: SizeCache::primed(data.len() as u64),
    })
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let remaining = self.buf.len() - self.pos;
        if n > remaining {
            return Err(CodecError::Truncated {
                needed: n,
                remaining,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    fn expect_tag(&mut self, expected: u8) -> Result<(), CodecError> {
        let found = self.u8()?;
        if found != expected {
            return Err(CodecError::UnexpectedTag { expected, found });
        }
        Ok(())
    }

    fn bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    fn opt_bytes(&mut self) -> Result<Option<Vec<u8>>, CodecError> {
        match self.u8()? {
            ABSENT => Ok(None),
            PRESENT => Ok(Some(self.bytes()?)),
            other => Err(CodecError::InvalidPresenceFlag(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
