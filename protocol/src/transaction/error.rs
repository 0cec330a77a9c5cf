//! Transaction error taxonomy.
//!
//! An invalid signature is not in here: verification answers `false` for
//! it. These variants are for conditions the caller has to act on.

use thiserror::Error;

use super::codec::CodecError;
use crate::wallet::address::AddressError;

/// Errors raised by construction, signing, verification and decoding.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// An input points at a transaction or output index that the supplied
    /// prior-transaction map does not contain. This is a data-integrity
    /// problem on the caller's side, never a verdict on the signature.
    #[error("referenced output {output_index} of transaction {tx_id} is unknown")]
    MissingReference { tx_id: String, output_index: i64 },

    /// The sender's unspent outputs do not cover the requested amount.
    #[error("insufficient funds: {available} available, {required} required")]
    InsufficientFunds { available: u64, required: u64 },

    /// A spend of zero was requested.
    #[error("amount must be > 0")]
    ZeroAmount,

    /// The byte stream is not a well-formed transaction.
    #[error("malformed transaction encoding: {0}")]
    MalformedEncoding(#[from] CodecError),

    /// A recipient or reward address failed to decode.
    #[error("invalid address {address}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddressError,
    },

    /// The UTXO index backing a construction or admission failed.
    #[error("UTXO index error: {0}")]
    UtxoIndex(String),
}
