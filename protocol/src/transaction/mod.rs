//! # Transaction Module
//!
//! Construction, content addressing, signing and verification of UTXO
//! transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        — TxInput, TxOutput, Transaction and its size cache
//! codec.rs        — Tagged big-endian wire encoding with a strict decoder
//! builder.rs      — new_coinbase / new_spend
//! signing.rs      — Per-input ECDSA signatures over the trimmed view
//! verification.rs — Signature/ownership check and the self-transfer rule
//! admission.rs    — admit(): signatures + funds + self-transfer
//! error.rs        — TransactionError
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build** — [`new_coinbase`] or [`new_spend`] assembles the record and
//!    assigns its id.
//! 2. **Sign** — [`sign_transaction`] attaches one signature per input
//!    (done by `new_spend` already).
//! 3. **Verify** — validators call [`verify_transaction`] with the prior
//!    transactions the inputs reference.
//! 4. **Admit** — [`admit`] adds the funds and self-transfer checks.
//!
//! ## Design Decisions
//!
//! - The id is SHA-256 of the encoding with the id field blanked. It is
//!   assigned before signing and never recomputed afterwards.
//! - Signatures are fixed-width `r ‖ s` (32 bytes each) and public keys are
//!   the raw `X ‖ Y` coordinates, so neither needs length-halving guesswork.
//! - An invalid signature is a `false`, not an error. Errors are reserved
//!   for missing prior data and malformed input.

pub mod admission;
pub mod builder;
pub mod codec;
pub mod error;
pub mod signing;
pub mod types;
pub mod verification;

pub use admission::{admit, is_admissible, AdmissionOutcome};
pub use builder::{new_coinbase, new_spend};
pub use codec::CodecError;
pub use error::TransactionError;
pub use signing::{sign_transaction, PrevTransactions};
pub use types::{SizeCache, Transaction, TxInput, TxOutput};
pub use verification::{passes_self_transfer_policy, verify_transaction};
