//! Admission checks run before a transaction is accepted for inclusion.
//!
//! # Checks
//!
//! 1. **Signatures**: every input verifies against the output it spends.
//! 2. **Funds**: the referenced unspent outputs cover the declared outputs
//!    (delegated to the [`UtxoIndex`]).
//! 3. **Self-transfer**: the first output does not pay an input's own key.
//!
//! Coinbase transactions are exempt from checks 2 and 3. The first failed
//! check decides the outcome.

use tracing::{debug, warn};

use super::error::TransactionError;
use super::types::Transaction;
use super::verification::{passes_self_transfer_policy, verify_transaction};
use crate::utxo::UtxoIndex;

/// Result of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    Accepted,
    /// At least one input signature or ownership check failed.
    InvalidSignature,
    /// Referenced outputs are spent, unknown to the index, or too small.
    InsufficientFunds,
    /// The first output pays back to one of the inputs' keys.
    SelfTransfer,
}

impl AdmissionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AdmissionOutcome::Accepted)
    }
}

/// Runs the admission checks for `tx` against `index`.
///
/// # Errors
///
/// [`TransactionError::MissingReference`] when the index cannot supply a
/// transaction referenced by one of the inputs; a rejection is never
/// reported as an error.
pub fn admit(tx: &Transaction, index: &dyn UtxoIndex) -> Result<AdmissionOutcome, TransactionError> {
    let prev_txs = index.resolve_prior_outputs(tx)?;
    let outcome = if !verify_transaction(tx, &prev_txs)? {
        AdmissionOutcome::InvalidSignature
    } else if tx.is_coinbase() {
        AdmissionOutcome::Accepted
    } else if !index.is_amount_valid(tx)? {
        AdmissionOutcome::InsufficientFunds
    } else if !passes_self_transfer_policy(tx) {
        AdmissionOutcome::SelfTransfer
    } else {
        AdmissionOutcome::Accepted
    };

    if outcome.is_accepted() {
        debug!(tx = %tx.id_hex(), "transaction admitted");
    } else {
        warn!(tx = %tx.id_hex(), ?outcome, "transaction rejected");
    }
    Ok(outcome)
}

/// [`admit`] collapsed to a boolean.
pub fn is_admissible(tx: &Transaction, index: &dyn UtxoIndex) -> Result<bool, TransactionError> {
    Ok(admit(tx, index)?.is_accepted())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
