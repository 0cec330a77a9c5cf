//! # UTXO Collaborator Interfaces
//!
//! The transaction core never owns the unspent-output index. It consumes
//! two narrow traits instead:
//!
//! ```text
//! UtxoSelector   select_spendable(owner_hash, amount)   used by new_spend
//! UtxoIndex      + is_amount_valid(tx)                   used by admit
//!                + resolve_prior_outputs(tx)
//! ```
//!
//! [`MemoryUtxoSet`] is the in-process implementation used by the node and
//! the tests.

pub mod memory;

use std::collections::{BTreeMap, BTreeSet};

use crate::transaction::error::TransactionError;
use crate::transaction::signing::PrevTransactions;
use crate::transaction::types::Transaction;

pub use memory::MemoryUtxoSet;

/// Outputs chosen to fund a spend.
///
/// `outputs` maps a hex-encoded previous transaction id to the indices of
/// its outputs that were picked. Both levels iterate in sorted order, which
/// keeps the inputs of the resulting transaction reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpendableOutputs {
    pub accumulated: u64,
    pub outputs: BTreeMap<String, BTreeSet<i64>>,
}

impl SpendableOutputs {
    /// Whether the selection covers `amount`.
    pub fn covers(&self, amount: u64) -> bool {
        self.accumulated >= amount
    }

    /// Number of outputs selected across all transactions.
    pub fn output_count(&self) -> usize {
        self.outputs.values().map(BTreeSet::len).sum()
    }
}

/// Picks unspent outputs owned by a key hash.
pub trait UtxoSelector: Send + Sync {
    /// Accumulates outputs owned by `owner_hash` until `amount` is reached.
    ///
    /// If the owner's whole balance is below `amount`, the result holds that
    /// balance and the caller treats it as insufficient funds. For a fixed
    /// snapshot the selection is deterministic.
    fn select_spendable(
        &self,
        owner_hash: &[u8],
        amount: u64,
    ) -> Result<SpendableOutputs, TransactionError>;
}

/// The full index surface used at admission time.
pub trait UtxoIndex: UtxoSelector {
    /// Whether the unspent outputs referenced by `tx` cover its outputs.
    ///
    /// An input referencing an already spent or unknown output makes the
    /// transaction invalid here.
    fn is_amount_valid(&self, tx: &Transaction) -> Result<bool, TransactionError>;

    /// Collects the prior transactions referenced by the inputs of `tx`.
    ///
    /// Unknown references are simply absent from the map; signing and
    /// verification report them as [`TransactionError::MissingReference`].
    fn resolve_prior_outputs(&self, tx: &Transaction) -> Result<PrevTransactions, TransactionError>;
}
