//! In-memory unspent-output set.
//!
//! Keeps every applied transaction (so prior outputs can be resolved for
//! signing and verification) plus the subset of outputs still unspent:
//!
//! ```text
//! transactions : hex(tx id) -> Transaction
//! unspent      : hex(tx id) -> { output index -> TxOutput }
//! ```
//!
//! Both maps sit behind one `parking_lot::RwLock`. Selection walks the
//! `BTreeMap`s in key order, so it is deterministic for a given snapshot.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use parking_lot::RwLock;
use tracing::debug;

use super::{SpendableOutputs, UtxoIndex, UtxoSelector};
use crate::transaction::error::TransactionError;
use crate::transaction::signing::PrevTransactions;
use crate::transaction::types::{Transaction, TxOutput};

#[derive(Default)]
struct Inner {
    transactions: HashMap<String, Transaction>,
    unspent: BTreeMap<String, BTreeMap<i64, TxOutput>>,
}

/// A thread-safe UTXO set held entirely in memory.
#[derive(Default)]
pub struct MemoryUtxoSet {
    inner: RwLock<Inner>,
}

impl MemoryUtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes a transaction: its inputs are consumed, its outputs become
    /// spendable.
    ///
    /// The whole transaction is rejected if any non-coinbase input does not
    /// reference a currently unspent output, if two inputs reference the
    /// same output, or if the id is already known.
    pub fn apply(&self, tx: &Transaction) -> Result<(), TransactionError> {
        let tx_id = tx.id_hex();
        let mut inner = self.inner.write();

        if inner.transactions.contains_key(&tx_id) {
            return Err(TransactionError::UtxoIndex(format!(
                "transaction {tx_id} already applied"
            )));
        }

        if !tx.is_coinbase() {
            let mut seen = BTreeSet::new();
            for input in &tx.inputs {
                let prev_id = hex::encode(&input.prev_tx_id);
                if !seen.insert((prev_id.clone(), input.output_index)) {
                    return Err(TransactionError::UtxoIndex(format!(
                        "output {}:{} is spent twice",
                        prev_id, input.output_index
                    )));
                }
                let unspent = inner
                    .unspent
                    .get(&prev_id)
                    .is_some_and(|outs| outs.contains_key(&input.output_index));
                if !unspent {
                    return Err(TransactionError::UtxoIndex(format!(
                        "output {}:{} is not unspent",
                        prev_id, input.output_index
                    )));
                }
            }

            for input in &tx.inputs {
                let prev_id = hex::encode(&input.prev_tx_id);
                if let Some(outs) = inner.unspent.get_mut(&prev_id) {
                    outs.remove(&input.output_index);
                    if outs.is_empty() {
                        inner.unspent.remove(&prev_id);
                    }
                }
            }
        }

        let outputs: BTreeMap<i64, TxOutput> = tx
            .outputs
            .iter()
            .enumerate()
            .map(|(index, output)| (index as i64, output.clone()))
            .collect();
        if !outputs.is_empty() {
            inner.unspent.insert(tx_id.clone(), outputs);
        }
        inner.transactions.insert(tx_id.clone(), tx.clone());

        debug!(tx = %tx_id, outputs = tx.outputs.len(), "transaction applied to UTXO set");
        Ok(())
    }

    /// Sum of unspent outputs locked to `owner_hash`.
    pub fn balance(&self, owner_hash: &[u8]) -> u64 {
        self.inner
            .read()
            .unspent
            .values()
            .flat_map(BTreeMap::values)
            .filter(|output| output.is_locked_with_key(owner_hash))
            .fold(0u64, |acc, output| acc.saturating_add(output.value))
    }

    /// Looks up an applied transaction by hex id.
    pub fn transaction(&self, tx_id: &str) -> Option<Transaction> {
        self.inner.read().transactions.get(tx_id).cloned()
    }

    /// Number of unspent outputs across all owners.
    pub fn unspent_count(&self) -> usize {
        self.inner.read().unspent.values().map(BTreeMap::len).sum()
    }
}

impl UtxoSelector for MemoryUtxoSet {
    fn select_spendable(
        &self,
        owner_hash: &[u8],
        amount: u64,
    ) -> Result<SpendableOutputs, TransactionError> {
        let inner = self.inner.read();
        let mut selection = SpendableOutputs::default();

        'outer: for (tx_id, outputs) in &inner.unspent {
            for (index, output) in outputs {
                if selection.covers(amount) {
                    break 'outer;
                }
                if !output.is_locked_with_key(owner_hash) {
                    continue;
                }
                selection.accumulated = selection.accumulated.saturating_add(output.value);
                selection
                    .outputs
                    .entry(tx_id.clone())
                    .or_default()
                    .insert(*index);
            }
        }

        Ok(selection)
    }
}

impl UtxoIndex for MemoryUtxoSet {
    fn is_amount_valid(&self, tx: &Transaction) -> Result<bool, TransactionError> {
        if tx.is_coinbase() {
            return Ok(true);
        }

        let inner = self.inner.read();
        let mut seen = BTreeSet::new();
        let mut available = 0u64;
        for input in &tx.inputs {
            let prev_id = hex::encode(&input.prev_tx_id);
            if !seen.insert((prev_id.clone(), input.output_index)) {
                return Ok(false);
            }
            let output = inner
                .unspent
                .get(&prev_id)
                .and_then(|outs| outs.get(&input.output_index));
            let Some(output) = output else {
                return Ok(false);
            };
            available = available.saturating_add(output.value);
        }

        Ok(tx
            .total_output_value()
            .is_some_and(|required| available >= required))
    }

    fn resolve_prior_outputs(&self, tx: &Transaction) -> Result<PrevTransactions, TransactionError> {
        let inner = self.inner.read();
        let mut prev_txs = PrevTransactions::new();
        if tx.is_coinbase() {
            return Ok(prev_txs);
        }
        for input in &tx.inputs {
            let prev_id = hex::encode(&input.prev_tx_id);
            if let Some(prev) = inner.transactions.get(&prev_id) {
                prev_txs.insert(prev_id, prev.clone());
            }
        }
        Ok(prev_txs)
    }
}

impl std::fmt::Debug for MemoryUtxoSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("MemoryUtxoSet")
            .field("transactions", &inner.transactions.len())
            .field("unspent", &inner.unspent.values().map(BTreeMap::len).sum::<usize>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::types::TxInput;

    fn coinbase(owner_hash: &[u8], value: u64, nonce: i64) -> Transaction {
        let mut tx = Transaction::with_timestamp(
            vec![TxInput {
                prev_tx_id: vec![],
                output_index: -1,
                signature: None,
                public_key: Some(nonce.to_be_bytes().to_vec()),
            }],
            vec![TxOutput::to_key_hash(value, owner_hash.to_vec())],
            1_700_000_000 + nonce,
        );
        tx.assign_id();
        tx
    }

    fn spend(prev: &Transaction, outputs: Vec<TxOutput>) -> Transaction {
        let mut tx = Transaction::with_timestamp(
            vec![TxInput::new(prev.id.clone(), 0, vec![1; 64])],
            outputs,
            1_700_001_000,
        );
        tx.assign_id();
        tx
    }

    #[test]
    fn balance_tracks_applied_outputs() {
        let set = MemoryUtxoSet::new();
        let alice = vec![0xaa; 20];
        set.apply(&coinbase(&alice, 50, 0)).unwrap();
        set.apply(&coinbase(&alice, 30, 1)).unwrap();
        assert_eq!(set.balance(&alice), 80);
        assert_eq!(set.balance(&[0xbb; 20]), 0);
    }

    #[test]
    fn selection_stops_once_amount_reached() {
        let set = MemoryUtxoSet::new();
        let alice = vec![0xaa; 20];
        for nonce in 0..4 {
            set.apply(&coinbase(&alice, 50, nonce)).unwrap();
        }

        let picked = set.select_spendable(&alice, 60).unwrap();
        assert_eq!(picked.accumulated, 100);
        assert_eq!(picked.output_count(), 2);
    }

    #[test]
    fn selection_reports_full_balance_when_short() {
        let set = MemoryUtxoSet::new();
        let alice = vec![0xaa; 20];
        set.apply(&coinbase(&alice, 100, 0)).unwrap();

        let picked = set.select_spendable(&alice, 150).unwrap();
        assert_eq!(picked.accumulated, 100);
        assert!(!picked.covers(150));
    }

    #[test]
    fn selection_is_deterministic() {
        let set = MemoryUtxoSet::new();
        let alice = vec![0xaa; 20];
        for nonce in 0..6 {
            set.apply(&coinbase(&alice, 10, nonce)).unwrap();
        }
        let first = set.select_spendable(&alice, 35).unwrap();
        let second = set.select_spendable(&alice, 35).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn apply_consumes_inputs_and_rejects_double_spend() {
        let set = MemoryUtxoSet::new();
        let alice = vec![0xaa; 20];
        let bob = vec![0xbb; 20];
        let cb = coinbase(&alice, 100, 0);
        set.apply(&cb).unwrap();

        let tx = spend(&cb, vec![TxOutput::to_key_hash(100, bob.clone())]);
        set.apply(&tx).unwrap();
        assert_eq!(set.balance(&alice), 0);
        assert_eq!(set.balance(&bob), 100);

        let again = spend(&cb, vec![TxOutput::to_key_hash(99, bob)]);
        assert!(matches!(
            set.apply(&again),
            Err(TransactionError::UtxoIndex(_))
        ));
    }

    #[test]
    fn amount_validity_against_unspent_inputs() {
        let set = MemoryUtxoSet::new();
        let alice = vec![0xaa; 20];
        let cb = coinbase(&alice, 100, 0);
        set.apply(&cb).unwrap();

        let ok = spend(&cb, vec![TxOutput::to_key_hash(100, vec![0xbb; 20])]);
        let over = spend(&cb, vec![TxOutput::to_key_hash(101, vec![0xbb; 20])]);
        assert!(set.is_amount_valid(&ok).unwrap());
        assert!(!set.is_amount_valid(&over).unwrap());
        assert!(set.is_amount_valid(&cb).unwrap());
    }

    #[test]
    fn repeated_outpoint_is_neither_valid_nor_applied() {
        let set = MemoryUtxoSet::new();
        let alice = vec![0xaa; 20];
        let bob = vec![0xbb; 20];
        let cb = coinbase(&alice, 50, 0);
        set.apply(&cb).unwrap();

        let mut tx = spend(&cb, vec![TxOutput::to_key_hash(100, bob.clone())]);
        tx.inputs.push(TxInput::new(cb.id.clone(), 0, vec![1; 64]));
        tx.assign_id();

        assert!(!set.is_amount_valid(&tx).unwrap());
        assert!(matches!(set.apply(&tx), Err(TransactionError::UtxoIndex(_))));
        assert_eq!(set.balance(&alice), 50);
        assert_eq!(set.balance(&bob), 0);
        assert_eq!(set.unspent_count(), 1);
        assert!(set.transaction(&tx.id_hex()).is_none());
        assert!(set.transaction(&cb.id_hex()).is_some());
    }

    #[test]
    fn resolve_prior_outputs_skips_unknown_ids() {
        let set = MemoryUtxoSet::new();
        let cb = coinbase(&[0xaa; 20], 100, 0);
        set.apply(&cb).unwrap();

        let mut tx = spend(&cb, vec![TxOutput::to_key_hash(1, vec![0xbb; 20])]);
        tx.inputs.push(TxInput::new(vec![0xee; 32], 0, vec![1; 64]));

        let prev = set.resolve_prior_outputs(&tx).unwrap();
        assert_eq!(prev.len(), 1);
        assert!(prev.contains_key(&cb.id_hex()));
    }
}
