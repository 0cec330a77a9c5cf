//! Per-input transaction signing.
//!
//! Each input is signed over its own message: the trimmed view of the
//! transaction (all signatures and keys cleared) with that one input's
//! key field set to the owner hash of the output it spends. Binding the
//! spent output's owner into the message means a signature cannot be
//! replayed against an output locked to somebody else.

use std::collections::HashMap;

use tracing::debug;

use super::error::TransactionError;
use super::types::{Transaction, TxInput, TxOutput};
use crate::crypto::keys::Keypair;

/// Prior transactions keyed by hex-encoded id.
pub type PrevTransactions = HashMap<String, Transaction>;

/// Resolves the output an input spends.
///
/// Fails with [`TransactionError::MissingReference`] if the transaction is
/// not in `prev_txs` or has no output at the referenced index.
pub(crate) fn referenced_output<'a>(
    prev_txs: &'a PrevTransactions,
    input: &TxInput,
) -> Result<&'a TxOutput, TransactionError> {
    let tx_id = hex::encode(&input.prev_tx_id);
    let output = prev_txs.get(&tx_id).and_then(|prev| {
        usize::try_from(input.output_index)
            .ok()
            .and_then(|index| prev.outputs.get(index))
    });
    output.ok_or(TransactionError::MissingReference {
        tx_id,
        output_index: input.output_index,
    })
}

/// Resolves every input of `tx` up front, in input order.
pub(crate) fn resolve_all<'a>(
    tx: &Transaction,
    prev_txs: &'a PrevTransactions,
) -> Result<Vec<&'a TxOutput>, TransactionError> {
    tx.inputs
        .iter()
        .map(|input| referenced_output(prev_txs, input))
        .collect()
}

/// The exact bytes signed for input `index`.
///
/// `trimmed` must come from [`Transaction::trimmed_view`]. The input's key
/// field is set to `owner_hash` for the duration of the encoding and
/// cleared again afterwards, so the same scratch copy can be reused for the
/// next input.
pub(crate) fn signing_message(trimmed: &mut Transaction, index: usize, owner_hash: &[u8]) -> Vec<u8> {
    trimmed.inputs[index].signature = None;
    trimmed.inputs[index].public_key = Some(owner_hash.to_vec());
    let message = trimmed.serialize();
    trimmed.inputs[index].public_key = None;
    message
}

/// Signs every input of `tx` in place.
///
/// Coinbase transactions are left untouched. Every input must resolve in
/// `prev_txs` before any signature is written, so a failure never leaves
/// the record half-signed.
///
/// # Errors
///
/// [`TransactionError::MissingReference`] if an input's previous output is
/// unknown.
pub fn sign_transaction(
    tx: &mut Transaction,
    keypair: &Keypair,
    prev_txs: &PrevTransactions,
) -> Result<(), TransactionError> {
    if tx.is_coinbase() {
        return Ok(());
    }

    let owners: Vec<Vec<u8>> = resolve_all(tx, prev_txs)?
        .into_iter()
        .map(|output| output.owner_hash.clone())
        .collect();

    let mut trimmed = tx.trimmed_view();
    for (index, owner_hash) in owners.iter().enumerate() {
        let message = signing_message(&mut trimmed, index, owner_hash);
        tx.inputs[index].signature = Some(keypair.sign(&message));
        debug!(tx = %tx.id_hex(), input = index, "input signed");
    }

    tx.invalidate_size();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
