//! Coinbase and spend construction.
//!
//! Both constructors return a record with its id already assigned and its
//! size cache primed. [`new_spend`] additionally signs every input before
//! returning, so callers never see a half-built spend.

use rand::RngCore;
use tracing::info;

use super::error::TransactionError;
use super::signing::sign_transaction;
use super::types::{Transaction, TxInput, TxOutput};
use crate::config::{COINBASE_DATA_LEN, COINBASE_OUTPUT_INDEX, SUBSIDY};
use crate::utxo::UtxoIndex;
use crate::wallet::Wallet;

fn output_to(value: u64, address: &str) -> Result<TxOutput, TransactionError> {
    TxOutput::new(value, address).map_err(|source| TransactionError::InvalidAddress {
        address: address.to_string(),
        source,
    })
}

/// Builds the reward transaction paying [`SUBSIDY`] to `to`.
///
/// `data` is carried in the sentinel input's key field. When absent or
/// empty, [`COINBASE_DATA_LEN`] random bytes are generated and stored
/// hex-encoded, which keeps two coinbases to the same address distinct.
pub fn new_coinbase(to: &str, data: Option<&[u8]>) -> Result<Transaction, TransactionError> {
    let output = output_to(SUBSIDY, to)?;

    let data = match data {
        Some(data) if !data.is_empty() => data.to_vec(),
        _ => {
            let mut random = [0u8; COINBASE_DATA_LEN];
            rand::thread_rng().fill_bytes(&mut random);
            hex::encode(random).into_bytes()
        }
    };

    let input = TxInput {
        prev_tx_id: Vec::new(),
        output_index: COINBASE_OUTPUT_INDEX,
        signature: None,
        public_key: Some(data),
    };

    let mut tx = Transaction::new(vec![input], vec![output]);
    tx.assign_id();
    info!(tx = %tx.id_hex(), to, reward = SUBSIDY, "coinbase created");
    Ok(tx)
}

/// Builds and signs a transfer of `amount` from `wallet` to `to`.
///
/// Inputs are the outputs chosen by `utxo.select_spendable`, each carrying
/// the sender's public key. The recipient output comes first; a change
/// output back to the sender follows when the selection overshoots.
///
/// # Errors
///
/// - [`TransactionError::InvalidAddress`] if `to` does not decode.
/// - [`TransactionError::ZeroAmount`] if `amount` is zero.
/// - [`TransactionError::InsufficientFunds`] if the sender's unspent
///   outputs do not cover `amount`. Nothing is signed in that case.
/// - [`TransactionError::MissingReference`] if the index cannot resolve a
///   selected output for signing.
pub fn new_spend(
    wallet: &Wallet,
    to: &str,
    amount: u64,
    utxo: &dyn UtxoIndex,
) -> Result<Transaction, TransactionError> {
    let recipient = output_to(amount, to)?;
    if amount == 0 {
        return Err(TransactionError::ZeroAmount);
    }

    let pub_key_hash = wallet.pub_key_hash();
    let selection = utxo.select_spendable(&pub_key_hash, amount)?;
    if !selection.covers(amount) {
        return Err(TransactionError::InsufficientFunds {
            available: selection.accumulated,
            required: amount,
        });
    }

    let public_key = wallet.public_key();
    let mut inputs = Vec::with_capacity(selection.output_count());
    for (tx_id, indices) in &selection.outputs {
        let prev_tx_id = hex::decode(tx_id)
            .map_err(|e| TransactionError::UtxoIndex(format!("bad transaction id {tx_id}: {e}")))?;
        for &index in indices {
            inputs.push(TxInput::new(prev_tx_id.clone(), index, public_key.clone()));
        }
    }

    let mut outputs = vec![recipient];
    let change = selection.accumulated - amount;
    if change > 0 {
        outputs.push(TxOutput::to_key_hash(change, pub_key_hash));
    }

    let mut tx = Transaction::new(inputs, outputs);
    tx.assign_id();

    let prev_txs = utxo.resolve_prior_outputs(&tx)?;
    sign_transaction(&mut tx, wallet.keypair(), &prev_txs)?;

    info!(
        tx = %tx.id_hex(),
        from = wallet.address(),
        to,
        amount,
        change,
        inputs = tx.inputs.len(),
        size = tx.size(),
        "spend created"
    );
    Ok(tx)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
