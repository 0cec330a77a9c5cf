//! Signature and ownership verification.
//!
//! [`verify_transaction`] answers one question: was every input signed by
//! the owner of the output it spends? It returns `Ok(false)` for anything
//! cryptographically wrong and reserves `Err` for missing prior data.
//!
//! [`passes_self_transfer_policy`] is a separate admission rule, not a
//! cryptographic one; [`super::admission`] composes both with the funds
//! check.

use tracing::debug;

use super::error::TransactionError;
use super::signing::{resolve_all, signing_message, PrevTransactions};
use super::types::Transaction;
use crate::crypto::keys;
use crate::wallet::address::hash_pub_key;

/// Verifies every input signature of `tx`.
///
/// For each input, in order:
///
/// 1. Signature and public key must be present.
/// 2. The public key must hash to the owner hash of the spent output.
/// 3. The `r || s` signature must verify over the input's signing message
///    (trimmed view, owner hash substituted into this input's key field).
///
/// The first failing input makes the whole transaction invalid. Coinbase
/// transactions verify trivially; any other transaction without inputs is
/// invalid.
///
/// # Errors
///
/// [`TransactionError::MissingReference`] if any input's previous output is
/// absent from `prev_txs`. Checked for all inputs before any signature work.
pub fn verify_transaction(
    tx: &Transaction,
    prev_txs: &PrevTransactions,
) -> Result<bool, TransactionError> {
    if tx.is_coinbase() {
        return Ok(true);
    }
    if tx.inputs.is_empty() {
        debug!(tx = %tx.id_hex(), "transaction has no inputs");
        return Ok(false);
    }

    let spent = resolve_all(tx, prev_txs)?;

    let mut trimmed = tx.trimmed_view();
    for (index, (input, output)) in tx.inputs.iter().zip(spent).enumerate() {
        let (Some(signature), Some(public_key)) = (&input.signature, &input.public_key) else {
            debug!(tx = %tx.id_hex(), input = index, "input is unsigned");
            return Ok(false);
        };

        if hash_pub_key(public_key) != output.owner_hash {
            debug!(tx = %tx.id_hex(), input = index, "public key does not own spent output");
            return Ok(false);
        }

        let message = signing_message(&mut trimmed, index, &output.owner_hash);
        if !keys::verify(public_key, &message, signature) {
            debug!(tx = %tx.id_hex(), input = index, "signature does not verify");
            return Ok(false);
        }
    }

    Ok(true)
}

/// Rejects a transaction whose first output pays one of its own inputs' keys.
///
/// Only `outputs[0]` is inspected: change outputs back to the sender are
/// expected to sit at later positions. Coinbase transactions and
/// transactions without outputs pass.
pub fn passes_self_transfer_policy(tx: &Transaction) -> bool {
    if tx.is_coinbase() {
        return true;
    }
    let Some(first) = tx.outputs.first() else {
        return true;
    };
    !tx.inputs.iter().any(|input| input.uses_key(&first.owner_hash))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::Keypair;
    use crate::transaction::signing::sign_transaction;
    use crate::transaction::types::{TxInput, TxOutput};

    struct Fixture {
        owner: Keypair,
        prev: Transaction,
        tx: Transaction,
    }

    impl Fixture {
        fn prev_txs(&self) -> PrevTransactions {
            PrevTransactions::from([(self.prev.id_hex(), self.prev.clone())])
        }
    }

    /// A funded output of 100 and a signed spend of it: 60 out, 40 change.
    fn signed() -> Fixture {
        let owner = Keypair::generate();
        let owner_hash = hash_pub_key(&owner.public_key());

        let mut prev = Transaction::with_timestamp(
            vec![TxInput {
                prev_tx_id: vec![],
                output_index: -1,
                signature: None,
                public_key: Some(b"reward".to_vec()),
            }],
            vec![TxOutput::to_key_hash(100, owner_hash.clone())],
            1_700_000_000,
        );
        prev.assign_id();

        let mut tx = Transaction::with_timestamp(
            vec![TxInput::new(prev.id.clone(), 0, owner.public_key())],
            vec![
                TxOutput::to_key_hash(60, vec![0x77; 20]),
                TxOutput::to_key_hash(40, owner_hash),
            ],
            1_700_000_060,
        );
        tx.assign_id();

        let mut fixture = Fixture { owner, prev, tx };
        let prev_txs = fixture.prev_txs();
        sign_transaction(&mut fixture.tx, &fixture.owner, &prev_txs).unwrap();
        fixture
    }

    fn flip_bit(bytes: &mut [u8], bit: usize) {
        bytes[bit / 8] ^= 1 << (bit % 8);
    }

    #[test]
    fn signed_transaction_verifies() {
        let f = signed();
        assert!(verify_transaction(&f.tx, &f.prev_txs()).unwrap());
    }

    #[test]
    fn verification_is_repeatable() {
        let f = signed();
        let prev_txs = f.prev_txs();
        let id = f.tx.identity_hash();
        assert!(verify_transaction(&f.tx, &prev_txs).unwrap());
        assert!(verify_transaction(&f.tx, &prev_txs).unwrap());
        assert_eq!(f.tx.identity_hash(), id);
    }

    #[test]
    fn tampered_output_value_fails() {
        let f = signed();
        for bit in [0, 5, 63] {
            let mut tx = f.tx.clone();
            tx.outputs[0].value ^= 1 << bit;
            assert!(!verify_transaction(&tx, &f.prev_txs()).unwrap());
        }
    }

    #[test]
    fn tampered_owner_hash_fails() {
        let f = signed();
        for output in 0..2 {
            for bit in [0, 77, 159] {
                let mut tx = f.tx.clone();
                flip_bit(&mut tx.outputs[output].owner_hash, bit);
                assert!(!verify_transaction(&tx, &f.prev_txs()).unwrap());
            }
        }
    }

    #[test]
    fn tampered_signature_fails() {
        let f = signed();
        for bit in [0, 100, 255, 256, 511] {
            let mut tx = f.tx.clone();
            flip_bit(tx.inputs[0].signature.as_mut().unwrap(), bit);
            assert!(!verify_transaction(&tx, &f.prev_txs()).unwrap());
        }
    }

    #[test]
    fn tampered_timestamp_fails() {
        let f = signed();
        let mut tx = f.tx.clone();
        tx.timestamp += 1;
        assert!(!verify_transaction(&tx, &f.prev_txs()).unwrap());
    }

    #[test]
    fn unsigned_input_fails() {
        let f = signed();
        let mut tx = f.tx.clone();
        tx.inputs[0].signature = None;
        assert!(!verify_transaction(&tx, &f.prev_txs()).unwrap());
    }

    #[test]
    fn signature_by_non_owner_fails() {
        let f = signed();
        let thief = Keypair::generate();
        let mut tx = f.tx.clone();
        tx.inputs[0].public_key = Some(thief.public_key());
        sign_transaction(&mut tx, &thief, &f.prev_txs()).unwrap();
        assert!(!verify_transaction(&tx, &f.prev_txs()).unwrap());
    }

    #[test]
    fn missing_prev_tx_is_an_error_not_false() {
        let f = signed();
        let err = verify_transaction(&f.tx, &PrevTransactions::new()).unwrap_err();
        assert!(matches!(err, TransactionError::MissingReference { .. }));
    }

    #[test]
    fn coinbase_verifies_regardless_of_priors() {
        let f = signed();
        assert!(verify_transaction(&f.prev, &PrevTransactions::new()).unwrap());
        assert!(verify_transaction(&f.prev, &f.prev_txs()).unwrap());
    }

    #[test]
    fn self_transfer_in_first_output_rejected() {
        let f = signed();
        assert!(passes_self_transfer_policy(&f.tx));

        let mut tx = f.tx.clone();
        tx.outputs.swap(0, 1);
        assert!(!passes_self_transfer_policy(&tx));
    }

    #[test]
    fn self_transfer_policy_exempts_coinbase_and_empty_outputs() {
        let f = signed();
        assert!(passes_self_transfer_policy(&f.prev));

        let mut tx = f.tx.clone();
        tx.outputs.clear();
        assert!(passes_self_transfer_policy(&tx));
    }

    #[test]
    fn inputless_transaction_is_invalid() {
        let mut tx = Transaction::new(vec![], vec![TxOutput::to_key_hash(1_000_000, vec![0x77; 20])]);
        tx.assign_id();
        assert!(!tx.is_coinbase());
        assert!(!verify_transaction(&tx, &PrevTransactions::new()).unwrap());
    }
}
