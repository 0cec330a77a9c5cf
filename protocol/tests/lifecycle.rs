//! End-to-end tests for the transaction core.
//!
//! Each test builds its own wallets, UTXO set and (where persistence is
//! involved) a temporary sled database, then drives records through
//! coinbase → spend → sign → verify → admission → queue.

use std::sync::Arc;
use std::thread;

use swarm_protocol::queue::{pending_in, MemorySubmissionQueue};
use swarm_protocol::storage::{SledKeyStore, SledSubmissionQueue, SwarmDB};
use swarm_protocol::transaction::{
    admit, new_coinbase, new_spend, sign_transaction, verify_transaction, AdmissionOutcome,
    Transaction, TransactionError, TxInput, TxOutput,
};
use swarm_protocol::utxo::{MemoryUtxoSet, UtxoIndex};
use swarm_protocol::wallet::{MemoryKeyStore, Wallets};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// A wallet registry with `n` fresh wallets, returned with their addresses.
fn wallets(n: usize) -> (Wallets, Vec<String>) {
    let mut wallets = Wallets::load(Arc::new(MemoryKeyStore::new())).expect("load");
    let addresses = (0..n)
        .map(|_| wallets.create_wallet().expect("create wallet"))
        .collect();
    (wallets, addresses)
}

/// Mints a single output of exactly `value` to `address` and indexes it.
fn fund(utxo: &MemoryUtxoSet, address: &str, value: u64) -> Transaction {
    let mut tx = new_coinbase(address, None).expect("coinbase");
    tx.outputs[0].value = value;
    tx.assign_id();
    utxo.apply(&tx).expect("apply funding");
    tx
}

fn verifies(tx: &Transaction, utxo: &MemoryUtxoSet) -> bool {
    let prev_txs = utxo.resolve_prior_outputs(tx).expect("resolve");
    verify_transaction(tx, &prev_txs).expect("verify")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn insufficient_then_sufficient_spend() {
    let (wallets, addrs) = wallets(2);
    let (alice, bob) = (&addrs[0], &addrs[1]);
    let sender = wallets.get(alice).unwrap();
    let utxo = MemoryUtxoSet::new();
    fund(&utxo, alice, 100);

    let err = new_spend(sender, bob, 150, &utxo).unwrap_err();
    assert!(matches!(
        err,
        TransactionError::InsufficientFunds {
            available: 100,
            required: 150
        }
    ));

    let tx = new_spend(sender, bob, 60, &utxo).unwrap();
    assert_eq!(tx.outputs.len(), 2);
    assert_eq!(tx.outputs[0].value, 60);
    assert!(tx.outputs[0].is_locked_with_key(&wallets.get(bob).unwrap().pub_key_hash()));
    assert_eq!(tx.outputs[1].value, 40);
    assert!(tx.outputs[1].is_locked_with_key(&sender.pub_key_hash()));
    assert!(verifies(&tx, &utxo));
    assert_eq!(admit(&tx, &utxo).unwrap(), AdmissionOutcome::Accepted);
}

#[test]
fn value_moves_along_a_chain_of_spends() {
    let (wallets, addrs) = wallets(3);
    let utxo = MemoryUtxoSet::new();
    fund(&utxo, &addrs[0], 50);

    let first = new_spend(wallets.get(&addrs[0]).unwrap(), &addrs[1], 35, &utxo).unwrap();
    assert!(admit(&first, &utxo).unwrap().is_accepted());
    utxo.apply(&first).unwrap();

    let second = new_spend(wallets.get(&addrs[1]).unwrap(), &addrs[2], 20, &utxo).unwrap();
    assert!(admit(&second, &utxo).unwrap().is_accepted());
    utxo.apply(&second).unwrap();

    let balance = |i: usize| utxo.balance(&wallets.get(&addrs[i]).unwrap().pub_key_hash());
    assert_eq!(balance(0), 15);
    assert_eq!(balance(1), 15);
    assert_eq!(balance(2), 20);

    // The first spend's input is gone, so replaying it no longer passes.
    assert_eq!(
        admit(&first, &utxo).unwrap(),
        AdmissionOutcome::InsufficientFunds
    );
}

#[test]
fn signed_spend_survives_the_wire() {
    let (wallets, addrs) = wallets(2);
    let utxo = MemoryUtxoSet::new();
    fund(&utxo, &addrs[0], 100);
    let tx = new_spend(wallets.get(&addrs[0]).unwrap(), &addrs[1], 10, &utxo).unwrap();

    let bytes = tx.serialize();
    let decoded = Transaction::deserialize(&bytes).unwrap();
    assert_eq!(decoded, tx);
    assert_eq!(decoded.size(), bytes.len() as u64);
    assert_eq!(decoded.identity_hash(), tx.identity_hash());
    assert!(verifies(&decoded, &utxo));

    assert!(matches!(
        Transaction::deserialize(&bytes[..bytes.len() - 1]),
        Err(swarm_protocol::transaction::CodecError::Truncated { .. })
    ));
}

#[test]
fn tampered_amount_fails_verification_and_admission() {
    let (wallets, addrs) = wallets(2);
    let utxo = MemoryUtxoSet::new();
    fund(&utxo, &addrs[0], 100);
    let mut tx = new_spend(wallets.get(&addrs[0]).unwrap(), &addrs[1], 10, &utxo).unwrap();

    tx.outputs[0].value = 90;
    assert!(!verifies(&tx, &utxo));
    assert_eq!(
        admit(&tx, &utxo).unwrap(),
        AdmissionOutcome::InvalidSignature
    );
}

#[test]
fn self_addressed_spend_is_refused() {
    let (wallets, addrs) = wallets(1);
    let utxo = MemoryUtxoSet::new();
    fund(&utxo, &addrs[0], 100);

    let tx = new_spend(wallets.get(&addrs[0]).unwrap(), &addrs[0], 100, &utxo).unwrap();
    assert!(verifies(&tx, &utxo));
    assert_eq!(admit(&tx, &utxo).unwrap(), AdmissionOutcome::SelfTransfer);
}

#[test]
fn size_is_consistent_across_threads() {
    let (wallets, addrs) = wallets(2);
    let utxo = MemoryUtxoSet::new();
    for _ in 0..8 {
        fund(&utxo, &addrs[0], 5);
    }
    let tx = new_spend(wallets.get(&addrs[0]).unwrap(), &addrs[1], 40, &utxo).unwrap();
    tx.invalidate_size();

    let shared = Arc::new(tx);
    let sizes: Vec<u64> = (0..8)
        .map(|_| {
            let tx = Arc::clone(&shared);
            thread::spawn(move || tx.size())
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().expect("size thread"))
        .collect();

    let expected = shared.serialize().len() as u64;
    assert!(sizes.iter().all(|&s| s == expected));
}

#[test]
fn pending_spend_lands_in_queues() {
    let (wallets, addrs) = wallets(2);
    let utxo = MemoryUtxoSet::new();
    let funding = fund(&utxo, &addrs[0], 100);
    let tx = new_spend(wallets.get(&addrs[0]).unwrap(), &addrs[1], 10, &utxo).unwrap();

    let memory = MemorySubmissionQueue::new();
    assert!(pending_in(&tx, &memory).unwrap());
    assert_eq!(memory.dequeue(), Some((1, funding.id.clone())));

    let db = SwarmDB::open_temporary().unwrap();
    let durable = SledSubmissionQueue::new(db).unwrap();
    assert!(pending_in(&tx, &durable).unwrap());
    assert_eq!(durable.dequeue().unwrap(), Some((1, funding.id)));
}

#[test]
fn persisted_wallet_can_spend_after_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let utxo = MemoryUtxoSet::new();

    let (alice, bob) = {
        let store = SledKeyStore::new(SwarmDB::open(dir.path()).unwrap()).unwrap();
        let mut wallets = Wallets::load(Arc::new(store)).unwrap();
        (wallets.create_wallet().unwrap(), wallets.create_wallet().unwrap())
    };
    fund(&utxo, &alice, 70);

    let store = SledKeyStore::new(SwarmDB::open(dir.path()).unwrap()).unwrap();
    let wallets = Wallets::load(Arc::new(store)).unwrap();
    let tx = new_spend(wallets.get(&alice).unwrap(), &bob, 25, &utxo).unwrap();
    assert!(verifies(&tx, &utxo));
    assert!(admit(&tx, &utxo).unwrap().is_accepted());
}

#[test]
fn coinbase_is_admitted_without_priors() {
    let (_, addrs) = wallets(1);
    let utxo = MemoryUtxoSet::new();
    let cb = new_coinbase(&addrs[0], Some(b"block 1")).unwrap();
    assert!(cb.is_coinbase());
    assert!(verifies(&cb, &utxo));
    assert_eq!(admit(&cb, &utxo).unwrap(), AdmissionOutcome::Accepted);
}

#[test]
fn one_output_cannot_fund_two_inputs() {
    let (wallets, addrs) = wallets(2);
    let alice = wallets.get(&addrs[0]).unwrap();
    let bob = wallets.get(&addrs[1]).unwrap();
    let utxo = MemoryUtxoSet::new();
    let funding = fund(&utxo, &addrs[0], 50);

    let mut tx = Transaction::new(
        vec![
            TxInput::new(funding.id.clone(), 0, alice.public_key()),
            TxInput::new(funding.id.clone(), 0, alice.public_key()),
        ],
        vec![TxOutput::to_key_hash(100, bob.pub_key_hash())],
    );
    tx.assign_id();
    let prev_txs = utxo.resolve_prior_outputs(&tx).unwrap();
    sign_transaction(&mut tx, alice.keypair(), &prev_txs).unwrap();

    assert_eq!(
        admit(&tx, &utxo).unwrap(),
        AdmissionOutcome::InsufficientFunds
    );
    assert!(utxo.apply(&tx).is_err());
    assert_eq!(utxo.balance(&bob.pub_key_hash()), 0);
    assert_eq!(utxo.balance(&alice.pub_key_hash()), 50);
}

#[test]
fn inputless_record_is_not_admitted() {
    let (_, addrs) = wallets(1);
    let utxo = MemoryUtxoSet::new();
    let owner = swarm_protocol::wallet::pub_key_hash_from_address(&addrs[0]).unwrap();

    let mut tx = Transaction::new(vec![], vec![TxOutput::to_key_hash(1_000_000, owner)]);
    tx.assign_id();
    assert!(!tx.is_coinbase());
    assert!(!verifies(&tx, &utxo));
    assert_eq!(
        admit(&tx, &utxo).unwrap(),
        AdmissionOutcome::InvalidSignature
    );
}
