// Copyright (c) 2026 SwarmChain Developers. MIT License.
// See LICENSE for details.

//! # SwarmChain Node
//!
//! Entry point for the `swarm-node` binary. Parses CLI arguments,
//! initializes logging, opens the node's key store when a command needs
//! it, and dispatches to the transaction core.
//!
//! - `create-wallet`    — generate and persist a wallet
//! - `list-addresses`   — list the key store
//! - `validate-address` — check an address
//! - `coinbase`         — build a reward transaction
//! - `decode`           — inspect a hex-encoded transaction
//! - `demo`             — in-memory end-to-end round

mod cli;
mod logging;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use swarm_protocol::config::key_store_name;
use swarm_protocol::queue::{pending_in, MemorySubmissionQueue};
use swarm_protocol::storage::{SledKeyStore, SwarmDB};
use swarm_protocol::transaction::{
    admit, new_coinbase, new_spend, verify_transaction, Transaction,
};
use swarm_protocol::utxo::{MemoryUtxoSet, UtxoIndex};
use swarm_protocol::wallet::{validate_address, MemoryKeyStore, Wallets};

use cli::{Commands, SwarmNodeCli};

fn main() -> Result<()> {
    let cli = SwarmNodeCli::parse();
    logging::init_logging(logging::DEFAULT_DIRECTIVES, cli.log_format);

    match cli.command {
        Commands::CreateWallet => create_wallet(&cli.data_dir, &cli.node_id),
        Commands::ListAddresses => list_addresses(&cli.data_dir, &cli.node_id),
        Commands::ValidateAddress { address } => validate(&address),
        Commands::Coinbase(args) => coinbase(&args.to, args.data.as_deref()),
        Commands::Decode { hex, json } => decode(&hex, json),
        Commands::Demo(args) => demo(args.amount),
    }
}

/// Opens the sled-backed wallet registry for `node_id` under `data_dir`.
fn open_wallets(data_dir: &Path, node_id: &str) -> Result<Wallets> {
    let path = data_dir.join(key_store_name(node_id));
    std::fs::create_dir_all(&path)
        .with_context(|| format!("failed to create key store directory {}", path.display()))?;

    let db = SwarmDB::open(&path)
        .with_context(|| format!("failed to open key store at {}", path.display()))?;
    let store = SledKeyStore::new(db).context("failed to open key tree")?;
    tracing::debug!(path = %path.display(), "key store opened");

    Wallets::load(Arc::new(store)).context("failed to load wallets")
}

fn create_wallet(data_dir: &Path, node_id: &str) -> Result<()> {
    let mut wallets = open_wallets(data_dir, node_id)?;
    let address = wallets.create_wallet().context("failed to create wallet")?;
    println!("Your new address: {address}");
    Ok(())
}

fn list_addresses(data_dir: &Path, node_id: &str) -> Result<()> {
    let wallets = open_wallets(data_dir, node_id)?;
    for address in wallets.addresses() {
        println!("{address}");
    }
    Ok(())
}

fn validate(address: &str) -> Result<()> {
    if !validate_address(address) {
        bail!("address {address} is not valid");
    }
    println!("{address} is valid");
    Ok(())
}

fn coinbase(to: &str, data: Option<&str>) -> Result<()> {
    let tx = new_coinbase(to, data.map(str::as_bytes)).context("failed to build coinbase")?;
    print!("{tx}");
    println!("{}", hex::encode(tx.serialize()));
    Ok(())
}

fn decode(encoded: &str, json: bool) -> Result<()> {
    let bytes = hex::decode(encoded.trim()).context("input is not hex")?;
    let tx = Transaction::deserialize(&bytes).context("failed to decode transaction")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tx)?);
        return Ok(());
    }
    print!("{tx}");
    println!("size: {} bytes, coinbase: {}", tx.size(), tx.is_coinbase());
    Ok(())
}

/// Mints to a fresh wallet, spends part of it to another, then verifies,
/// admits and queues the spend. Nothing touches disk.
fn demo(amount: u64) -> Result<()> {
    let mut wallets = Wallets::load(Arc::new(MemoryKeyStore::new()))?;
    let alice = wallets.create_wallet()?;
    let bob = wallets.create_wallet()?;
    let sender = wallets
        .get(&alice)
        .context("freshly created wallet is missing")?;

    let utxo = MemoryUtxoSet::new();
    let reward = new_coinbase(&alice, None)?;
    utxo.apply(&reward)?;

    let spend = new_spend(sender, &bob, amount, &utxo)?;
    let prev_txs = utxo.resolve_prior_outputs(&spend)?;
    let verified = verify_transaction(&spend, &prev_txs)?;
    let outcome = admit(&spend, &utxo)?;

    let queue = MemorySubmissionQueue::new();
    pending_in(&spend, &queue)?;
    utxo.apply(&spend)?;

    print!("{spend}");
    println!("verified: {verified}");
    println!("admission: {outcome:?}");
    println!("queued: {}", queue.len());
    println!("unspent outputs: {}", utxo.unspent_count());
    if let Some(indexed) = utxo.transaction(&spend.id_hex()) {
        println!("indexed spend size: {} bytes", indexed.size());
    }
    for address in [&alice, &bob] {
        let hash = swarm_protocol::wallet::pub_key_hash_from_address(address)?;
        println!("balance of {address}: {}", utxo.balance(&hash));
    }
    Ok(())
}
