//! # CLI Interface
//!
//! Command-line definition for `swarm-node`, via `clap` derive. Global
//! options select the data directory, the node id (which names the key
//! store) and the log format; each can also come from the environment.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// SwarmChain transaction node.
///
/// Manages wallets and builds, signs, verifies and inspects UTXO
/// transactions.
#[derive(Parser, Debug)]
#[command(
    name = "swarm-node",
    about = "SwarmChain transaction node",
    version,
    propagate_version = true
)]
pub struct SwarmNodeCli {
    /// Directory holding the node's sled databases.
    #[arg(long, short = 'd', global = true, env = "SWARM_DATA_DIR", default_value = ".swarm")]
    pub data_dir: PathBuf,

    /// Node identifier. Selects the key store (`wallet_<id>`, `:` → `_`).
    #[arg(long, global = true, env = "SWARM_NODE_ID", default_value = "3000")]
    pub node_id: String,

    /// Log output format.
    #[arg(long, global = true, env = "SWARM_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a wallet, persist its key and print its address.
    CreateWallet,
    /// Print every address in this node's key store.
    ListAddresses,
    /// Check an address' version byte and checksum.
    ValidateAddress {
        /// Base58Check address.
        address: String,
    },
    /// Build a coinbase transaction and print it with its hex encoding.
    Coinbase(CoinbaseArgs),
    /// Strictly decode a hex-encoded transaction and print it.
    Decode {
        /// Hex wire encoding.
        hex: String,

        /// Print the record as JSON instead of the text listing.
        #[arg(long)]
        json: bool,
    },
    /// Run an in-memory mint → spend → verify → admit round.
    Demo(DemoArgs),
}

/// Arguments for `coinbase`.
#[derive(Args, Debug)]
pub struct CoinbaseArgs {
    /// Address receiving the subsidy.
    #[arg(long)]
    pub to: String,

    /// Payload for the coinbase input. Random when omitted.
    #[arg(long)]
    pub data: Option<String>,
}

/// Arguments for `demo`.
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Amount the demo sender pays the recipient.
    #[arg(long, default_value_t = 30)]
    pub amount: u64,
}
