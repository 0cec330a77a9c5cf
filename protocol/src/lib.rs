// Copyright (c) 2026 SwarmChain Developers. MIT License.
// See LICENSE for details.

//! # Swarm Protocol — Transaction Core
//!
//! The UTXO transaction subsystem of a SwarmChain node: key material,
//! content-addressed transaction records, per-input ECDSA signing,
//! verification and admission.
//!
//! ## Architecture
//!
//! - **config** — Protocol constants (subsidy, key and hash sizes, address format).
//! - **crypto** — SHA-256 / HASH160 and secp256k1 key pairs.
//! - **wallet** — Addresses, the `KeyStore` seam and the wallet registry.
//! - **transaction** — Records, wire codec, construction, signing, verification, admission.
//! - **utxo** — The selector/index traits the core consumes, plus an in-memory set.
//! - **queue** — The submission-queue seam for pending payloads.
//! - **storage** — sled-backed key store and submission queue.
//!
//! ## Data Flow
//!
//! ```text
//! Wallet ──(address, pubkey)──► new_spend ◄── UtxoSelector
//!                                   │
//!                          sign_transaction
//!                                   │
//!             verify_transaction ◄──┴──► admit ◄── UtxoIndex
//! ```
//!
//! Nothing in `transaction` performs I/O. Persistence and the UTXO index
//! are injected through traits.

pub mod config;
pub mod crypto;
pub mod queue;
pub mod storage;
pub mod transaction;
pub mod utxo;
pub mod wallet;
