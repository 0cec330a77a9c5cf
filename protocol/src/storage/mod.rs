//! # Storage Module
//!
//! Durable adapters for the traits the core consumes, all backed by one
//! sled database.
//!
//! ```text
//! db.rs       — SwarmDB handle and DbError
//! keystore.rs — SledKeyStore: wallet secret keys keyed by address
//! queue.rs    — SledSubmissionQueue: priority-ordered pending payloads
//! ```
//!
//! The transaction core itself never opens a database. The node binary
//! builds these adapters and injects them as `Arc<dyn KeyStore>` or
//! `&dyn SubmissionQueue`.

pub mod db;
pub mod keystore;
pub mod queue;

pub use db::{DbError, DbResult, SwarmDB};
pub use keystore::{KeyRecord, SledKeyStore};
pub use queue::SledSubmissionQueue;
