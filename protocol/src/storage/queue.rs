//! sled-backed [`SubmissionQueue`].
//!
//! Keys are `priority (8B BE) ‖ seq (8B BE)` with `seq` drawn from sled's
//! monotonic id generator, so a forward scan of the tree is exactly the
//! dispatch order: lowest priority first, FIFO within a priority.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sled::Tree;

use super::db::{DbError, SwarmDB};
use crate::queue::{QueueError, SubmissionQueue};

const QUEUE_TREE: &str = "submission_queue";

/// Durable priority queue in the `submission_queue` tree.
#[derive(Debug, Clone)]
pub struct SledSubmissionQueue {
    db: SwarmDB,
    entries: Tree,
    closed: Arc<AtomicBool>,
}

impl SledSubmissionQueue {
    pub fn new(db: SwarmDB) -> Result<Self, DbError> {
        let entries = db.open_tree(QUEUE_TREE)?;
        Ok(Self {
            db,
            entries,
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Removes and returns the next `(priority, payload)` entry.
    pub fn dequeue(&self) -> Result<Option<(u64, Vec<u8>)>, QueueError> {
        let Some((key, payload)) = self.entries.pop_min().map_err(backend)? else {
            return Ok(None);
        };
        let priority = key
            .get(..8)
            .and_then(|bytes| <[u8; 8]>::try_from(bytes).ok())
            .map(u64::from_be_bytes)
            .ok_or_else(|| QueueError::Backend("malformed queue key".to_string()))?;
        Ok(Some((priority, payload.to_vec())))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn backend(err: impl std::fmt::Display) -> QueueError {
    QueueError::Backend(err.to_string())
}

impl SubmissionQueue for SledSubmissionQueue {
    fn enqueue(&self, priority: u64, payload: Vec<u8>) -> Result<(), QueueError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(QueueError::Closed);
        }
        let seq = self.db.generate_id().map_err(backend)?;
        let mut key = [0u8; 16];
        key[..8].copy_from_slice(&priority.to_be_bytes());
        key[8..].copy_from_slice(&seq.to_be_bytes());
        self.entries.insert(key, payload).map_err(backend)?;
        Ok(())
    }

    fn close(&self) -> Result<(), QueueError> {
        self.closed.store(true, Ordering::Release);
        self.db.flush().map_err(backend)
    }
}
