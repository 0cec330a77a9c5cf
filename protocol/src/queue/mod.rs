//! # Submission Queue
//!
//! Pending work is handed to an external dispatcher through a priority
//! queue. The core only needs two operations from it, [`SubmissionQueue::enqueue`]
//! and [`SubmissionQueue::close`]; durability and eviction belong to the
//! backend. Lower priority numbers are dispatched first and entries with
//! equal priority leave in arrival order.
//!
//! Backends:
//!
//! - [`MemorySubmissionQueue`] — a binary heap, for tests and the CLI demo.
//! - [`crate::storage::SledSubmissionQueue`] — sled-backed, survives restarts.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

use crate::config::PENDING_PRIORITY;
use crate::transaction::types::Transaction;

/// Errors returned by a submission queue backend.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("submission queue is closed")]
    Closed,

    #[error("queue backend error: {0}")]
    Backend(String),
}

/// A priority queue of opaque payloads.
pub trait SubmissionQueue: Send + Sync {
    /// Adds `payload` at `priority`.
    fn enqueue(&self, priority: u64, payload: Vec<u8>) -> Result<(), QueueError>;

    /// Stops accepting new entries and flushes whatever the backend buffers.
    /// Closing twice is not an error.
    fn close(&self) -> Result<(), QueueError>;
}

/// Queues the previous-transaction id of the first input of `tx` at
/// [`PENDING_PRIORITY`].
///
/// Returns `false` without touching the queue when `tx` has no inputs.
pub fn pending_in(tx: &Transaction, queue: &dyn SubmissionQueue) -> Result<bool, QueueError> {
    let Some(first) = tx.inputs.first() else {
        return Ok(false);
    };
    queue.enqueue(PENDING_PRIORITY, first.prev_tx_id.clone())?;
    debug!(tx = %tx.id_hex(), prev = %hex::encode(&first.prev_tx_id), "queued pending input");
    Ok(true)
}

// ---------------------------------------------------------------------------
// MemorySubmissionQueue
// ---------------------------------------------------------------------------

#[derive(Default)]
struct HeapState {
    heap: BinaryHeap<Reverse<(u64, u64, Vec<u8>)>>,
    seq: u64,
    closed: bool,
}

/// In-memory [`SubmissionQueue`] ordered by `(priority, arrival)`.
#[derive(Default)]
pub struct MemorySubmissionQueue {
    state: Mutex<HeapState>,
}

impl MemorySubmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the next `(priority, payload)` entry.
    pub fn dequeue(&self) -> Option<(u64, Vec<u8>)> {
        self.state
            .lock()
            .heap
            .pop()
            .map(|Reverse((priority, _, payload))| (priority, payload))
    }

    pub fn len(&self) -> usize {
        self.state.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl SubmissionQueue for MemorySubmissionQueue {
    fn enqueue(&self, priority: u64, payload: Vec<u8>) -> Result<(), QueueError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(QueueError::Closed);
        }
        let seq = state.seq;
        state.seq += 1;
        state.heap.push(Reverse((priority, seq, payload)));
        Ok(())
    }

    fn close(&self) -> Result<(), QueueError> {
        self.state.lock().closed = true;
        Ok(())
    }
}

impl std::fmt::Debug for MemorySubmissionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MemorySubmissionQueue")
            .field("len", &state.heap.len())
            .field("closed", &state.closed)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
