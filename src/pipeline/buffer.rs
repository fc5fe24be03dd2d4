//! Submission buffer
//!
//! Append-only, mutex-guarded queue of finalized records awaiting the next
//! periodic drain. Enqueueing never blocks; draining snapshots and clears
//! the queue atomically so the network call happens outside the lock.
//!
//! While no remote session exists the queue keeps accumulating, so it is
//! capped: past the limit the oldest record is evicted with a warning
//! rather than growing without bound.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::tracker_core::types::LootRecord;

/// Default maximum number of queued records.
pub const DEFAULT_QUEUE_LIMIT: usize = 10_000;

pub struct SubmissionBuffer {
    queued: Mutex<VecDeque<LootRecord>>,
    limit: usize,
}

impl SubmissionBuffer {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_QUEUE_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            limit,
        }
    }

    /// Append a record. Never blocks; evicts the oldest record past the cap.
    pub fn enqueue(&self, record: LootRecord) {
        let mut queued = self.queued.lock().unwrap();
        while queued.len() >= self.limit {
            if let Some(evicted) = queued.pop_front() {
                log::warn!(
                    "Submission queue full ({}), evicting oldest record: {}",
                    self.limit,
                    evicted.event_id
                );
            }
        }
        queued.push_back(record);
    }

    /// Atomically take and clear everything queued.
    pub fn drain(&self) -> Vec<LootRecord> {
        let mut queued = self.queued.lock().unwrap();
        queued.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queued.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.lock().unwrap().is_empty()
    }
}

impl Default for SubmissionBuffer {
    fn default() -> Self {
        Self::new()
    }
}
