use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

/// A rendered message waiting for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub agent_name: String,
    pub message: String,
    /// Position in the global enqueue order.
    pub seq: u64,
    pub enqueued_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    items: VecDeque<QueueItem>,
    next_seq: u64,
}

/// Unbounded FIFO shared by every agent (producers) and the dispatcher
/// (single consumer). Cloning shares the same queue.
#[derive(Debug, Clone, Default)]
pub struct DeliveryQueue {
    inner: Arc<Mutex<Inner>>,
}

impl DeliveryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a message. Returns its sequence number.
    pub fn push(&self, agent_name: &str, message: String) -> u64 {
        let mut inner = self.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.items.push_back(QueueItem {
            agent_name: agent_name.to_string(),
            message,
            seq,
            enqueued_at: Utc::now(),
        });
        seq
    }

    /// Take everything currently queued, oldest first. Items pushed while the
    /// caller works through the batch wait for the next drain.
    pub fn drain(&self) -> Vec<QueueItem> {
        self.lock().items.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }
}
