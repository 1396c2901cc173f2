//! Bounded FIFO between request handlers and the delivery worker

use crossbeam_queue::ArrayQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Result of a non-blocking push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Enqueued,
    /// The oldest queued item was discarded to make room
    Evicted,
    /// The item could not be queued
    Dropped,
}

/// Fixed-capacity queue with drop-oldest overflow and an async consumer side
#[derive(Debug)]
pub struct DeliveryQueue<T> {
    items: ArrayQueue<T>,
    notify: Notify,
    closed: AtomicBool,
}

impl<T> DeliveryQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: ArrayQueue::new(capacity.max(1)),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Enqueue without blocking.
    ///
    /// When full, exactly one oldest entry is evicted and the push is retried
    /// once. If a concurrent producer wins the freed slot the item is dropped.
    pub fn push(&self, item: T) -> PushOutcome {
        if self.is_closed() {
            debug!("Delivery queue closed, dropping record");
            return PushOutcome::Dropped;
        }

        let outcome = match self.items.push(item) {
            Ok(()) => PushOutcome::Enqueued,
            Err(item) => {
                let _ = self.items.pop();
                warn!("Delivery queue full, evicted oldest record");
                match self.items.push(item) {
                    Ok(()) => PushOutcome::Evicted,
                    Err(_) => {
                        warn!("Failed to enqueue record after eviction, dropping it");
                        PushOutcome::Dropped
                    }
                }
            }
        };

        if outcome != PushOutcome::Dropped {
            self.notify.notify_one();
        }
        outcome
    }

    /// Next item without waiting
    pub fn try_pop(&self) -> Option<T> {
        self.items.pop()
    }

    /// Wait for the next item; `None` once the queue is closed
    pub async fn pop(&self) -> Option<T> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_closed() {
                return None;
            }
            if let Some(item) = self.items.pop() {
                return Some(item);
            }

            notified.await;
        }
    }

    /// Reject further pushes, discard queued items and wake the consumer
    pub fn close(&self) -> usize {
        self.closed.store(true, Ordering::Release);
        let mut discarded = 0;
        while self.items.pop().is_some() {
            discarded += 1;
        }
        self.notify.notify_waiters();
        discarded
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }
}
