use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};

/// Entry in the work queue: a request sequence number, or a stop signal for
/// exactly one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkItem {
    Request(u64),
    Shutdown,
}

/// Unbounded multi-consumer FIFO shared by the worker pool.
pub struct WorkQueue {
    tx: Sender<WorkItem>,
    rx: Receiver<WorkItem>,
    unfinished: AtomicU64,
}

impl WorkQueue {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            tx,
            rx,
            unfinished: AtomicU64::new(0),
        }
    }

    /// Queue holding `Request(1..=total)` followed by one `Shutdown` per worker.
    pub fn seeded(total: u64, workers: usize) -> Self {
        let queue = Self::new();
        for id in 1..=total {
            queue.put(WorkItem::Request(id));
        }
        for _ in 0..workers {
            queue.put(WorkItem::Shutdown);
        }
        queue
    }

    pub fn put(&self, item: WorkItem) {
        if let WorkItem::Request(_) = item {
            self.unfinished.fetch_add(1, Ordering::AcqRel);
        }
        let _ = self.tx.send(item);
    }

    /// Block until an item is available.
    pub fn get(&self) -> WorkItem {
        // Unreachable disconnect (we hold a sender); treat as a stop signal.
        self.rx.recv().unwrap_or(WorkItem::Shutdown)
    }

    /// Acknowledge that a dequeued request has been fully processed.
    pub fn mark_done(&self) {
        let _ = self
            .unfinished
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }

    /// Requests put but not yet marked done.
    pub fn unfinished(&self) -> u64 {
        self.unfinished.load(Ordering::Acquire)
    }

    /// Items currently waiting, shutdown signals included.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}
