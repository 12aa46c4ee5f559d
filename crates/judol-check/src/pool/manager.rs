//! Worker pool for fetch tasks.
//!
//! Hands out a fixed number of slots; a task holds a slot for the duration
//! of its network call, so at most `size` fetches are in flight at once.

use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// A borrowed worker slot. Released when dropped.
pub struct WorkerSlot {
    _permit: tokio::sync::OwnedSemaphorePermit,
    active_count: Arc<AtomicUsize>,
}

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Fixed-size pool of worker slots.
#[derive(Debug)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    size: usize,
    active_count: Arc<AtomicUsize>,
    peak_count: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Create a pool with `size` slots (at least one).
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size,
            active_count: Arc::new(AtomicUsize::new(0)),
            peak_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Acquire a slot, waiting while all slots are busy.
    pub async fn acquire(&self) -> Result<WorkerSlot> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|e| anyhow::anyhow!("worker pool closed: {}", e))?;

        let active = self.active_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_count.fetch_max(active, Ordering::SeqCst);

        Ok(WorkerSlot {
            _permit: permit,
            active_count: Arc::clone(&self.active_count),
        })
    }

    /// Number of slots currently held.
    pub fn active(&self) -> usize {
        self.active_count.load(Ordering::SeqCst)
    }

    /// Highest number of slots held at the same time so far.
    pub fn peak(&self) -> usize {
        self.peak_count.load(Ordering::SeqCst)
    }

    /// Total slots.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Free slots.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
