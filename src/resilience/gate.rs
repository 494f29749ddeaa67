//! Single-slot admission gate.
//!
//! # Responsibilities
//! - Let exactly one caller at a time use the guarded resource
//! - Queue excess callers in arrival order
//! - Release the slot on every exit path
//!
//! # Design Decisions
//! - Built on tokio's fair `Mutex`, which owns the resource itself, so the
//!   resource cannot be reached without holding the slot
//! - Permits are owned (`'static`) and can move into a spawned task
//! - Waiting is unbounded unless the caller asks for `acquire_within`

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::ExchangeError;
use crate::observability::metrics;

/// Capacity-1 admission control around a resource.
#[derive(Debug)]
pub struct RequestGate<T> {
    slot: Arc<Mutex<T>>,
    waiting: Arc<AtomicUsize>,
}

impl<T> Clone for RequestGate<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            waiting: Arc::clone(&self.waiting),
        }
    }
}

impl<T> RequestGate<T> {
    /// Put `resource` behind the gate.
    pub fn new(resource: T) -> Self {
        Self {
            slot: Arc::new(Mutex::new(resource)),
            waiting: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wait for the slot. Callers are served in arrival order.
    pub async fn acquire(&self) -> GatePermit<T> {
        let _queued = WaitingGuard::enter(&self.waiting);
        let guard = Arc::clone(&self.slot).lock_owned().await;
        GatePermit { guard }
    }

    /// Wait for the slot for at most `limit`.
    ///
    /// On expiry the caller leaves the queue and gets [`ExchangeError::Busy`].
    pub async fn acquire_within(&self, limit: Duration) -> Result<GatePermit<T>, ExchangeError> {
        tokio::time::timeout(limit, self.acquire())
            .await
            .map_err(|_| ExchangeError::Busy(limit))
    }

    /// Take the slot only if it is free right now.
    pub fn try_acquire(&self) -> Option<GatePermit<T>> {
        Arc::clone(&self.slot)
            .try_lock_owned()
            .ok()
            .map(|guard| GatePermit { guard })
    }

    /// Number of callers currently queued for the slot.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}

/// Ownership of the gate's single slot.
///
/// Dropping the permit releases the slot, so it is returned even when the
/// holder errors out or panics.
#[derive(Debug)]
pub struct GatePermit<T> {
    guard: OwnedMutexGuard<T>,
}

impl<T> GatePermit<T> {
    /// Give the slot back explicitly.
    pub fn release(self) {
        drop(self);
    }
}

impl<T> Deref for GatePermit<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for GatePermit<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

/// Counts a queued caller; leaves the queue on drop, including cancellation.
///
/// Every change publishes the depth the counter itself reports.
struct WaitingGuard {
    waiting: Arc<AtomicUsize>,
}

impl WaitingGuard {
    fn enter(waiting: &Arc<AtomicUsize>) -> Self {
        let depth = waiting.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::record_gate_waiting(depth);
        Self {
            waiting: Arc::clone(waiting),
        }
    }
}

impl Drop for WaitingGuard {
    fn drop(&mut self) {
        let depth = self.waiting.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::record_gate_waiting(depth);
    }
}
