//! Timeout enforcement.
//!
//! # Responsibilities
//! - Run a unit of work on its own task
//! - Race its completion against a deadline
//! - Release the caller on expiry without stopping the work
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timed-out work is detached, not aborted: aborting a half-finished
//!   exchange would leave an unread answer in the pipe for the next caller
//! - Whatever the work owns (the gate permit in particular) is held until the
//!   work really ends, or until the grace period after the deadline runs out
//! - Work still running after the grace period is dropped, which releases
//!   what it owns; the channel it was using reports itself out of sync
//! - Late outcomes are logged and dropped

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::ExchangeError;

/// Grace period after the deadline, as a multiple of the deadline, unless
/// set explicitly.
pub const DEFAULT_GRACE_FACTOR: u32 = 4;

/// Races detached work against a fixed deadline.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutGuard {
    deadline: Duration,
    grace: Duration,
}

impl TimeoutGuard {
    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            grace: deadline * DEFAULT_GRACE_FACTOR,
        }
    }

    /// Replace the grace period given to timed-out work.
    pub fn with_grace(self, grace: Duration) -> Self {
        Self { grace, ..self }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Spawn `work` and wait for it for at most the deadline.
    ///
    /// Returns the work's own result when it finishes in time,
    /// [`ExchangeError::Timeout`] when the deadline passes first, or
    /// [`ExchangeError::Aborted`] when the task panics. Timed-out work keeps
    /// running for up to the grace period, then is dropped.
    pub async fn run<T, Fut>(&self, work: Fut) -> Result<T, ExchangeError>
    where
        Fut: Future<Output = Result<T, ExchangeError>> + Send + 'static,
        T: Send + 'static,
    {
        let abandoned = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&abandoned);
        let deadline = self.deadline;
        let lifetime = self.deadline + self.grace;

        let task = tokio::spawn(async move {
            let outcome = match tokio::time::timeout(lifetime, work).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(
                        lifetime_ms = lifetime.as_millis() as u64,
                        "Abandoned exchange outlived its grace period, dropping it"
                    );
                    return Err(ExchangeError::Timeout(deadline));
                }
            };
            if flag.load(Ordering::SeqCst) {
                match &outcome {
                    Ok(_) => tracing::debug!("Late exchange completed, result discarded"),
                    Err(e) => tracing::debug!(error = %e, "Late exchange failed, error discarded"),
                }
            }
            outcome
        });

        match tokio::time::timeout(self.deadline, task).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_error)) => Err(ExchangeError::Aborted(join_error.to_string())),
            Err(_) => {
                abandoned.store(true, Ordering::SeqCst);
                Err(ExchangeError::Timeout(self.deadline))
            }
        }
    }
}
