//! Request-serialization gateway.
//!
//! Collapses any number of concurrent callers onto the analyzer's single,
//! strictly ordered pipe:
//!
//! ```text
//! caller ─▶ empty check ─▶ RequestGate (FIFO, one slot)
//!                               │
//!                               ▼
//!                  TimeoutGuard (detached task owns the permit)
//!                               │
//!                               ▼
//!                 PipeChannel::exchange (write line, read line)
//! ```
//!
//! The permit moves into the exchange task, so after a timeout the slot stays
//! taken until the analyzer's late answer has been read and discarded. The
//! next caller therefore always reads its own line.
//!
//! An analyzer that stays silent past the grace period loses the exchange:
//! the task is dropped, the slot reopens, and the channel is out of sync, so
//! every later call fails fast with an I/O error.

use std::time::{Duration, Instant};

use crate::analyzer::PipeChannel;
use crate::config::TimeoutConfig;
use crate::error::ExchangeError;
use crate::observability::metrics;
use crate::resilience::{RequestGate, TimeoutGuard};

/// Serializes analysis requests onto one [`PipeChannel`].
#[derive(Debug)]
pub struct Gateway {
    gate: RequestGate<PipeChannel>,
    guard: TimeoutGuard,
    queue_limit: Option<Duration>,
}

impl Gateway {
    /// Build a gateway using the configured deadlines.
    pub fn new(channel: PipeChannel, timeouts: &TimeoutConfig) -> Self {
        let gateway = Self::with_limits(channel, timeouts.exchange(), timeouts.queue());
        match timeouts.grace() {
            Some(grace) => gateway.with_grace(grace),
            None => gateway,
        }
    }

    /// Build a gateway from explicit deadlines.
    pub fn with_limits(channel: PipeChannel, deadline: Duration, queue_limit: Option<Duration>) -> Self {
        Self {
            gate: RequestGate::new(channel),
            guard: TimeoutGuard::new(deadline),
            queue_limit,
        }
    }

    /// Replace how long a timed-out exchange may keep the slot.
    pub fn with_grace(self, grace: Duration) -> Self {
        Self {
            guard: self.guard.with_grace(grace),
            ..self
        }
    }

    /// Analyze one line of text.
    ///
    /// Empty input is rejected without queueing. Otherwise the call waits
    /// for the admission slot (bounded only if a queue limit is set), then
    /// gives the analyzer up to the deadline to answer.
    pub async fn analyze(&self, text: String) -> Result<String, ExchangeError> {
        if text.is_empty() {
            return Err(ExchangeError::EmptyInput);
        }

        let start = Instant::now();
        let result = self.exchange(text).await;
        metrics::record_exchange(
            match &result {
                Ok(_) => "ok",
                Err(e) => e.kind(),
            },
            start,
        );
        result
    }

    async fn exchange(&self, text: String) -> Result<String, ExchangeError> {
        let mut permit = match self.queue_limit {
            Some(limit) => self.gate.acquire_within(limit).await?,
            None => self.gate.acquire().await,
        };

        self.guard
            .run(async move { permit.exchange(&text).await })
            .await
    }

    /// Per-exchange deadline.
    pub fn deadline(&self) -> Duration {
        self.guard.deadline()
    }

    /// Callers currently queued for the analyzer.
    pub fn waiting(&self) -> usize {
        self.gate.waiting()
    }

    /// Whether the analyzer pipe is still usable. `None` while an exchange
    /// holds the slot.
    pub fn analyzer_in_sync(&self) -> Option<bool> {
        self.gate.try_acquire().map(|channel| channel.is_in_sync())
    }
}
