//! Error taxonomy for a single analyzer exchange.

use std::time::Duration;

/// Errors surfaced by the exchange path (channel, gate, timeout guard).
///
/// None of these are fatal to the service. Each is translated into an HTTP
/// status and a log line at the boundary, and nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// The caller submitted an empty `text` field. The pipe is never touched.
    #[error("Empty string")]
    EmptyInput,

    /// Writing to or reading from the analyzer pipe failed.
    ///
    /// Usually means the subprocess has exited; every later exchange will
    /// fail the same way until an operator restarts the service.
    #[error("analyzer pipe I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The analyzer did not answer before the request deadline.
    #[error("analyzer did not answer within {}ms", .0.as_millis())]
    Timeout(Duration),

    /// No admission slot became free within the configured queue bound.
    #[error("analyzer busy: no free slot within {}ms", .0.as_millis())]
    Busy(Duration),

    /// The detached exchange task ended without producing a result.
    #[error("exchange task failed: {0}")]
    Aborted(String),
}

impl ExchangeError {
    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ExchangeError::EmptyInput => "empty_input",
            ExchangeError::Io(_) => "io",
            ExchangeError::Timeout(_) => "timeout",
            ExchangeError::Busy(_) => "busy",
            ExchangeError::Aborted(_) => "aborted",
        }
    }
}
