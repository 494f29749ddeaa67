//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request for the analyzer:
//!     → gate.rs (wait for the single admission slot)
//!     → timeouts.rs (run the exchange on its own task, race the deadline)
//!     → slot released when the exchange task ends, not when the caller leaves
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every exchange has a deadline
//! - No retries: a failed exchange is reported as-is
//! - A timed-out exchange keeps the slot until the analyzer actually answers,
//!   trading tail latency for never handing one caller's answer to another

pub mod gate;
pub mod timeouts;

pub use gate::{GatePermit, RequestGate};
pub use timeouts::TimeoutGuard;
