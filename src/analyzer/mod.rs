//! Analyzer subprocess subsystem.
//!
//! # Data Flow
//! ```text
//! AnalyzerConfig
//!     → command.rs (argument list, user dictionary path)
//!     → process.rs (spawn once, capture stdin/stdout)
//!     → channel.rs (PipeChannel: one line in, one line out)
//! ```
//!
//! # Design Decisions
//! - Launched exactly once; a crash is never restarted
//! - The pipe protocol has no request ids, so ordering is everything

pub mod channel;
pub mod command;
pub mod process;

pub use channel::PipeChannel;
pub use process::{AnalyzerProcess, LaunchError};
