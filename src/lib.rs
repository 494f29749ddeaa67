//! HTTP gateway in front of a line-oriented morphological analyzer.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use analyzer::PipeChannel;
pub use config::GatewayConfig;
pub use error::ExchangeError;
pub use gateway::Gateway;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
