//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, endpoint path).
    pub listener: ListenerConfig,

    /// How the analyzer subprocess is launched.
    pub analyzer: AnalyzerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Path of the analysis endpoint.
    pub path: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            path: "/mystem".to_string(),
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Analyzer subprocess configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Path to the analyzer executable.
    pub binary: String,

    /// Arguments always passed to the analyzer.
    pub base_args: Vec<String>,

    /// Resolve homonyms from context (`-d`).
    pub homonyms_detection: bool,

    /// Glue grammemes into a single attribute (`-g`).
    pub glue_grammemes: bool,

    /// File name of a user dictionary inside `dict_dir`.
    pub user_dict: Option<String>,

    /// Directory holding user dictionaries.
    pub dict_dir: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            binary: "./mystem".to_string(),
            base_args: ["-i", "--eng-gr", "--weight", "--format=json"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            homonyms_detection: false,
            glue_grammemes: false,
            user_dict: None,
            dict_dir: "/stem/dict".to_string(),
        }
    }
}

/// Timeout configuration for the exchange path.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for one exchange with the analyzer, in milliseconds.
    pub exchange_ms: u64,

    /// Upper bound on waiting for the admission slot, in milliseconds.
    /// Unset means requests queue for as long as it takes.
    pub queue_ms: Option<u64>,

    /// How long a timed-out exchange may keep the slot past its deadline
    /// waiting for the late answer, in milliseconds. Unset means four times
    /// `exchange_ms`.
    pub grace_ms: Option<u64>,
}

impl TimeoutConfig {
    pub fn exchange(&self) -> Duration {
        Duration::from_millis(self.exchange_ms)
    }

    pub fn queue(&self) -> Option<Duration> {
        self.queue_ms.map(Duration::from_millis)
    }

    pub fn grace(&self) -> Option<Duration> {
        self.grace_ms.map(Duration::from_millis)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            exchange_ms: 1000,
            queue_ms: None,
            grace_ms: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
