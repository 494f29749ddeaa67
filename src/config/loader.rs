//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Enable context-based homonym resolution.
pub const ENV_HOMONYMS_DETECTION: &str = "HOMONYMS_DETECTION";
/// Glue grammemes of one lemma together.
pub const ENV_GLUE_GRAMMEMES: &str = "GLUE_GRAMMEMES";
/// File name of a user dictionary inside the dictionary directory.
pub const ENV_USER_DICT: &str = "USER_DICT";
/// Exchange deadline in milliseconds.
pub const ENV_TIMEOUT: &str = "TIMEOUT";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{key} must be {expected}, got '{value}'")]
    Env {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, and validate the result.
///
/// `env` looks up a variable by name; pass `|k| std::env::var(k).ok()` in
/// production.
pub fn load_config<F>(path: Option<&Path>, env: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay the analyzer environment variables onto `config`.
///
/// Flags are enabled only by `true` or `yes` (any case); any other value,
/// including an empty one, disables them.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = env(ENV_HOMONYMS_DETECTION) {
        config.analyzer.homonyms_detection = is_true(&value);
    }
    if let Some(value) = env(ENV_GLUE_GRAMMEMES) {
        config.analyzer.glue_grammemes = is_true(&value);
    }
    if let Some(value) = env(ENV_USER_DICT) {
        config.analyzer.user_dict = Some(value);
    }
    if let Some(value) = env(ENV_TIMEOUT) {
        config.timeouts.exchange_ms = value.trim().parse().map_err(|_| ConfigError::Env {
            key: ENV_TIMEOUT,
            value,
            expected: "an integer number of milliseconds",
        })?;
    }
    Ok(())
}

/// Interpret an environment flag.
pub fn is_true(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "yes"
}
