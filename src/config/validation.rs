//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check the endpoint path can be mounted
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Filesystem checks (user dictionary) happen at launch, not here

use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),
    #[error("listener.path '{0}' must start with '/' and must not be '/health'")]
    EndpointPath(String),
    #[error("listener.max_body_bytes must be greater than zero")]
    BodyLimit,
    #[error("analyzer.binary must not be empty")]
    EmptyBinary,
    #[error("analyzer.user_dict '{0}' must be a plain file name")]
    UserDict(String),
    #[error("timeouts.exchange_ms must be greater than zero")]
    ExchangeTimeout,
    #[error("timeouts.queue_ms must be greater than zero when set")]
    QueueTimeout,
    #[error("timeouts.grace_ms must be greater than zero when set")]
    GracePeriod,
    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Check a loaded configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    let path = &config.listener.path;
    if !path.starts_with('/') || path == "/health" {
        errors.push(ValidationError::EndpointPath(path.clone()));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::BodyLimit);
    }

    if config.analyzer.binary.trim().is_empty() {
        errors.push(ValidationError::EmptyBinary);
    }
    if let Some(dict) = &config.analyzer.user_dict {
        if dict.is_empty() || dict.contains('/') || dict == ".." {
            errors.push(ValidationError::UserDict(dict.clone()));
        }
    }

    if config.timeouts.exchange_ms == 0 {
        errors.push(ValidationError::ExchangeTimeout);
    }
    if config.timeouts.queue_ms == Some(0) {
        errors.push(ValidationError::QueueTimeout);
    }
    if config.timeouts.grace_ms == Some(0) {
        errors.push(ValidationError::GracePeriod);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.listener.path = "mystem".into();
        config.timeouts.exchange_ms = 0;
        config.timeouts.queue_ms = Some(0);
        config.timeouts.grace_ms = Some(0);
        config.analyzer.user_dict = Some("../etc/passwd".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&ValidationError::ExchangeTimeout));
        assert!(errors.contains(&ValidationError::QueueTimeout));
        assert!(errors.contains(&ValidationError::GracePeriod));
    }

    #[test]
    fn test_health_path_is_reserved() {
        let mut config = GatewayConfig::default();
        config.listener.path = "/health".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::EndpointPath("/health".into())]);
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
