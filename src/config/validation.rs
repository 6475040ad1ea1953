//! Configuration validation.
//!
//! Serde handles the syntactic checks; this module covers value ranges and
//! whether addresses and URLs parse. All errors are collected, not just the first.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ServiceConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} is not a valid socket address: {value}")]
    Address { field: &'static str, value: String },

    #[error("{field} is not a valid http(s) URL: {value}")]
    Url { field: &'static str, value: String },

    #[error("retries.base_delay_ms ({base}) exceeds retries.max_delay_ms ({max})")]
    DelayRange { base: u64, max: u64 },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    check_url(&mut errors, "upstream.movies_info_url", &config.upstream.movies_info_url);
    check_url(&mut errors, "upstream.reviews_url", &config.upstream.reviews_url);

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::Zero { field: "retries.max_attempts" });
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::DelayRange {
            base: config.retries.base_delay_ms,
            max: config.retries.max_delay_ms,
        });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.connect_secs" });
    }
    if config.broadcast.channel_capacity == 0 {
        errors.push(ValidationError::Zero { field: "broadcast.channel_capacity" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field,
            value: value.to_string(),
        });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let valid = Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base())
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::Url {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServiceConfig::default();
        config.retries.max_attempts = 0;
        config.retries.base_delay_ms = 5000;
        config.upstream.reviews_url = "not a url".to_string();
        config.broadcast.channel_capacity = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Zero { field: "retries.max_attempts" }));
        assert!(errors.contains(&ValidationError::DelayRange { base: 5000, max: 2000 }));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = ServiceConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].to_string(), "observability.metrics_address is not a valid socket address: nowhere");
    }
}
