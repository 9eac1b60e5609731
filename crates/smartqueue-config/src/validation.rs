// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses, sane business hours, and
//! non-zero retention windows.

use crate::diagnostic::ConfigError;
use crate::model::SmartqueueConfig;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &SmartqueueConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate log level is one of the known values.
    if !VALID_LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level `{}` is not one of: {}",
                config.service.log_level,
                VALID_LOG_LEVELS.join(", ")
            ),
        });
    }

    // Validate bind_address is host:port.
    let addr = config.service.bind_address.trim();
    if addr.is_empty() {
        errors.push(ConfigError::Validation {
            message: "service.bind_address must not be empty".to_string(),
        });
    } else if addr.parse::<std::net::SocketAddr>().is_err() && !looks_like_host_port(addr) {
        errors.push(ConfigError::Validation {
            message: format!("service.bind_address `{addr}` is not a valid host:port"),
        });
    }

    // Validate database_path is not empty.
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Validate predictor timeout.
    if config.predictor.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "predictor.timeout_secs must be at least 1".to_string(),
        });
    }

    // Validate engine tuning.
    if config.engine.history_retention == 0 {
        errors.push(ConfigError::Validation {
            message: "engine.history_retention must be at least 1".to_string(),
        });
    }

    if config.engine.initial_estimate_minutes == 0 {
        errors.push(ConfigError::Validation {
            message: "engine.initial_estimate_minutes must be at least 1".to_string(),
        });
    }

    if config.engine.open_hour > 23 || config.engine.close_hour > 23 {
        errors.push(ConfigError::Validation {
            message: format!(
                "engine business hours must be within 0-23, got open={} close={}",
                config.engine.open_hour, config.engine.close_hour
            ),
        });
    } else if config.engine.close_hour <= config.engine.open_hour {
        errors.push(ConfigError::Validation {
            message: format!(
                "engine.close_hour ({}) must be after engine.open_hour ({})",
                config.engine.close_hour, config.engine.open_hour
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Accept `hostname:port` forms that `SocketAddr` rejects (e.g. `localhost:8080`).
fn looks_like_host_port(addr: &str) -> bool {
    match addr.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty()
                && port.parse::<u16>().is_ok()
                && host
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
        }
        None => false,
    }
}
