// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the SmartQueue service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level SmartQueue configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmartqueueConfig {
    /// Service identity and gateway settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Wait-time predictor (Gemini) settings.
    #[serde(default)]
    pub predictor: PredictorConfig,

    /// Queue engine tuning.
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Service identity and gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service instance.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Address the gateway binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
            bind_address: default_bind_address(),
        }
    }
}

fn default_service_name() -> String {
    "smartqueue".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("smartqueue").join("smartqueue.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("smartqueue.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Wait-time predictor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PredictorConfig {
    /// Gemini API key. `None` disables the capability entirely — the engine
    /// then runs on local heuristics alone.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier for estimation and advisory requests.
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL (overridable for self-hosted proxies).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Queue engine tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Placeholder estimate assigned at token creation, before the
    /// asynchronous refinement lands.
    #[serde(default = "default_initial_estimate_minutes")]
    pub initial_estimate_minutes: u32,

    /// Assumed preparation time when an item has no history yet.
    #[serde(default = "default_prep_minutes")]
    pub default_prep_minutes: u32,

    /// Maximum retained history records (oldest evicted first).
    #[serde(default = "default_history_retention")]
    pub history_retention: u32,

    /// First business hour shown on the traffic histogram (inclusive).
    #[serde(default = "default_open_hour")]
    pub open_hour: u32,

    /// Last business hour shown on the traffic histogram (inclusive).
    #[serde(default = "default_close_hour")]
    pub close_hour: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_estimate_minutes: default_initial_estimate_minutes(),
            default_prep_minutes: default_prep_minutes(),
            history_retention: default_history_retention(),
            open_hour: default_open_hour(),
            close_hour: default_close_hour(),
        }
    }
}

fn default_initial_estimate_minutes() -> u32 {
    5
}

fn default_prep_minutes() -> u32 {
    8
}

fn default_history_retention() -> u32 {
    1000
}

fn default_open_hour() -> u32 {
    9
}

fn default_close_hour() -> u32 {
    18
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = SmartqueueConfig::default();
        assert_eq!(config.service.name, "smartqueue");
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.engine.initial_estimate_minutes, 5);
        assert_eq!(config.engine.default_prep_minutes, 8);
        assert_eq!(config.engine.history_retention, 1000);
        assert_eq!(config.engine.open_hour, 9);
        assert_eq!(config.engine.close_hour, 18);
        assert!(config.predictor.api_key.is_none());
    }

    #[test]
    fn sections_deserialize_from_toml() {
        let toml_str = r#"
[service]
name = "north-campus"
bind_address = "0.0.0.0:9090"

[predictor]
api_key = "test-key"
model = "gemini-test"

[engine]
history_retention = 50
"#;
        let config: SmartqueueConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.service.name, "north-campus");
        assert_eq!(config.service.bind_address, "0.0.0.0:9090");
        assert_eq!(config.predictor.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.predictor.model, "gemini-test");
        assert_eq!(config.engine.history_retention, 50);
        // Untouched sections keep defaults.
        assert_eq!(config.storage.database_path, StorageConfig::default().database_path);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml_str = r#"
[service]
naem = "typo"
"#;
        let result = toml::from_str::<SmartqueueConfig>(toml_str);
        assert!(result.is_err(), "unknown key should be rejected");
    }
}
