// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./smartqueue.toml` > `~/.config/smartqueue/smartqueue.toml`
//! > `/etc/smartqueue/smartqueue.toml` with environment variable overrides via
//! `SMARTQUEUE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SmartqueueConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/smartqueue/smartqueue.toml` (system-wide)
/// 3. `~/.config/smartqueue/smartqueue.toml` (user XDG config)
/// 4. `./smartqueue.toml` (local directory)
/// 5. `SMARTQUEUE_*` environment variables
pub fn load_config() -> Result<SmartqueueConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SmartqueueConfig::default()))
        .merge(Toml::file("/etc/smartqueue/smartqueue.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("smartqueue/smartqueue.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("smartqueue.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<SmartqueueConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SmartqueueConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SmartqueueConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SmartqueueConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `SMARTQUEUE_STORAGE_DATABASE_PATH` must
/// map to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("SMARTQUEUE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: SMARTQUEUE_PREDICTOR_API_KEY -> "predictor_api_key"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("predictor_", "predictor.", 1)
            .replacen("engine_", "engine.", 1);
        mapped.into()
    })
}
