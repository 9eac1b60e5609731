// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the SmartQueue service.

use thiserror::Error;

use crate::types::OrderStatus;

/// The primary error type used across SmartQueue crates and core operations.
#[derive(Debug, Error)]
pub enum SmartqueueError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The referenced canteen does not resolve in the registry.
    #[error("unknown canteen: {id}")]
    UnknownCanteen { id: String },

    /// A lookup by id missed (token, canteen, history record).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The requested status transition is not an edge of the lifecycle graph.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Gateway errors (bind failure, server error).
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failures of the wait-time predictor capability.
///
/// Deliberately a separate type from [`SmartqueueError`]: predictor failures
/// are fully absorbed by the estimate fallback chain inside the queue engine
/// and never cross the engine boundary. Success and failure are structural —
/// callers never inspect response text to decide whether a call worked.
#[derive(Debug, Error)]
pub enum PredictorError {
    /// The capability is not configured, the transport failed, or the API
    /// returned an error status.
    #[error("predictor unavailable: {message}")]
    Unavailable { message: String },

    /// The API returned a success status but the body did not match the
    /// requested schema (missing fields, unparsable JSON, out-of-range values).
    #[error("malformed predictor response: {detail}")]
    Malformed { detail: String },
}
