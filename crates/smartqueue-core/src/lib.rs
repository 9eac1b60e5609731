// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the SmartQueue canteen ordering service.
//!
//! This crate provides the foundational error types, domain types, and the
//! predictor capability trait used throughout the SmartQueue workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{PredictorError, SmartqueueError};
pub use traits::PredictorAdapter;
pub use types::{
    Canteen, CanteenId, CompletionAdvice, Estimate, HistoryEstimate, HistoryRecord, MenuItem,
    OrderStatus, QueueStats, Token, TokenId, TrafficBucket, MENU_ITEMS,
};
