// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Predictor adapter trait for wait-time estimation providers.

use async_trait::async_trait;

use crate::error::PredictorError;
use crate::types::{CompletionAdvice, Estimate, HistoryEstimate, HistoryRecord, QueueStats};

/// Adapter for external wait-time estimation providers.
///
/// Every operation is best-effort: the queue engine wraps each call in a
/// fallback chain and treats any [`PredictorError`] — unavailable or
/// malformed alike — as "try the next tier". Implementations must never
/// block order placement; the engine only invokes them from asynchronous
/// refinement tasks and advisory paths.
#[async_trait]
pub trait PredictorAdapter: Send + Sync {
    /// Returns the human-readable name of this predictor instance.
    fn name(&self) -> &str;

    /// Estimates wait time from the current queue length alone.
    async fn predict_baseline(
        &self,
        queue_length: u32,
        food_item: &str,
    ) -> Result<Estimate, PredictorError>;

    /// Estimates wait time using recent preparation history for the item.
    ///
    /// `history` is pre-filtered to the given food item and capped at the
    /// store's retention window.
    async fn predict_with_history(
        &self,
        food_item: &str,
        queue_length: u32,
        history: &[HistoryRecord],
    ) -> Result<HistoryEstimate, PredictorError>;

    /// Recommends whether an order should be marked complete now.
    ///
    /// The recommendation is advisory: staff intent always wins.
    async fn advise_completion(
        &self,
        food_item: &str,
        estimated_minutes: u32,
        actual_minutes: u32,
        is_ready: bool,
    ) -> Result<CompletionAdvice, PredictorError>;

    /// Produces a short natural-language summary of a canteen's queue
    /// statistics for the admin dashboard.
    async fn summarize_queue(&self, stats: &QueueStats) -> Result<String, PredictorError>;
}
