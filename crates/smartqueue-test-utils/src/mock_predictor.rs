// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock predictor adapter for deterministic testing.
//!
//! `MockPredictor` implements `PredictorAdapter` with pre-scripted outcomes,
//! enabling fast, CI-runnable engine tests without external API calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use smartqueue_core::{
    CompletionAdvice, Estimate, HistoryEstimate, HistoryRecord, PredictorAdapter, PredictorError,
    QueueStats,
};

/// A mock predictor that returns pre-scripted outcomes.
///
/// Outcomes are popped from per-operation FIFO queues. When a queue is
/// empty, the call fails with [`PredictorError::Unavailable`], which is also
/// how a fully unscripted mock simulates a dead capability.
#[derive(Default)]
pub struct MockPredictor {
    baselines: Mutex<VecDeque<Result<Estimate, PredictorError>>>,
    history_estimates: Mutex<VecDeque<Result<HistoryEstimate, PredictorError>>>,
    advice: Mutex<VecDeque<Result<CompletionAdvice, PredictorError>>>,
    summaries: Mutex<VecDeque<Result<String, PredictorError>>>,
    baseline_calls: AtomicU32,
    history_calls: AtomicU32,
    advice_calls: AtomicU32,
    summary_calls: AtomicU32,
}

fn unscripted() -> PredictorError {
    PredictorError::Unavailable {
        message: "no scripted response".to_string(),
    }
}

impl MockPredictor {
    /// Create a mock with no scripted outcomes (every call fails Unavailable).
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next baseline outcome.
    pub async fn push_baseline(&self, outcome: Result<Estimate, PredictorError>) {
        self.baselines.lock().await.push_back(outcome);
    }

    /// Script the next history-informed outcome.
    pub async fn push_history_estimate(&self, outcome: Result<HistoryEstimate, PredictorError>) {
        self.history_estimates.lock().await.push_back(outcome);
    }

    /// Script the next completion-advice outcome.
    pub async fn push_advice(&self, outcome: Result<CompletionAdvice, PredictorError>) {
        self.advice.lock().await.push_back(outcome);
    }

    /// Script the next queue-summary outcome.
    pub async fn push_summary(&self, outcome: Result<String, PredictorError>) {
        self.summaries.lock().await.push_back(outcome);
    }

    /// Number of `predict_baseline` calls observed.
    pub fn baseline_calls(&self) -> u32 {
        self.baseline_calls.load(Ordering::SeqCst)
    }

    /// Number of `predict_with_history` calls observed.
    pub fn history_calls(&self) -> u32 {
        self.history_calls.load(Ordering::SeqCst)
    }

    /// Number of `advise_completion` calls observed.
    pub fn advice_calls(&self) -> u32 {
        self.advice_calls.load(Ordering::SeqCst)
    }

    /// Number of `summarize_queue` calls observed.
    pub fn summary_calls(&self) -> u32 {
        self.summary_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PredictorAdapter for MockPredictor {
    fn name(&self) -> &str {
        "mock-predictor"
    }

    async fn predict_baseline(
        &self,
        _queue_length: u32,
        _food_item: &str,
    ) -> Result<Estimate, PredictorError> {
        self.baseline_calls.fetch_add(1, Ordering::SeqCst);
        self.baselines
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(unscripted()))
    }

    async fn predict_with_history(
        &self,
        _food_item: &str,
        _queue_length: u32,
        _history: &[HistoryRecord],
    ) -> Result<HistoryEstimate, PredictorError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.history_estimates
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(unscripted()))
    }

    async fn advise_completion(
        &self,
        _food_item: &str,
        _estimated_minutes: u32,
        _actual_minutes: u32,
        _is_ready: bool,
    ) -> Result<CompletionAdvice, PredictorError> {
        self.advice_calls.fetch_add(1, Ordering::SeqCst);
        self.advice
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(unscripted()))
    }

    async fn summarize_queue(&self, _stats: &QueueStats) -> Result<String, PredictorError> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        self.summaries
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(unscripted()))
    }
}
