// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wait-time estimation with a strict three-tier fallback chain.
//!
//! 1. Historically-informed prediction via the configured predictor.
//! 2. On any predictor failure — unavailable or malformed alike — the
//!    simpler queue-length-only baseline prediction.
//! 3. On a second failure, or when no predictor is configured at all, a
//!    deterministic local heuristic.
//!
//! No tier may block order creation; every path returns an estimate, and
//! predictor errors never escape this module.

use std::sync::Arc;

use tracing::debug;

use smartqueue_core::{CompletionAdvice, Estimate, HistoryRecord, PredictorAdapter, QueueStats};

/// Floor of the queue-length baseline heuristic.
const MIN_BASELINE_MINUTES: u32 = 5;
/// Minutes each waiting person adds in the baseline heuristic.
const PER_PERSON_BASELINE_MINUTES: u32 = 3;
/// Minutes each waiting person adds in the history-informed heuristic.
const PER_PERSON_QUEUE_MINUTES: f64 = 2.5;
/// Surcharge applied to history-informed estimates during peak hours.
const PEAK_MULTIPLIER: f64 = 1.4;

/// Static reasoning attached to queue-length-only local estimates.
pub const BASELINE_REASONING: &str = "Estimated from current queue length.";
/// Static reasoning attached to locally-decided completion advice.
const ADVICE_REASONING: &str = "Order time threshold reached.";

/// Peak-hour rule: lunch (11-14) and dinner (17-19) windows, inclusive.
pub fn is_peak_hour(hour: u32) -> bool {
    (11..=14).contains(&hour) || (17..=19).contains(&hour)
}

/// Queue-length-only heuristic: `max(5, queue_length * 3)` minutes.
pub fn baseline_minutes(queue_length: u32) -> u32 {
    (queue_length * PER_PERSON_BASELINE_MINUTES).max(MIN_BASELINE_MINUTES)
}

/// History-informed heuristic: prep time plus queue time, with the peak
/// surcharge applied to the whole estimate.
fn history_minutes(avg_prep: u32, queue_length: u32, hour: u32) -> u32 {
    let base = f64::from(avg_prep) + f64::from(queue_length) * PER_PERSON_QUEUE_MINUTES;
    let multiplier = if is_peak_hour(hour) { PEAK_MULTIPLIER } else { 1.0 };
    (base * multiplier).round() as u32
}

/// Mean prep time over the item's history, or the configured default when
/// the item has none.
fn average_prep(history: &[&HistoryRecord], default_prep: u32) -> u32 {
    if history.is_empty() {
        return default_prep;
    }
    let total: u64 = history.iter().map(|h| u64::from(h.prep_time_minutes)).sum();
    (total as f64 / history.len() as f64).round() as u32
}

/// Runs the estimation fallback chain over an optional predictor.
#[derive(Clone)]
pub struct Estimator {
    predictor: Option<Arc<dyn PredictorAdapter>>,
    default_prep_minutes: u32,
}

impl Estimator {
    /// Create an estimator. `None` for the predictor means every estimate
    /// comes from the local tier.
    pub fn new(predictor: Option<Arc<dyn PredictorAdapter>>, default_prep_minutes: u32) -> Self {
        Self {
            predictor,
            default_prep_minutes,
        }
    }

    /// Whether an external predictor is configured.
    pub fn has_predictor(&self) -> bool {
        self.predictor.is_some()
    }

    /// Produce a wait estimate for one token, walking the fallback tiers.
    ///
    /// `history` is the retained window filtered to the food item; `hour` is
    /// the current local hour for peak detection.
    pub async fn estimate_wait(
        &self,
        food_item: &str,
        queue_length: u32,
        history: &[HistoryRecord],
        hour: u32,
    ) -> Estimate {
        if let Some(predictor) = &self.predictor {
            match predictor
                .predict_with_history(food_item, queue_length, history)
                .await
            {
                Ok(estimate) => {
                    return Estimate {
                        minutes: estimate.minutes,
                        reasoning: estimate.reasoning,
                    };
                }
                Err(e) => {
                    debug!(error = %e, food_item, "history-informed prediction failed, falling back");
                }
            }

            match predictor.predict_baseline(queue_length, food_item).await {
                Ok(estimate) => return estimate,
                Err(e) => {
                    debug!(error = %e, food_item, "baseline prediction failed, using local heuristic");
                }
            }
        }

        self.local_estimate(food_item, queue_length, history, hour)
    }

    /// The deterministic local tier.
    ///
    /// With no history for the item this is the plain queue-length baseline;
    /// with history it folds in the item's average prep time and the
    /// peak-hour surcharge.
    fn local_estimate(
        &self,
        food_item: &str,
        queue_length: u32,
        history: &[HistoryRecord],
        hour: u32,
    ) -> Estimate {
        let item_history: Vec<&HistoryRecord> = history
            .iter()
            .filter(|h| h.food_item == food_item)
            .collect();

        if item_history.is_empty() {
            return Estimate {
                minutes: baseline_minutes(queue_length),
                reasoning: BASELINE_REASONING.to_string(),
            };
        }

        let avg_prep = average_prep(&item_history, self.default_prep_minutes);
        let reasoning = if is_peak_hour(hour) {
            format!("{avg_prep} min prep + peak hour surge")
        } else {
            format!("{avg_prep} min prep + queue time")
        };
        Estimate {
            minutes: history_minutes(avg_prep, queue_length, hour),
            reasoning,
        }
    }

    /// Advise on completing an order now, falling back to the local
    /// threshold rule when the predictor is down or absent.
    pub async fn advise_completion(
        &self,
        food_item: &str,
        estimated_minutes: u32,
        actual_minutes: u32,
        is_ready: bool,
    ) -> CompletionAdvice {
        if let Some(predictor) = &self.predictor {
            match predictor
                .advise_completion(food_item, estimated_minutes, actual_minutes, is_ready)
                .await
            {
                Ok(advice) => return advice,
                Err(e) => {
                    debug!(error = %e, food_item, "completion advice failed, using local rule");
                }
            }
        }
        CompletionAdvice {
            should_complete: actual_minutes >= estimated_minutes && is_ready,
            reasoning: ADVICE_REASONING.to_string(),
        }
    }

    /// Ask the predictor for a queue summary. `None` on any failure or when
    /// the capability is absent — callers fall back to a local template.
    pub async fn summarize_queue(&self, stats: &QueueStats) -> Option<String> {
        let predictor = self.predictor.as_ref()?;
        match predictor.summarize_queue(stats).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                debug!(error = %e, "queue summary failed, using local template");
                None
            }
        }
    }
}
