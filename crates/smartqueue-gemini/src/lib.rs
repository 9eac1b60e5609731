// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini-backed predictor adapter for SmartQueue.
//!
//! Implements [`PredictorAdapter`] over the `generateContent` API with
//! schema-constrained JSON responses. Failure handling is structural:
//! transport and API errors surface as [`PredictorError::Unavailable`],
//! while success bodies that miss required fields or carry out-of-range
//! values surface as [`PredictorError::Malformed`]. The queue engine treats
//! both identically, so nothing here ever inspects response text for
//! failure markers.

pub mod client;
pub mod types;

use async_trait::async_trait;
use chrono::Local;
use tracing::debug;

use smartqueue_config::model::PredictorConfig;
use smartqueue_core::{
    CompletionAdvice, Estimate, HistoryEstimate, HistoryRecord, PredictorAdapter, PredictorError,
    QueueStats,
};

use crate::client::GeminiClient;
use crate::types::{AdvicePayload, EstimatePayload, HistoryEstimatePayload, Schema};

/// Assumed prep time fed to prompts when an item has no history.
const DEFAULT_PREP_MINUTES: u32 = 8;
/// Upper sanity bound for predicted minutes; beyond it the response is
/// treated as malformed.
const MAX_ESTIMATE_MINUTES: u32 = 240;
/// Reasoning used when the model omits one.
const DEFAULT_REASONING: &str = "Calculating based on live traffic.";

/// Wait-time predictor backed by the Gemini API.
pub struct GeminiPredictor {
    client: GeminiClient,
}

impl GeminiPredictor {
    /// Build a predictor from configuration.
    ///
    /// Returns `Ok(None)` when no API key is configured — the capability is
    /// then absent and the engine runs on local heuristics.
    pub fn from_config(config: &PredictorConfig) -> Result<Option<Self>, PredictorError> {
        let Some(api_key) = config.api_key.as_deref() else {
            return Ok(None);
        };
        let client = GeminiClient::new(
            api_key,
            &config.model,
            &config.base_url,
            config.timeout_secs,
        )?;
        Ok(Some(Self { client }))
    }

    #[cfg(test)]
    fn with_client(client: GeminiClient) -> Self {
        Self { client }
    }

    /// Validate a predicted minute count into the accepted range.
    fn checked_minutes(minutes: Option<u32>) -> Result<u32, PredictorError> {
        match minutes {
            Some(m) if (1..=MAX_ESTIMATE_MINUTES).contains(&m) => Ok(m),
            Some(m) => Err(PredictorError::Malformed {
                detail: format!("estimatedMinutes {m} outside 1..={MAX_ESTIMATE_MINUTES}"),
            }),
            None => Err(PredictorError::Malformed {
                detail: "estimatedMinutes missing".to_string(),
            }),
        }
    }
}

fn estimate_schema() -> Schema {
    Schema::object(&[
        ("estimatedMinutes", Schema::integer()),
        ("reasoning", Schema::string()),
    ])
}

fn history_estimate_schema() -> Schema {
    Schema::object(&[
        ("estimatedMinutes", Schema::integer()),
        ("reasoning", Schema::string()),
        ("isPeakHour", Schema::boolean()),
    ])
}

fn advice_schema() -> Schema {
    Schema::object(&[
        ("shouldComplete", Schema::boolean()),
        ("reasoning", Schema::string()),
    ])
}

fn baseline_prompt(queue_length: u32, food_item: &str) -> String {
    let now = Local::now();
    format!(
        "You are an AI managing a university canteen queue.\n\
         Context:\n\
         - Queue: {queue_length} people\n\
         - Item: \"{food_item}\"\n\
         - Time: {}, {}\n\n\
         Task: Estimate the wait time in minutes and give a 1-sentence \
         friendly reason for the student.\n\
         Example reason: \"It's lunch rush, so grills are busy!\"",
        now.format("%A"),
        now.format("%H:%M"),
    )
}

fn history_prompt(food_item: &str, queue_length: u32, history: &[HistoryRecord]) -> String {
    let avg_prep = if history.is_empty() {
        DEFAULT_PREP_MINUTES
    } else {
        let total: u64 = history.iter().map(|h| u64::from(h.prep_time_minutes)).sum();
        (total as f64 / history.len() as f64).round() as u32
    };
    let now = Local::now();
    format!(
        "You are an AI that predicts food preparation times in a university canteen.\n\
         Context:\n\
         - Food item: \"{food_item}\"\n\
         - Queue length: {queue_length} people\n\
         - Current time: {} on {}\n\
         - Historical orders for this item: {}\n\
         - Average prep time: {avg_prep} minutes\n\
         - Usual peak hours: 11:00-14:00 and 17:00-19:00\n\n\
         Task: Predict the wait in minutes, considering peak hours (add \
         30-50% during peaks), queue length (each person adds 2-3 minutes), \
         and the item's historical prep time. Also judge whether the current \
         hour is a peak hour.",
        now.format("%H:%M"),
        now.format("%A"),
        history.len(),
    )
}

fn advice_prompt(
    food_item: &str,
    estimated_minutes: u32,
    actual_minutes: u32,
    is_ready: bool,
) -> String {
    format!(
        "You are a smart queue management AI for a university canteen.\n\
         Order details:\n\
         - Food item: \"{food_item}\"\n\
         - Estimated wait: {estimated_minutes} minutes\n\
         - Actual wait so far: {actual_minutes} minutes\n\
         - Ready for pickup: {is_ready}\n\n\
         Task: Decide whether this order should be marked complete now. If \
         it is ready for pickup and the actual wait has reached the \
         estimate, it is likely complete. Give a 1-sentence explanation."
    )
}

fn summary_prompt(stats: &QueueStats) -> String {
    format!(
        "Analyze these canteen queue statistics and provide brief insights:\n\
         - Total orders today: {}\n\
         - Average wait: {:.0} minutes\n\
         - Active queue: {}\n\
         - Peak hour: {}\n\n\
         Provide 3 bullet points about queue efficiency and suggestions. \
         Keep each point under 20 words.",
        stats.total_orders_today,
        stats.average_wait_minutes,
        stats.active_queue_length,
        stats.peak_hour.as_deref().unwrap_or("none yet"),
    )
}

#[async_trait]
impl PredictorAdapter for GeminiPredictor {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn predict_baseline(
        &self,
        queue_length: u32,
        food_item: &str,
    ) -> Result<Estimate, PredictorError> {
        let prompt = baseline_prompt(queue_length, food_item);
        let text = self.client.generate_json(&prompt, estimate_schema()).await?;
        let payload: EstimatePayload =
            serde_json::from_str(&text).map_err(|e| PredictorError::Malformed {
                detail: format!("baseline payload: {e}"),
            })?;
        let minutes = Self::checked_minutes(payload.estimated_minutes)?;
        debug!(minutes, food_item, "baseline prediction");
        Ok(Estimate {
            minutes,
            reasoning: payload
                .reasoning
                .unwrap_or_else(|| DEFAULT_REASONING.to_string()),
        })
    }

    async fn predict_with_history(
        &self,
        food_item: &str,
        queue_length: u32,
        history: &[HistoryRecord],
    ) -> Result<HistoryEstimate, PredictorError> {
        let prompt = history_prompt(food_item, queue_length, history);
        let text = self
            .client
            .generate_json(&prompt, history_estimate_schema())
            .await?;
        let payload: HistoryEstimatePayload =
            serde_json::from_str(&text).map_err(|e| PredictorError::Malformed {
                detail: format!("history payload: {e}"),
            })?;
        let minutes = Self::checked_minutes(payload.estimated_minutes)?;
        let is_peak_hour = payload.is_peak_hour.ok_or_else(|| PredictorError::Malformed {
            detail: "isPeakHour missing".to_string(),
        })?;
        debug!(minutes, is_peak_hour, food_item, "history-informed prediction");
        Ok(HistoryEstimate {
            minutes,
            reasoning: payload
                .reasoning
                .unwrap_or_else(|| DEFAULT_REASONING.to_string()),
            is_peak_hour,
        })
    }

    async fn advise_completion(
        &self,
        food_item: &str,
        estimated_minutes: u32,
        actual_minutes: u32,
        is_ready: bool,
    ) -> Result<CompletionAdvice, PredictorError> {
        let prompt = advice_prompt(food_item, estimated_minutes, actual_minutes, is_ready);
        let text = self.client.generate_json(&prompt, advice_schema()).await?;
        let payload: AdvicePayload =
            serde_json::from_str(&text).map_err(|e| PredictorError::Malformed {
                detail: format!("advice payload: {e}"),
            })?;
        let should_complete = payload
            .should_complete
            .ok_or_else(|| PredictorError::Malformed {
                detail: "shouldComplete missing".to_string(),
            })?;
        Ok(CompletionAdvice {
            should_complete,
            reasoning: payload
                .reasoning
                .unwrap_or_else(|| DEFAULT_REASONING.to_string()),
        })
    }

    async fn summarize_queue(&self, stats: &QueueStats) -> Result<String, PredictorError> {
        let text = self.client.generate_text(&summary_prompt(stats)).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(PredictorError::Malformed {
                detail: "empty summary".to_string(),
            });
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn predictor(base_url: &str) -> GeminiPredictor {
        let client = GeminiClient::new("test-key", "gemini-test", "https://unused.invalid", 5)
            .unwrap()
            .with_base_url(base_url.to_string());
        GeminiPredictor::with_client(client)
    }

    fn candidate_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}]}}]
        })
    }

    async fn mount_response(server: &MockServer, text: &str) {
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(text)))
            .mount(server)
            .await;
    }

    fn record(prep: u32) -> HistoryRecord {
        HistoryRecord {
            id: "h-1".into(),
            food_item: "Vada Pav".into(),
            prep_time_minutes: prep,
            hour_of_day: 12,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn from_config_without_key_disables_the_capability() {
        let config = PredictorConfig::default();
        assert!(GeminiPredictor::from_config(&config).unwrap().is_none());

        let with_key = PredictorConfig {
            api_key: Some("key".into()),
            ..PredictorConfig::default()
        };
        assert!(GeminiPredictor::from_config(&with_key).unwrap().is_some());
    }

    #[test]
    fn prompts_carry_their_context() {
        let prompt = baseline_prompt(4, "Vada Pav");
        assert!(prompt.contains("Queue: 4 people"));
        assert!(prompt.contains("\"Vada Pav\""));

        let prompt = history_prompt("Vada Pav", 2, &[record(4), record(6)]);
        assert!(prompt.contains("Average prep time: 5 minutes"));
        assert!(prompt.contains("Historical orders for this item: 2"));

        let prompt = history_prompt("Vada Pav", 2, &[]);
        assert!(prompt.contains("Average prep time: 8 minutes"), "default prep");

        let prompt = advice_prompt("Samosa", 10, 12, true);
        assert!(prompt.contains("Estimated wait: 10 minutes"));
        assert!(prompt.contains("Actual wait so far: 12 minutes"));
        assert!(prompt.contains("Ready for pickup: true"));
    }

    #[tokio::test]
    async fn baseline_parses_valid_payload() {
        let server = MockServer::start().await;
        mount_response(
            &server,
            r#"{"estimatedMinutes": 12, "reasoning": "lunch rush"}"#,
        )
        .await;

        let estimate = predictor(&server.uri())
            .predict_baseline(4, "Vada Pav")
            .await
            .unwrap();
        assert_eq!(estimate.minutes, 12);
        assert_eq!(estimate.reasoning, "lunch rush");
    }

    #[tokio::test]
    async fn baseline_missing_minutes_is_malformed() {
        let server = MockServer::start().await;
        mount_response(&server, r#"{"reasoning": "no number"}"#).await;

        let err = predictor(&server.uri())
            .predict_baseline(4, "Vada Pav")
            .await
            .unwrap_err();
        assert!(matches!(err, PredictorError::Malformed { .. }));
    }

    #[tokio::test]
    async fn out_of_range_minutes_is_malformed() {
        let server = MockServer::start().await;
        mount_response(&server, r#"{"estimatedMinutes": 5000, "reasoning": "??"}"#).await;

        let err = predictor(&server.uri())
            .predict_baseline(4, "Vada Pav")
            .await
            .unwrap_err();
        match err {
            PredictorError::Malformed { detail } => {
                assert!(detail.contains("5000"), "got: {detail}");
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn history_estimate_requires_peak_flag() {
        let server = MockServer::start().await;
        mount_response(&server, r#"{"estimatedMinutes": 14}"#).await;

        let err = predictor(&server.uri())
            .predict_with_history("Vada Pav", 3, &[record(5)])
            .await
            .unwrap_err();
        assert!(matches!(err, PredictorError::Malformed { .. }));
    }

    #[tokio::test]
    async fn history_estimate_parses_valid_payload() {
        let server = MockServer::start().await;
        mount_response(
            &server,
            r#"{"estimatedMinutes": 14, "reasoning": "peak surge", "isPeakHour": true}"#,
        )
        .await;

        let estimate = predictor(&server.uri())
            .predict_with_history("Vada Pav", 3, &[record(5)])
            .await
            .unwrap();
        assert_eq!(estimate.minutes, 14);
        assert!(estimate.is_peak_hour);
    }

    #[tokio::test]
    async fn advice_parses_and_defaults_reasoning() {
        let server = MockServer::start().await;
        mount_response(&server, r#"{"shouldComplete": true}"#).await;

        let advice = predictor(&server.uri())
            .advise_completion("Samosa", 5, 7, true)
            .await
            .unwrap();
        assert!(advice.should_complete);
        assert_eq!(advice.reasoning, DEFAULT_REASONING);
    }

    #[tokio::test]
    async fn summary_returns_trimmed_text() {
        let server = MockServer::start().await;
        mount_response(&server, "  - Queue is healthy\n").await;

        let stats = QueueStats {
            total_orders_today: 10,
            active_queue_length: 3,
            average_wait_minutes: 6.0,
            peak_hour: Some("12 PM".into()),
        };
        let summary = predictor(&server.uri()).summarize_queue(&stats).await.unwrap();
        assert_eq!(summary, "- Queue is healthy");
    }
}
