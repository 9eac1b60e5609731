// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` API.
//!
//! Provides [`GeminiClient`] which handles request construction,
//! authentication, schema-constrained JSON responses, and transient error
//! retry. All failures are reported as [`PredictorError`]: transport and API
//! errors as `Unavailable`, schema-violating success bodies as `Malformed`.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use smartqueue_core::PredictorError;

use crate::types::{
    ApiErrorResponse, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part, Schema,
};

/// HTTP client for Gemini API communication.
///
/// Manages authentication headers, connection pooling, and retry logic for
/// transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    model: String,
    base_url: String,
    max_retries: u32,
}

impl GeminiClient {
    /// Creates a new Gemini API client.
    ///
    /// # Arguments
    /// * `api_key` - Gemini API key for authentication
    /// * `model` - Model identifier, e.g. `gemini-3-flash-preview`
    /// * `base_url` - API base, normally `https://generativelanguage.googleapis.com`
    /// * `timeout_secs` - Per-request timeout
    pub fn new(
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, PredictorError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key).map_err(|e| PredictorError::Unavailable {
                message: format!("invalid API key header value: {e}"),
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PredictorError::Unavailable {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Send a prompt constrained to a JSON response schema and return the
    /// raw JSON text of the first candidate.
    pub async fn generate_json(
        &self,
        prompt: &str,
        schema: Schema,
    ) -> Result<String, PredictorError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: schema,
            }),
        };
        self.generate(&request).await
    }

    /// Send a free-form prompt and return the first candidate's text.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, PredictorError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: None,
        };
        self.generate(&request).await
    }

    /// Send a request, retrying once after a 1-second delay on transient
    /// errors (429, 500, 503).
    async fn generate(&self, request: &GenerateContentRequest) -> Result<String, PredictorError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying prediction request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(request)
                .send()
                .await
                .map_err(|e| PredictorError::Unavailable {
                    message: format!("HTTP request failed: {e}"),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "prediction response received");

            if status.is_success() {
                let body = response
                    .text()
                    .await
                    .map_err(|e| PredictorError::Unavailable {
                        message: format!("failed to read response body: {e}"),
                    })?;
                let parsed: GenerateContentResponse =
                    serde_json::from_str(&body).map_err(|e| PredictorError::Malformed {
                        detail: format!("failed to parse API response: {e}"),
                    })?;
                return parsed
                    .first_text()
                    .map(str::to_string)
                    .ok_or_else(|| PredictorError::Malformed {
                        detail: "response carried no candidate text".to_string(),
                    });
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(PredictorError::Unavailable {
                    message: format!("API returned {status}: {body}"),
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            let body = response.text().await.unwrap_or_default();
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!(
                    "Gemini API error ({}): {}",
                    api_err.error.status, api_err.error.message
                )
            } else {
                format!("API returned {status}: {body}")
            };
            return Err(PredictorError::Unavailable { message });
        }

        Err(last_error.unwrap_or_else(|| PredictorError::Unavailable {
            message: "prediction request failed after retries".to_string(),
        }))
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
