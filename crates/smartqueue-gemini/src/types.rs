// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request/response models for the Gemini `generateContent` API, plus the
//! typed payloads the estimation prompts request via response schemas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// One turn of content.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

/// A text part.
#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

/// Generation settings; used to force schema-constrained JSON output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Schema,
}

/// Minimal response-schema model (object/integer/string/boolean only).
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<&'static str, Schema>>,
}

impl Schema {
    /// An OBJECT schema with the given property schemas.
    pub fn object(properties: &[(&'static str, Schema)]) -> Self {
        Self {
            schema_type: "OBJECT",
            properties: Some(properties.iter().cloned().collect()),
        }
    }

    pub fn integer() -> Self {
        Self {
            schema_type: "INTEGER",
            properties: None,
        }
    }

    pub fn string() -> Self {
        Self {
            schema_type: "STRING",
            properties: None,
        }
    }

    pub fn boolean() -> Self {
        Self {
            schema_type: "BOOLEAN",
            properties: None,
        }
    }
}

/// Response body for `generateContent`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// First text part of the first candidate, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

/// Error envelope returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub status: String,
}

// --- Schema-constrained prompt payloads ---

/// Payload for baseline wait predictions.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatePayload {
    pub estimated_minutes: Option<u32>,
    pub reasoning: Option<String>,
}

/// Payload for history-informed wait predictions.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEstimatePayload {
    pub estimated_minutes: Option<u32>,
    pub reasoning: Option<String>,
    pub is_peak_hour: Option<bool>,
}

/// Payload for completion advice.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvicePayload {
    pub should_complete: Option<bool>,
    pub reasoning: Option<String>,
}
