// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Typed engine errors map onto HTTP statuses: unknown canteens and missed
//! lookups become 404, lifecycle violations become 409, and everything else
//! is a 500. Predictor degradation is invisible here by design — an order
//! can always be placed with every downstream capability down.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use smartqueue_core::{
    Canteen, CanteenId, MenuItem, QueueStats, SmartqueueError, Token, TokenId, TrafficBucket,
    MENU_ITEMS,
};

use crate::server::GatewayState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// Wrapper mapping engine errors onto HTTP responses.
pub struct ApiError(SmartqueueError);

impl From<SmartqueueError> for ApiError {
    fn from(err: SmartqueueError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SmartqueueError::UnknownCanteen { .. } | SmartqueueError::NotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            SmartqueueError::InvalidTransition { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/menu
pub async fn get_menu() -> Json<Vec<MenuItem>> {
    Json(MENU_ITEMS.to_vec())
}

/// Request body for POST /api/canteens.
#[derive(Debug, Deserialize)]
pub struct RegisterCanteenRequest {
    pub name: String,
    pub campus: String,
}

/// POST /api/canteens
pub async fn post_canteen(
    State(state): State<GatewayState>,
    Json(body): Json<RegisterCanteenRequest>,
) -> Result<(StatusCode, Json<Canteen>), ApiError> {
    let canteen = state.registry.register(&body.name, &body.campus).await?;
    Ok((StatusCode::CREATED, Json(canteen)))
}

/// GET /api/canteens
pub async fn get_canteens(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<Canteen>>, ApiError> {
    Ok(Json(state.registry.list().await?))
}

/// Request body for POST /api/scan.
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// Decoded QR payload — a canteen URL or a bare canteen id.
    pub payload: String,
}

/// Response body for POST /api/scan.
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub canteen_id: CanteenId,
}

/// POST /api/scan
pub async fn post_scan(
    State(state): State<GatewayState>,
    Json(body): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, ApiError> {
    let canteen_id = state.registry.resolve_scan_payload(&body.payload).await?;
    Ok(Json(ScanResponse { canteen_id }))
}

/// Request body for POST /api/tokens.
#[derive(Debug, Deserialize)]
pub struct CreateTokenRequest {
    pub canteen_id: String,
    pub food_item: String,
}

/// POST /api/tokens
pub async fn post_token(
    State(state): State<GatewayState>,
    Json(body): Json<CreateTokenRequest>,
) -> Result<(StatusCode, Json<Token>), ApiError> {
    let token = state
        .engine
        .create_token(&CanteenId(body.canteen_id), &body.food_item)
        .await?;
    Ok((StatusCode::CREATED, Json(token)))
}

/// GET /api/tokens/{id}
pub async fn get_token(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<Token>, ApiError> {
    let token = state
        .engine
        .get_token(&TokenId(id.clone()))
        .await?
        .ok_or(SmartqueueError::NotFound {
            entity: "token",
            id,
        })?;
    Ok(Json(token))
}

/// POST /api/tokens/{id}/ready
pub async fn post_ready(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine.mark_ready(&TokenId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for POST /api/tokens/{id}/complete.
#[derive(Debug, Default, Deserialize)]
pub struct CompleteRequest {
    /// Optional staff-supplied reasoning; the advisor's text is used when
    /// absent.
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// POST /api/tokens/{id}/complete
pub async fn post_complete(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: Option<Json<CompleteRequest>>,
) -> Result<StatusCode, ApiError> {
    let reasoning = body.and_then(|Json(b)| b.reasoning);
    state.engine.complete_order(&TokenId(id), reasoning).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/tokens/{id}/cancel
pub async fn post_cancel(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine.cancel_order(&TokenId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/canteens/{id}/queue
pub async fn get_queue(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Token>>, ApiError> {
    Ok(Json(state.engine.active_queue(&CanteenId(id)).await?))
}

/// Response body for GET /api/canteens/{id}/position/{token_id}.
#[derive(Debug, Serialize)]
pub struct PositionResponse {
    /// 1-based rank among waiting tokens; 0 when not waiting or not found.
    pub position: u32,
}

/// GET /api/canteens/{id}/position/{token_id}
pub async fn get_position(
    State(state): State<GatewayState>,
    Path((id, token_id)): Path<(String, String)>,
) -> Result<Json<PositionResponse>, ApiError> {
    let position = state
        .engine
        .queue_position(&CanteenId(id), &TokenId(token_id))
        .await?;
    Ok(Json(PositionResponse { position }))
}

/// GET /api/canteens/{id}/stats
pub async fn get_stats(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<QueueStats>, ApiError> {
    Ok(Json(state.engine.stats(&CanteenId(id)).await?))
}

/// GET /api/canteens/{id}/traffic
pub async fn get_traffic(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TrafficBucket>>, ApiError> {
    Ok(Json(state.engine.hourly_traffic(&CanteenId(id)).await?))
}

/// Response body for GET /api/canteens/{id}/insights.
#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: String,
}

/// GET /api/canteens/{id}/insights
pub async fn get_insights(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<InsightsResponse>, ApiError> {
    let insights = state.engine.queue_insights(&CanteenId(id)).await?;
    Ok(Json(InsightsResponse { insights }))
}
