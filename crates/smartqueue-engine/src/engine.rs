// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The queue engine: token lifecycle, queue positions, derived statistics,
//! and orchestration of asynchronous estimate refinement.
//!
//! All mutations go through the store's single writer; every committed
//! mutation is followed by a change-signal broadcast. Predictor work is
//! best-effort and never blocks or fails an order operation.

use std::sync::Arc;

use chrono::{DateTime, Local, Timelike, Utc};
use tracing::{debug, info, warn};

use smartqueue_config::model::EngineConfig;
use smartqueue_core::{
    CanteenId, HistoryRecord, OrderStatus, PredictorAdapter, QueueStats, SmartqueueError, Token,
    TokenId, TrafficBucket,
};
use smartqueue_storage::queries::{canteens, history, stats as stats_queries, tokens};
use smartqueue_storage::Database;

use crate::estimator::Estimator;
use crate::signal::ChangeSignal;
use crate::stats;

/// Summary shown when a canteen has nothing in flight.
const QUEUE_CLEAR_SUMMARY: &str = "Queue clear\n\
    - No active orders in queue\n\
    - Good time to restock and prepare for the next rush\n\
    - System ready for incoming orders";

/// Local calendar day in the store's `created_day` format.
fn local_day(now: &DateTime<Local>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// Whole minutes between two instants, rounded.
fn elapsed_minutes(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    let seconds = (to - from).num_seconds().max(0) as f64;
    (seconds / 60.0).round() as u32
}

/// Owns per-canteen token lifecycle, numbering, positions, and statistics.
pub struct QueueEngine {
    db: Arc<Database>,
    estimator: Estimator,
    signal: ChangeSignal,
    config: EngineConfig,
}

impl QueueEngine {
    /// Create an engine over an opened store handle.
    ///
    /// `predictor = None` disables the external capability; every estimate
    /// then comes from the local heuristic tier.
    pub fn new(
        db: Arc<Database>,
        predictor: Option<Arc<dyn PredictorAdapter>>,
        signal: ChangeSignal,
        config: EngineConfig,
    ) -> Self {
        let estimator = Estimator::new(predictor, config.default_prep_minutes);
        Self {
            db,
            estimator,
            signal,
            config,
        }
    }

    /// The engine's change signal, for wiring observers.
    pub fn signal(&self) -> &ChangeSignal {
        &self.signal
    }

    /// Place an order: create a token with the next sequential number.
    ///
    /// The token starts WAITING with the configured placeholder estimate. A
    /// refinement task is scheduled after the commit; creation never waits
    /// on the predictor.
    pub async fn create_token(
        &self,
        canteen_id: &CanteenId,
        food_item: &str,
    ) -> Result<Token, SmartqueueError> {
        // 1. The canteen must resolve before anything is written.
        if canteens::get_canteen(&self.db, canteen_id).await?.is_none() {
            return Err(SmartqueueError::UnknownCanteen {
                id: canteen_id.0.clone(),
            });
        }

        // 2. Number and insert atomically in the store.
        let now = Utc::now();
        let local = Local::now();
        let token = tokens::create_token(
            &self.db,
            &TokenId(uuid::Uuid::new_v4().to_string()),
            canteen_id,
            food_item,
            now,
            &local_day(&local),
            local.hour(),
            self.config.initial_estimate_minutes,
        )
        .await?;
        info!(
            token = %token.token_number,
            canteen = %canteen_id,
            food_item,
            "token created"
        );

        // 3. Observers re-fetch on the signal.
        self.signal.notify();

        // 4. Fire-and-forget estimate refinement.
        self.spawn_estimate_refresh(token.clone());

        Ok(token)
    }

    /// Transition a token WAITING -> READY.
    pub async fn mark_ready(&self, token_id: &TokenId) -> Result<(), SmartqueueError> {
        tokens::update_status(&self.db, token_id, OrderStatus::Ready, None, None).await?;
        info!(token = %token_id, "order ready for pickup");
        self.signal.notify();
        Ok(())
    }

    /// Complete an order at staff request.
    ///
    /// The completion advisor is consulted best-effort; its recommendation is
    /// logged and used as the stored reasoning when the caller supplied none,
    /// but it can never veto the completion. On success a history record is
    /// appended from the token's measured wait.
    pub async fn complete_order(
        &self,
        token_id: &TokenId,
        reasoning: Option<String>,
    ) -> Result<(), SmartqueueError> {
        let token = tokens::get_token(&self.db, token_id)
            .await?
            .ok_or_else(|| SmartqueueError::NotFound {
                entity: "token",
                id: token_id.0.clone(),
            })?;
        if token.status.is_terminal() {
            return Err(SmartqueueError::InvalidTransition {
                from: token.status,
                to: OrderStatus::Completed,
            });
        }

        let now = Utc::now();
        let actual_minutes = elapsed_minutes(token.created_at, now);

        // Advisory only. Staff intent always wins; a contrary recommendation
        // is logged, never enforced.
        let advice = self
            .estimator
            .advise_completion(
                &token.food_item,
                token.estimated_wait_minutes,
                actual_minutes,
                token.status == OrderStatus::Ready,
            )
            .await;
        if !advice.should_complete {
            info!(
                token = %token.token_number,
                advice = %advice.reasoning,
                "advisor would defer, completing on staff intent"
            );
        }
        let stored_reasoning = reasoning.unwrap_or(advice.reasoning);

        tokens::update_status(
            &self.db,
            token_id,
            OrderStatus::Completed,
            Some(now),
            Some(&stored_reasoning),
        )
        .await?;

        let record = HistoryRecord {
            id: uuid::Uuid::new_v4().to_string(),
            food_item: token.food_item.clone(),
            prep_time_minutes: actual_minutes,
            hour_of_day: token.created_hour,
            recorded_at: now,
        };
        history::append_history(&self.db, &record, self.config.history_retention).await?;

        info!(
            token = %token.token_number,
            wait_minutes = actual_minutes,
            "order completed"
        );
        self.signal.notify();
        Ok(())
    }

    /// Cancel an order from any non-terminal state.
    pub async fn cancel_order(&self, token_id: &TokenId) -> Result<(), SmartqueueError> {
        tokens::update_status(&self.db, token_id, OrderStatus::Cancelled, None, None).await?;
        info!(token = %token_id, "order cancelled");
        self.signal.notify();
        Ok(())
    }

    /// Look up a token.
    pub async fn get_token(&self, token_id: &TokenId) -> Result<Option<Token>, SmartqueueError> {
        tokens::get_token(&self.db, token_id).await
    }

    /// 1-based rank among the canteen's WAITING tokens; 0 when the token is
    /// not waiting or not found. Recomputed from the store on every call.
    pub async fn queue_position(
        &self,
        canteen_id: &CanteenId,
        token_id: &TokenId,
    ) -> Result<u32, SmartqueueError> {
        tokens::queue_position(&self.db, canteen_id, token_id).await
    }

    /// WAITING and READY tokens for the staff board, in creation order.
    pub async fn active_queue(
        &self,
        canteen_id: &CanteenId,
    ) -> Result<Vec<Token>, SmartqueueError> {
        tokens::list_by_canteen(
            &self.db,
            canteen_id,
            Some(&[OrderStatus::Waiting, OrderStatus::Ready]),
        )
        .await
    }

    /// Today's derived statistics for a canteen.
    pub async fn stats(&self, canteen_id: &CanteenId) -> Result<QueueStats, SmartqueueError> {
        self.require_canteen(canteen_id).await?;
        let today = local_day(&Local::now());
        let row = stats_queries::stats_row(&self.db, canteen_id, &today).await?;
        let counts = stats_queries::hourly_counts(&self.db, canteen_id, &today).await?;
        Ok(QueueStats {
            total_orders_today: row.total_orders_today,
            active_queue_length: row.active_queue_length,
            average_wait_minutes: row.average_wait_minutes,
            peak_hour: stats::peak_hour_label(&counts),
        })
    }

    /// Today's hourly order histogram over the business-hours scaffold.
    pub async fn hourly_traffic(
        &self,
        canteen_id: &CanteenId,
    ) -> Result<Vec<TrafficBucket>, SmartqueueError> {
        self.require_canteen(canteen_id).await?;
        let today = local_day(&Local::now());
        let counts = stats_queries::hourly_counts(&self.db, canteen_id, &today).await?;
        Ok(stats::merge_hourly(
            &counts,
            self.config.open_hour,
            self.config.close_hour,
        ))
    }

    /// Natural-language queue summary for the admin dashboard.
    ///
    /// Uses the predictor when available; degrades to a local template. A
    /// clear queue short-circuits without consulting the capability.
    pub async fn queue_insights(&self, canteen_id: &CanteenId) -> Result<String, SmartqueueError> {
        let stats = self.stats(canteen_id).await?;
        if stats.total_orders_today == 0 || stats.active_queue_length == 0 {
            return Ok(QUEUE_CLEAR_SUMMARY.to_string());
        }
        // The estimator owns the predictor handle; summaries reuse it so the
        // absence of the capability degrades identically everywhere.
        if let Some(summary) = self.estimator.summarize_queue(&stats).await {
            return Ok(summary);
        }
        Ok(local_summary(&stats))
    }

    async fn require_canteen(&self, canteen_id: &CanteenId) -> Result<(), SmartqueueError> {
        if canteens::get_canteen(&self.db, canteen_id).await?.is_none() {
            return Err(SmartqueueError::UnknownCanteen {
                id: canteen_id.0.clone(),
            });
        }
        Ok(())
    }

    /// Schedule the asynchronous estimate refinement for a fresh token.
    fn spawn_estimate_refresh(&self, token: Token) {
        let db = Arc::clone(&self.db);
        let estimator = self.estimator.clone();
        let signal = self.signal.clone();
        let retention = self.config.history_retention;
        tokio::spawn(async move {
            if let Err(e) = refresh_estimate(&db, &estimator, &signal, retention, &token).await {
                warn!(token = %token.id, error = %e, "estimate refresh failed");
            }
        });
    }
}

/// Refine one token's wait estimate through the fallback chain and apply it
/// through the store's guarded update.
///
/// The guard makes stale results harmless: if the token left WAITING while
/// the predictor was in flight, the update is a no-op and no signal fires.
async fn refresh_estimate(
    db: &Database,
    estimator: &Estimator,
    signal: &ChangeSignal,
    retention: u32,
    token: &Token,
) -> Result<(), SmartqueueError> {
    let queue_length = tokens::count_waiting(db, &token.canteen_id).await?;
    let item_history = history::history_for_item(db, &token.food_item, retention).await?;
    let hour = Local::now().hour();

    let estimate = estimator
        .estimate_wait(&token.food_item, queue_length, &item_history, hour)
        .await;

    let applied =
        tokens::update_estimate(db, &token.id, estimate.minutes, Some(&estimate.reasoning))
            .await?;
    if applied {
        debug!(
            token = %token.token_number,
            minutes = estimate.minutes,
            "estimate refined"
        );
        signal.notify();
    } else {
        debug!(token = %token.token_number, "token left WAITING, estimate dropped");
    }
    Ok(())
}

/// Local fallback for the admin summary.
fn local_summary(stats: &QueueStats) -> String {
    let peak = stats.peak_hour.as_deref().unwrap_or("n/a");
    format!(
        "Queue summary\n\
         - Total orders today: {}\n\
         - Average wait: {:.0} min\n\
         - Active queue: {}\n\
         - Peak hour: {}",
        stats.total_orders_today, stats.average_wait_minutes, stats.active_queue_length, peak
    )
}
