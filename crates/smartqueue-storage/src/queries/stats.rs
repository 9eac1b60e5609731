// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw statistics queries over a canteen's tokens.
//!
//! These are pure reads; the aggregation layer in the engine crate turns
//! them into the dashboard-facing records. Nothing here keeps counters —
//! every number is derived fresh from the token rows.

use rusqlite::params;
use smartqueue_core::{CanteenId, SmartqueueError};

use crate::database::{map_tr_err, Database};

/// Raw per-canteen counters for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsRow {
    /// Tokens created on the given day, all statuses.
    pub total_orders_today: u32,
    /// Tokens currently WAITING (not day-scoped).
    pub active_queue_length: u32,
    /// Mean of per-token completed wait minutes; 0.0 when nothing completed.
    pub average_wait_minutes: f64,
}

/// Compute the raw counters for a canteen.
///
/// The average is the mean of each completed token's whole-minute wait
/// (`round((completed_at - created_at) / 60s)`), never NULL or NaN.
pub async fn stats_row(
    db: &Database,
    canteen_id: &CanteenId,
    day: &str,
) -> Result<StatsRow, SmartqueueError> {
    let canteen = canteen_id.0.clone();
    let day = day.to_string();

    db.connection()
        .call(move |conn| -> Result<StatsRow, rusqlite::Error> {
            let total_orders_today: u32 = conn.query_row(
                "SELECT COUNT(*) FROM tokens WHERE canteen_id = ?1 AND created_day = ?2",
                params![canteen, day],
                |row| row.get(0),
            )?;

            let active_queue_length: u32 = conn.query_row(
                "SELECT COUNT(*) FROM tokens WHERE canteen_id = ?1 AND status = 'WAITING'",
                params![canteen],
                |row| row.get(0),
            )?;

            let average_wait_minutes: Option<f64> = conn.query_row(
                "SELECT AVG(ROUND((julianday(completed_at) - julianday(created_at)) * 1440.0))
                 FROM tokens
                 WHERE canteen_id = ?1 AND status = 'COMPLETED' AND completed_at IS NOT NULL",
                params![canteen],
                |row| row.get(0),
            )?;

            Ok(StatsRow {
                total_orders_today,
                active_queue_length,
                average_wait_minutes: average_wait_minutes.unwrap_or(0.0),
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Orders created per hour for a canteen on the given day.
///
/// Returns `(hour, count)` pairs for hours that have data, ascending by hour.
pub async fn hourly_counts(
    db: &Database,
    canteen_id: &CanteenId,
    day: &str,
) -> Result<Vec<(u32, u32)>, SmartqueueError> {
    let canteen = canteen_id.0.clone();
    let day = day.to_string();

    db.connection()
        .call(move |conn| -> Result<Vec<(u32, u32)>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT created_hour, COUNT(*) FROM tokens
                 WHERE canteen_id = ?1 AND created_day = ?2
                 GROUP BY created_hour ORDER BY created_hour ASC",
            )?;
            let rows = stmt.query_map(params![canteen, day], |row| {
                Ok((row.get::<_, i64>(0)? as u32, row.get::<_, i64>(1)? as u32))
            })?;
            let mut counts = Vec::new();
            for row in rows {
                counts.push(row?);
            }
            Ok(counts)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{canteens, tokens};
    use chrono::{Duration, Utc};
    use smartqueue_core::{Canteen, OrderStatus, TokenId};
    use tempfile::tempdir;

    const DAY: &str = "2026-03-02";

    async fn setup_db() -> (Database, tempfile::TempDir, CanteenId) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let canteen = Canteen {
            id: CanteenId("c-1".into()),
            name: "Test Canteen".into(),
            campus: "Campus".into(),
            theme_tag: "rose".into(),
            created_at: Utc::now(),
        };
        canteens::insert_canteen(&db, &canteen).await.unwrap();
        (db, dir, canteen.id)
    }

    async fn seed_token(db: &Database, canteen: &CanteenId, n: u32, hour: u32) -> TokenId {
        let token = tokens::create_token(
            db,
            &TokenId(format!("tok-{n}")),
            canteen,
            "Samosa",
            Utc::now(),
            DAY,
            hour,
            5,
        )
        .await
        .unwrap();
        token.id
    }

    async fn complete_after_minutes(db: &Database, id: &TokenId, minutes: i64) {
        let token = tokens::get_token(db, id).await.unwrap().unwrap();
        let completed_at = token.created_at + Duration::minutes(minutes);
        tokens::update_status(db, id, OrderStatus::Completed, Some(completed_at), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn stats_for_empty_canteen_are_all_zero() {
        let (db, _dir, canteen) = setup_db().await;
        let row = stats_row(&db, &canteen, DAY).await.unwrap();
        assert_eq!(row.total_orders_today, 0);
        assert_eq!(row.active_queue_length, 0);
        assert_eq!(row.average_wait_minutes, 0.0, "never NULL or NaN");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn stats_scenario_ten_orders_four_completed() {
        let (db, _dir, canteen) = setup_db().await;

        // 10 tokens today; complete 4 with waits of 3, 5, 7, 9 minutes.
        let mut ids = Vec::new();
        for n in 0..10 {
            ids.push(seed_token(&db, &canteen, n, 12).await);
        }
        for (id, wait) in ids.iter().zip([3i64, 5, 7, 9]) {
            complete_after_minutes(&db, id, wait).await;
        }

        let row = stats_row(&db, &canteen, DAY).await.unwrap();
        assert_eq!(row.total_orders_today, 10);
        assert_eq!(row.average_wait_minutes, 6.0);
        assert_eq!(row.active_queue_length, 6, "remaining WAITING tokens");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn stats_scope_to_the_requested_day_and_canteen() {
        let (db, _dir, canteen) = setup_db().await;
        let other = Canteen {
            id: CanteenId("c-2".into()),
            name: "Other".into(),
            campus: "Campus".into(),
            theme_tag: "violet".into(),
            created_at: Utc::now(),
        };
        canteens::insert_canteen(&db, &other).await.unwrap();

        seed_token(&db, &canteen, 1, 10).await;
        // Same canteen, different day: not in today's totals.
        tokens::create_token(
            &db,
            &TokenId("tok-yesterday".into()),
            &canteen,
            "Samosa",
            Utc::now(),
            "2026-03-01",
            10,
            5,
        )
        .await
        .unwrap();
        // Different canteen.
        tokens::create_token(
            &db,
            &TokenId("tok-other".into()),
            &other.id,
            "Samosa",
            Utc::now(),
            DAY,
            10,
            5,
        )
        .await
        .unwrap();

        let row = stats_row(&db, &canteen, DAY).await.unwrap();
        assert_eq!(row.total_orders_today, 1);
        // WAITING count is not day-scoped: yesterday's unfinished token is
        // still in the queue.
        assert_eq!(row.active_queue_length, 2);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn hourly_counts_group_by_creation_hour() {
        let (db, _dir, canteen) = setup_db().await;

        for (n, hour) in [(0, 12), (1, 12), (2, 13), (3, 21)] {
            seed_token(&db, &canteen, n, hour).await;
        }

        let counts = hourly_counts(&db, &canteen, DAY).await.unwrap();
        assert_eq!(counts, vec![(12, 2), (13, 1), (21, 1)]);

        db.close().await.unwrap();
    }
}
