// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Preparation-history operations with bounded FIFO retention.
//!
//! History is a rolling training signal for the predictor, not an audit log:
//! the store keeps at most `retention` records, discarding oldest first.

use rusqlite::params;
use smartqueue_core::{HistoryRecord, SmartqueueError};

use crate::database::{map_tr_err, Database};
use crate::queries::{fmt_ts, parse_ts};

fn record_from_row(row: &rusqlite::Row<'_>) -> Result<HistoryRecord, rusqlite::Error> {
    let recorded_at: String = row.get(4)?;
    Ok(HistoryRecord {
        id: row.get(0)?,
        food_item: row.get(1)?,
        prep_time_minutes: row.get::<_, i64>(2)? as u32,
        hour_of_day: row.get::<_, i64>(3)? as u32,
        recorded_at: parse_ts(4, &recorded_at)?,
    })
}

/// Append a history record, evicting the oldest entries beyond `retention`.
///
/// Insert and eviction run in the same transaction, so the window never
/// exceeds the cap even momentarily across readers.
pub async fn append_history(
    db: &Database,
    record: &HistoryRecord,
    retention: u32,
) -> Result<(), SmartqueueError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO history (id, food_item, prep_time_minutes, hour_of_day, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.food_item,
                    record.prep_time_minutes,
                    record.hour_of_day,
                    fmt_ts(record.recorded_at),
                ],
            )?;
            tx.execute(
                "DELETE FROM history
                 WHERE seq NOT IN (SELECT seq FROM history ORDER BY seq DESC LIMIT ?1)",
                params![retention],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Most recent history records for a food item, newest first, capped at `limit`.
pub async fn history_for_item(
    db: &Database,
    food_item: &str,
    limit: u32,
) -> Result<Vec<HistoryRecord>, SmartqueueError> {
    let food_item = food_item.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<HistoryRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, food_item, prep_time_minutes, hour_of_day, recorded_at
                 FROM history WHERE food_item = ?1
                 ORDER BY seq DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![food_item, limit], record_from_row)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Total number of retained history records.
pub async fn history_len(db: &Database) -> Result<u64, SmartqueueError> {
    db.connection()
        .call(|conn| -> Result<u64, rusqlite::Error> {
            conn.query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))
        })
        .await
        .map_err(map_tr_err)
}
