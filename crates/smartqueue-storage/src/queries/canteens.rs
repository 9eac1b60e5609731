// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canteen CRUD operations.

use rusqlite::params;
use smartqueue_core::{Canteen, CanteenId, SmartqueueError};

use crate::database::{map_tr_err, Database};
use crate::queries::{fmt_ts, parse_ts};

fn canteen_from_row(row: &rusqlite::Row<'_>) -> Result<Canteen, rusqlite::Error> {
    let created_at: String = row.get(4)?;
    Ok(Canteen {
        id: CanteenId(row.get(0)?),
        name: row.get(1)?,
        campus: row.get(2)?,
        theme_tag: row.get(3)?,
        created_at: parse_ts(4, &created_at)?,
    })
}

/// Insert a new canteen.
pub async fn insert_canteen(db: &Database, canteen: &Canteen) -> Result<(), SmartqueueError> {
    let canteen = canteen.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO canteens (id, name, campus, theme_tag, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    canteen.id.0,
                    canteen.name,
                    canteen.campus,
                    canteen.theme_tag,
                    fmt_ts(canteen.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a canteen by id.
pub async fn get_canteen(
    db: &Database,
    id: &CanteenId,
) -> Result<Option<Canteen>, SmartqueueError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Option<Canteen>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, name, campus, theme_tag, created_at
                 FROM canteens WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], canteen_from_row);
            match result {
                Ok(canteen) => Ok(Some(canteen)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List all canteens in registration order.
pub async fn list_canteens(db: &Database) -> Result<Vec<Canteen>, SmartqueueError> {
    db.connection()
        .call(|conn| -> Result<Vec<Canteen>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, name, campus, theme_tag, created_at
                 FROM canteens ORDER BY rowid ASC",
            )?;
            let rows = stmt.query_map([], canteen_from_row)?;
            let mut canteens = Vec::new();
            for row in rows {
                canteens.push(row?);
            }
            Ok(canteens)
        })
        .await
        .map_err(map_tr_err)
}
