// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token operations: creation with sequential numbering, lifecycle
//! transitions, estimate updates, and queue-position queries.
//!
//! Token numbers are derived from a live count of the day's tokens rather
//! than a stored counter. The count and the insert execute in the same
//! transaction on the single writer thread, so two concurrent creations for
//! one canteen can never observe the same count.

use chrono::{DateTime, Utc};
use rusqlite::params;
use smartqueue_core::{CanteenId, OrderStatus, SmartqueueError, Token, TokenId};

use crate::database::{map_tr_err, Database};
use crate::queries::{fmt_ts, parse_ts};

/// Internal result of a token creation attempt.
enum CreateOutcome {
    Created(Token),
    UnknownCanteen,
}

/// Internal result of a status transition attempt.
enum TransitionOutcome {
    Applied,
    NotFound,
    Invalid { from: OrderStatus },
}

/// Internal result of an estimate update attempt.
enum EstimateOutcome {
    Applied,
    Frozen,
    NotFound,
}

fn token_from_row(row: &rusqlite::Row<'_>) -> Result<Token, rusqlite::Error> {
    let status_raw: String = row.get(5)?;
    let status = status_raw.parse::<OrderStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let created_at: String = row.get(6)?;
    let completed_at: Option<String> = row.get(9)?;
    let completed_at = match completed_at {
        Some(raw) => Some(parse_ts(9, &raw)?),
        None => None,
    };
    Ok(Token {
        id: TokenId(row.get(1)?),
        canteen_id: CanteenId(row.get(2)?),
        token_number: row.get(3)?,
        food_item: row.get(4)?,
        status,
        created_at: parse_ts(6, &created_at)?,
        created_day: row.get(7)?,
        created_hour: row.get::<_, i64>(8)? as u32,
        completed_at,
        estimated_wait_minutes: row.get::<_, i64>(10)? as u32,
        estimation_reasoning: row.get(11)?,
    })
}

const TOKEN_COLUMNS: &str = "seq, id, canteen_id, token_number, food_item, status, created_at, \
                             created_day, created_hour, completed_at, estimated_wait_minutes, \
                             estimation_reasoning";

/// Format the display label for the `n`-th token of the day (1-based).
fn token_number(n: u32) -> String {
    format!("A-{n:03}")
}

/// Create a token with the next sequential number for `(canteen, day)`.
///
/// The day count, number assignment, and insert run in one transaction.
/// Fails with `UnknownCanteen` when the canteen id does not resolve.
pub async fn create_token(
    db: &Database,
    id: &TokenId,
    canteen_id: &CanteenId,
    food_item: &str,
    created_at: DateTime<Utc>,
    created_day: &str,
    created_hour: u32,
    initial_estimate_minutes: u32,
) -> Result<Token, SmartqueueError> {
    let token_id = id.0.clone();
    let canteen = canteen_id.0.clone();
    let food_item = food_item.to_string();
    let day = created_day.to_string();

    let outcome = db
        .connection()
        .call(move |conn| -> Result<CreateOutcome, rusqlite::Error> {
            let tx = conn.transaction()?;

            let canteen_exists: bool = tx
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM canteens WHERE id = ?1)",
                    params![canteen],
                    |row| row.get(0),
                )?;
            if !canteen_exists {
                return Ok(CreateOutcome::UnknownCanteen);
            }

            let day_count: u32 = tx.query_row(
                "SELECT COUNT(*) FROM tokens WHERE canteen_id = ?1 AND created_day = ?2",
                params![canteen, day],
                |row| row.get(0),
            )?;

            let token = Token {
                id: TokenId(token_id),
                canteen_id: CanteenId(canteen),
                token_number: token_number(day_count + 1),
                food_item,
                status: OrderStatus::Waiting,
                created_at,
                created_day: day,
                created_hour,
                completed_at: None,
                estimated_wait_minutes: initial_estimate_minutes,
                estimation_reasoning: None,
            };

            tx.execute(
                "INSERT INTO tokens (id, canteen_id, token_number, food_item, status,
                                     created_at, created_day, created_hour,
                                     estimated_wait_minutes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    token.id.0,
                    token.canteen_id.0,
                    token.token_number,
                    token.food_item,
                    token.status.to_string(),
                    fmt_ts(token.created_at),
                    token.created_day,
                    token.created_hour,
                    token.estimated_wait_minutes,
                ],
            )?;
            tx.commit()?;

            Ok(CreateOutcome::Created(token))
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        CreateOutcome::Created(token) => Ok(token),
        CreateOutcome::UnknownCanteen => Err(SmartqueueError::UnknownCanteen {
            id: canteen_id.0.clone(),
        }),
    }
}

/// Get a token by id.
pub async fn get_token(db: &Database, id: &TokenId) -> Result<Option<Token>, SmartqueueError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Option<Token>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TOKEN_COLUMNS} FROM tokens WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], token_from_row);
            match result {
                Ok(token) => Ok(Some(token)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List a canteen's tokens in insertion order, optionally filtered to a set
/// of statuses.
///
/// Insertion order is part of the store contract: position computation
/// depends on it when creation timestamps tie.
pub async fn list_by_canteen(
    db: &Database,
    canteen_id: &CanteenId,
    statuses: Option<&[OrderStatus]>,
) -> Result<Vec<Token>, SmartqueueError> {
    let canteen = canteen_id.0.clone();
    // Status names come from the enum, not user input.
    let status_clause = statuses.map(|statuses| {
        let quoted: Vec<String> = statuses.iter().map(|s| format!("'{s}'")).collect();
        format!("AND status IN ({})", quoted.join(", "))
    });

    db.connection()
        .call(move |conn| -> Result<Vec<Token>, rusqlite::Error> {
            let sql = format!(
                "SELECT {TOKEN_COLUMNS} FROM tokens
                 WHERE canteen_id = ?1 {}
                 ORDER BY seq ASC",
                status_clause.as_deref().unwrap_or("")
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![canteen], token_from_row)?;
            let mut tokens = Vec::new();
            for row in rows {
                tokens.push(row?);
            }
            Ok(tokens)
        })
        .await
        .map_err(map_tr_err)
}

/// Transition a token to `new_status`, enforcing the lifecycle DAG.
///
/// The current status is read and checked in the same transaction as the
/// update. `completed_at` is written exactly once, on the transition into
/// `COMPLETED`; a `reasoning` is stored atomically with the transition when
/// provided. Fails with `InvalidTransition` when the edge is not allowed and
/// `NotFound` when the id is unknown.
pub async fn update_status(
    db: &Database,
    id: &TokenId,
    new_status: OrderStatus,
    completed_at: Option<DateTime<Utc>>,
    reasoning: Option<&str>,
) -> Result<(), SmartqueueError> {
    let token_id = id.0.clone();
    let reasoning = reasoning.map(str::to_string);

    let outcome = db
        .connection()
        .call(move |conn| -> Result<TransitionOutcome, rusqlite::Error> {
            let tx = conn.transaction()?;

            let current: Option<String> = {
                let result = tx.query_row(
                    "SELECT status FROM tokens WHERE id = ?1",
                    params![token_id],
                    |row| row.get(0),
                );
                match result {
                    Ok(status) => Some(status),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e),
                }
            };

            let Some(current_raw) = current else {
                return Ok(TransitionOutcome::NotFound);
            };
            let current = current_raw.parse::<OrderStatus>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

            if !current.can_transition_to(new_status) {
                return Ok(TransitionOutcome::Invalid { from: current });
            }

            let completed = if new_status == OrderStatus::Completed {
                completed_at.map(fmt_ts)
            } else {
                None
            };
            tx.execute(
                "UPDATE tokens
                 SET status = ?1,
                     completed_at = COALESCE(?2, completed_at),
                     estimation_reasoning = COALESCE(?3, estimation_reasoning)
                 WHERE id = ?4",
                params![new_status.to_string(), completed, reasoning, token_id],
            )?;
            tx.commit()?;

            Ok(TransitionOutcome::Applied)
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        TransitionOutcome::Applied => Ok(()),
        TransitionOutcome::NotFound => Err(SmartqueueError::NotFound {
            entity: "token",
            id: id.0.clone(),
        }),
        TransitionOutcome::Invalid { from } => Err(SmartqueueError::InvalidTransition {
            from,
            to: new_status,
        }),
    }
}

/// Update a token's wait estimate, only while it is still WAITING.
///
/// A stale predictor response arriving after the token left WAITING is a
/// no-op; the status guard lives in the same statement as the write.
/// Returns whether the update applied. Fails with `NotFound` for unknown ids.
pub async fn update_estimate(
    db: &Database,
    id: &TokenId,
    minutes: u32,
    reasoning: Option<&str>,
) -> Result<bool, SmartqueueError> {
    let token_id = id.0.clone();
    let reasoning = reasoning.map(str::to_string);

    let outcome = db
        .connection()
        .call(move |conn| -> Result<EstimateOutcome, rusqlite::Error> {
            let updated = conn.execute(
                "UPDATE tokens
                 SET estimated_wait_minutes = ?1,
                     estimation_reasoning = COALESCE(?2, estimation_reasoning)
                 WHERE id = ?3 AND status = 'WAITING'",
                params![minutes, reasoning, token_id],
            )?;
            if updated > 0 {
                return Ok(EstimateOutcome::Applied);
            }
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM tokens WHERE id = ?1)",
                params![token_id],
                |row| row.get(0),
            )?;
            if exists {
                Ok(EstimateOutcome::Frozen)
            } else {
                Ok(EstimateOutcome::NotFound)
            }
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        EstimateOutcome::Applied => Ok(true),
        EstimateOutcome::Frozen => Ok(false),
        EstimateOutcome::NotFound => Err(SmartqueueError::NotFound {
            entity: "token",
            id: id.0.clone(),
        }),
    }
}

/// 1-based rank of a token among its canteen's WAITING tokens, in creation
/// order. Returns 0 when the token is not WAITING, belongs to a different
/// canteen, or does not exist.
///
/// Recomputed on every call — never cached — so it is always consistent with
/// the latest committed state.
pub async fn queue_position(
    db: &Database,
    canteen_id: &CanteenId,
    token_id: &TokenId,
) -> Result<u32, SmartqueueError> {
    let canteen = canteen_id.0.clone();
    let token = token_id.0.clone();

    db.connection()
        .call(move |conn| -> Result<u32, rusqlite::Error> {
            let target: Option<(i64, String, String)> = {
                let result = conn.query_row(
                    "SELECT seq, status, canteen_id FROM tokens WHERE id = ?1",
                    params![token],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                );
                match result {
                    Ok(row) => Some(row),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e),
                }
            };

            let Some((seq, status, owner)) = target else {
                return Ok(0);
            };
            if status != OrderStatus::Waiting.to_string() || owner != canteen {
                return Ok(0);
            }

            let rank: u32 = conn.query_row(
                "SELECT COUNT(*) FROM tokens
                 WHERE canteen_id = ?1 AND status = 'WAITING' AND seq <= ?2",
                params![canteen, seq],
                |row| row.get(0),
            )?;
            Ok(rank)
        })
        .await
        .map_err(map_tr_err)
}

/// Number of WAITING tokens for a canteen.
pub async fn count_waiting(db: &Database, canteen_id: &CanteenId) -> Result<u32, SmartqueueError> {
    let canteen = canteen_id.0.clone();
    db.connection()
        .call(move |conn| -> Result<u32, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*) FROM tokens WHERE canteen_id = ?1 AND status = 'WAITING'",
                params![canteen],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::canteens;
    use smartqueue_core::Canteen;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn seed_canteen(db: &Database, id: &str) -> CanteenId {
        let canteen = Canteen {
            id: CanteenId(id.to_string()),
            name: "Test Canteen".to_string(),
            campus: "Campus".to_string(),
            theme_tag: "indigo".to_string(),
            created_at: Utc::now(),
        };
        canteens::insert_canteen(db, &canteen).await.unwrap();
        canteen.id
    }

    async fn make_token(db: &Database, canteen: &CanteenId, food: &str) -> Token {
        create_token(
            db,
            &TokenId(uuid::Uuid::new_v4().to_string()),
            canteen,
            food,
            Utc::now(),
            "2026-03-02",
            12,
            5,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn tokens_are_numbered_sequentially_per_canteen_day() {
        let (db, _dir) = setup_db().await;
        let canteen = seed_canteen(&db, "c-1").await;

        let t1 = make_token(&db, &canteen, "Samosa").await;
        let t2 = make_token(&db, &canteen, "Vada Pav").await;
        let t3 = make_token(&db, &canteen, "Cold Coffee").await;

        assert_eq!(t1.token_number, "A-001");
        assert_eq!(t2.token_number, "A-002");
        assert_eq!(t3.token_number, "A-003");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn numbering_is_independent_per_canteen() {
        let (db, _dir) = setup_db().await;
        let north = seed_canteen(&db, "c-north").await;
        let south = seed_canteen(&db, "c-south").await;

        let n1 = make_token(&db, &north, "Samosa").await;
        let s1 = make_token(&db, &south, "Samosa").await;
        let n2 = make_token(&db, &north, "Samosa").await;

        assert_eq!(n1.token_number, "A-001");
        assert_eq!(s1.token_number, "A-001");
        assert_eq!(n2.token_number, "A-002");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn numbering_restarts_each_day() {
        let (db, _dir) = setup_db().await;
        let canteen = seed_canteen(&db, "c-1").await;

        let monday = create_token(
            &db,
            &TokenId("tok-mon".into()),
            &canteen,
            "Samosa",
            Utc::now(),
            "2026-03-02",
            9,
            5,
        )
        .await
        .unwrap();
        let tuesday = create_token(
            &db,
            &TokenId("tok-tue".into()),
            &canteen,
            "Samosa",
            Utc::now(),
            "2026-03-03",
            9,
            5,
        )
        .await
        .unwrap();

        assert_eq!(monday.token_number, "A-001");
        assert_eq!(tuesday.token_number, "A-001");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_creations_never_duplicate_numbers() {
        let (db, _dir) = setup_db().await;
        let canteen = seed_canteen(&db, "c-busy").await;

        let mut handles = Vec::new();
        for i in 0..20 {
            let db = db.clone();
            let canteen = canteen.clone();
            handles.push(tokio::spawn(async move {
                create_token(
                    &db,
                    &TokenId(format!("tok-{i}")),
                    &canteen,
                    "Samosa",
                    Utc::now(),
                    "2026-03-02",
                    12,
                    5,
                )
                .await
            }));
        }

        let mut numbers = Vec::new();
        for handle in handles {
            let token = handle.await.unwrap().unwrap();
            numbers.push(token.token_number);
        }
        numbers.sort();
        numbers.dedup();
        assert_eq!(numbers.len(), 20, "no duplicate or skipped numbers");
        assert_eq!(numbers.first().map(String::as_str), Some("A-001"));
        assert_eq!(numbers.last().map(String::as_str), Some("A-020"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn create_for_unknown_canteen_fails() {
        let (db, _dir) = setup_db().await;
        let result = create_token(
            &db,
            &TokenId("tok-1".into()),
            &CanteenId("ghost".into()),
            "Samosa",
            Utc::now(),
            "2026-03-02",
            12,
            5,
        )
        .await;
        assert!(matches!(
            result,
            Err(SmartqueueError::UnknownCanteen { id }) if id == "ghost"
        ));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn status_transitions_follow_the_dag() {
        let (db, _dir) = setup_db().await;
        let canteen = seed_canteen(&db, "c-1").await;
        let token = make_token(&db, &canteen, "Samosa").await;

        // WAITING -> READY -> COMPLETED is legal.
        update_status(&db, &token.id, OrderStatus::Ready, None, None)
            .await
            .unwrap();
        update_status(&db, &token.id, OrderStatus::Completed, Some(Utc::now()), None)
            .await
            .unwrap();

        let stored = get_token(&db, &token.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Completed);
        assert!(stored.completed_at.is_some());
        assert!(stored.completed_at.unwrap() >= stored.created_at);

        // No transition out of COMPLETED.
        let result = update_status(&db, &token.id, OrderStatus::Waiting, None, None).await;
        assert!(matches!(
            result,
            Err(SmartqueueError::InvalidTransition {
                from: OrderStatus::Completed,
                to: OrderStatus::Waiting,
            })
        ));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn double_completion_fails_and_leaves_state_unchanged() {
        let (db, _dir) = setup_db().await;
        let canteen = seed_canteen(&db, "c-1").await;
        let token = make_token(&db, &canteen, "Samosa").await;

        let first_completed = Utc::now();
        update_status(
            &db,
            &token.id,
            OrderStatus::Completed,
            Some(first_completed),
            None,
        )
        .await
        .unwrap();
        let after_first = get_token(&db, &token.id).await.unwrap().unwrap();

        let result = update_status(
            &db,
            &token.id,
            OrderStatus::Completed,
            Some(Utc::now()),
            Some("second attempt"),
        )
        .await;
        assert!(matches!(
            result,
            Err(SmartqueueError::InvalidTransition { .. })
        ));

        let after_second = get_token(&db, &token.id).await.unwrap().unwrap();
        assert_eq!(after_second.status, after_first.status);
        assert_eq!(after_second.completed_at, after_first.completed_at);
        assert_eq!(
            after_second.estimation_reasoning,
            after_first.estimation_reasoning
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn cancel_is_allowed_from_any_non_terminal_state() {
        let (db, _dir) = setup_db().await;
        let canteen = seed_canteen(&db, "c-1").await;

        let waiting = make_token(&db, &canteen, "Samosa").await;
        update_status(&db, &waiting.id, OrderStatus::Cancelled, None, None)
            .await
            .unwrap();

        let ready = make_token(&db, &canteen, "Samosa").await;
        update_status(&db, &ready.id, OrderStatus::Ready, None, None)
            .await
            .unwrap();
        update_status(&db, &ready.id, OrderStatus::Cancelled, None, None)
            .await
            .unwrap();

        // But not from CANCELLED.
        let result = update_status(&db, &waiting.id, OrderStatus::Cancelled, None, None).await;
        assert!(matches!(
            result,
            Err(SmartqueueError::InvalidTransition { .. })
        ));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn transition_on_unknown_token_fails_not_found() {
        let (db, _dir) = setup_db().await;
        let result =
            update_status(&db, &TokenId("ghost".into()), OrderStatus::Ready, None, None).await;
        assert!(matches!(result, Err(SmartqueueError::NotFound { .. })));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn estimate_updates_apply_only_while_waiting() {
        let (db, _dir) = setup_db().await;
        let canteen = seed_canteen(&db, "c-1").await;
        let token = make_token(&db, &canteen, "Samosa").await;

        let applied = update_estimate(&db, &token.id, 12, Some("lunch rush"))
            .await
            .unwrap();
        assert!(applied);
        let stored = get_token(&db, &token.id).await.unwrap().unwrap();
        assert_eq!(stored.estimated_wait_minutes, 12);
        assert_eq!(stored.estimation_reasoning.as_deref(), Some("lunch rush"));

        // Once the token leaves WAITING, stale estimates are a no-op.
        update_status(&db, &token.id, OrderStatus::Ready, None, None)
            .await
            .unwrap();
        let applied = update_estimate(&db, &token.id, 99, Some("stale")).await.unwrap();
        assert!(!applied);
        let stored = get_token(&db, &token.id).await.unwrap().unwrap();
        assert_eq!(stored.estimated_wait_minutes, 12, "estimate is frozen");
        assert_eq!(stored.estimation_reasoning.as_deref(), Some("lunch rush"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn estimate_update_on_unknown_token_fails_not_found() {
        let (db, _dir) = setup_db().await;
        let result = update_estimate(&db, &TokenId("ghost".into()), 10, None).await;
        assert!(matches!(result, Err(SmartqueueError::NotFound { .. })));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn queue_position_ranks_waiting_tokens_in_creation_order() {
        let (db, _dir) = setup_db().await;
        let canteen = seed_canteen(&db, "c-1").await;

        let t1 = make_token(&db, &canteen, "Samosa").await;
        let t2 = make_token(&db, &canteen, "Vada Pav").await;
        let t3 = make_token(&db, &canteen, "Cold Coffee").await;

        assert_eq!(queue_position(&db, &canteen, &t1.id).await.unwrap(), 1);
        assert_eq!(queue_position(&db, &canteen, &t2.id).await.unwrap(), 2);
        assert_eq!(queue_position(&db, &canteen, &t3.id).await.unwrap(), 3);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ready_tokens_leave_the_queue_without_renumbering_others() {
        let (db, _dir) = setup_db().await;
        let canteen = seed_canteen(&db, "c-1").await;

        let t1 = make_token(&db, &canteen, "Samosa").await;
        let t2 = make_token(&db, &canteen, "Vada Pav").await;
        let t3 = make_token(&db, &canteen, "Cold Coffee").await;

        assert_eq!(queue_position(&db, &canteen, &t2.id).await.unwrap(), 2);

        update_status(&db, &t1.id, OrderStatus::Ready, None, None)
            .await
            .unwrap();

        // t1 left the waiting queue. Position is 1 + the count of WAITING
        // tokens created strictly before, so t2 and t3 each move up one slot;
        // their token numbers are untouched.
        assert_eq!(queue_position(&db, &canteen, &t1.id).await.unwrap(), 0);
        assert_eq!(queue_position(&db, &canteen, &t2.id).await.unwrap(), 1);
        assert_eq!(queue_position(&db, &canteen, &t3.id).await.unwrap(), 2);

        let t2_stored = get_token(&db, &t2.id).await.unwrap().unwrap();
        assert_eq!(t2_stored.token_number, "A-002", "labels are never renumbered");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn queue_position_is_zero_for_unknown_or_foreign_tokens() {
        let (db, _dir) = setup_db().await;
        let canteen = seed_canteen(&db, "c-1").await;
        let other = seed_canteen(&db, "c-2").await;
        let token = make_token(&db, &canteen, "Samosa").await;

        assert_eq!(
            queue_position(&db, &canteen, &TokenId("ghost".into()))
                .await
                .unwrap(),
            0
        );
        assert_eq!(queue_position(&db, &other, &token.id).await.unwrap(), 0);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_by_canteen_filters_statuses_and_preserves_order() {
        let (db, _dir) = setup_db().await;
        let canteen = seed_canteen(&db, "c-1").await;

        let t1 = make_token(&db, &canteen, "Samosa").await;
        let t2 = make_token(&db, &canteen, "Vada Pav").await;
        let t3 = make_token(&db, &canteen, "Cold Coffee").await;
        update_status(&db, &t1.id, OrderStatus::Ready, None, None)
            .await
            .unwrap();
        update_status(&db, &t2.id, OrderStatus::Completed, Some(Utc::now()), None)
            .await
            .unwrap();

        let all = list_by_canteen(&db, &canteen, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, t1.id);
        assert_eq!(all[2].id, t3.id);

        let active = list_by_canteen(
            &db,
            &canteen,
            Some(&[OrderStatus::Waiting, OrderStatus::Ready]),
        )
        .await
        .unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].id, t1.id);
        assert_eq!(active[1].id, t3.id);

        let waiting = list_by_canteen(&db, &canteen, Some(&[OrderStatus::Waiting]))
            .await
            .unwrap();
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].id, t3.id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn count_waiting_tracks_transitions() {
        let (db, _dir) = setup_db().await;
        let canteen = seed_canteen(&db, "c-1").await;

        assert_eq!(count_waiting(&db, &canteen).await.unwrap(), 0);
        let t1 = make_token(&db, &canteen, "Samosa").await;
        let _t2 = make_token(&db, &canteen, "Vada Pav").await;
        assert_eq!(count_waiting(&db, &canteen).await.unwrap(), 2);

        update_status(&db, &t1.id, OrderStatus::Ready, None, None)
            .await
            .unwrap();
        assert_eq!(count_waiting(&db, &canteen).await.unwrap(), 1);

        db.close().await.unwrap();
    }
}
