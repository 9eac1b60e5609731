// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread: the `Database` struct IS the single writer. Query modules accept
//! `&Database` and call through `conn.call()`. This serializes every
//! mutation — strictly stronger than the per-canteen scope token numbering
//! and status transitions require — and eliminates SQLITE_BUSY errors under
//! concurrent access.
//!
//! **Do NOT create additional Connection instances for writes.**

use std::path::Path;

use smartqueue_core::SmartqueueError;
use tracing::debug;

/// Handle to the SQLite database, wrapping the single writer connection.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, applying PRAGMAs and running
    /// any pending migrations.
    pub async fn open(path: &str) -> Result<Self, SmartqueueError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| SmartqueueError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(map_tr_err)?;

        conn.call(|conn| -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;",
            )?;
            crate::migrations::run_migrations(conn).map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// Returns the underlying writer connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flush pending writes and checkpoint the WAL.
    ///
    /// Call at service shutdown; the connection itself is released on drop.
    pub async fn close(&self) -> Result<(), SmartqueueError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Map a storage-layer error into the workspace error type.
pub fn map_tr_err<E>(e: E) -> SmartqueueError
where
    E: std::error::Error + Send + Sync + 'static,
{
    SmartqueueError::Storage {
        source: Box::new(e),
    }
}
