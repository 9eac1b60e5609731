// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the SmartQueue token store.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed operations for the three
//! logical collections: canteens, tokens, and preparation history.
//!
//! The single writer is the concurrency contract: token-number assignment and
//! status transitions execute transactionally on one background thread, which
//! is strictly stronger than the per-canteen serialization the queue
//! semantics require.

pub mod database;
pub mod migrations;
pub mod queries;

pub use database::Database;
pub use queries::stats::StatsRow;
