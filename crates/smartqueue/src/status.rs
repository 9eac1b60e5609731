// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `smartqueue status` command implementation.
//!
//! Opens the configured store and prints each registered canteen with its
//! derived statistics for today. Read-only; runs against the same database
//! file a live server uses.

use std::sync::Arc;

use smartqueue_config::SmartqueueConfig;
use smartqueue_core::SmartqueueError;
use smartqueue_engine::{ChangeSignal, QueueEngine};
use smartqueue_storage::queries::canteens;
use smartqueue_storage::Database;

/// Runs the `smartqueue status` command.
pub async fn run_status(config: SmartqueueConfig) -> Result<(), SmartqueueError> {
    let db = Arc::new(Database::open(&config.storage.database_path).await?);
    let engine = QueueEngine::new(
        Arc::clone(&db),
        None,
        ChangeSignal::new(),
        config.engine.clone(),
    );

    let all = canteens::list_canteens(&db).await?;
    if all.is_empty() {
        println!("no canteens registered");
        return Ok(());
    }

    for canteen in all {
        let stats = engine.stats(&canteen.id).await?;
        println!("{} ({}) [{}]", canteen.name, canteen.campus, canteen.id);
        println!("  orders today:  {}", stats.total_orders_today);
        println!("  waiting now:   {}", stats.active_queue_length);
        println!("  average wait:  {:.1} min", stats.average_wait_minutes);
        println!(
            "  peak hour:     {}",
            stats.peak_hour.as_deref().unwrap_or("-")
        );
    }

    db.close().await?;
    Ok(())
}
