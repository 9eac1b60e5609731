// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canteen registry: identity creation, lookup, and scan-payload resolution.
//!
//! The camera/QR capture pipeline is external; this module only resolves an
//! already-decoded opaque payload to a canteen id. Payloads are either a URL
//! carrying a `canteenId` query parameter (the form printed on canteen QR
//! posters) or a bare canteen id.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::info;

use smartqueue_core::{Canteen, CanteenId, SmartqueueError};
use smartqueue_storage::queries::canteens;
use smartqueue_storage::Database;

use crate::signal::ChangeSignal;

/// Theme tags assigned round-robin-by-chance at registration.
const THEME_TAGS: [&str; 5] = ["indigo", "amber", "rose", "emerald", "violet"];

/// Creates and looks up canteen identities.
#[derive(Clone)]
pub struct CanteenRegistry {
    db: Arc<Database>,
    signal: ChangeSignal,
}

impl CanteenRegistry {
    /// Create a registry over the given store handle.
    pub fn new(db: Arc<Database>, signal: ChangeSignal) -> Self {
        Self { db, signal }
    }

    /// Register a new canteen and notify observers.
    pub async fn register(&self, name: &str, campus: &str) -> Result<Canteen, SmartqueueError> {
        let theme_tag = THEME_TAGS[rand::thread_rng().gen_range(0..THEME_TAGS.len())];
        let canteen = Canteen {
            id: CanteenId(uuid::Uuid::new_v4().to_string()),
            name: name.to_string(),
            campus: campus.to_string(),
            theme_tag: theme_tag.to_string(),
            created_at: Utc::now(),
        };
        canteens::insert_canteen(&self.db, &canteen).await?;
        info!(canteen = %canteen.id, name, campus, "canteen registered");
        self.signal.notify();
        Ok(canteen)
    }

    /// Look up a canteen, failing with `UnknownCanteen` when absent.
    pub async fn get(&self, id: &CanteenId) -> Result<Canteen, SmartqueueError> {
        canteens::get_canteen(&self.db, id)
            .await?
            .ok_or_else(|| SmartqueueError::UnknownCanteen { id: id.0.clone() })
    }

    /// List all registered canteens.
    pub async fn list(&self) -> Result<Vec<Canteen>, SmartqueueError> {
        canteens::list_canteens(&self.db).await
    }

    /// Resolve an opaque scan payload to a registered canteen id.
    ///
    /// Fails with `UnknownCanteen` for unparsable payloads and for ids that
    /// do not resolve.
    pub async fn resolve_scan_payload(&self, raw: &str) -> Result<CanteenId, SmartqueueError> {
        let Some(id) = extract_canteen_id(raw) else {
            return Err(SmartqueueError::UnknownCanteen {
                id: raw.trim().to_string(),
            });
        };
        let id = CanteenId(id.to_string());
        self.get(&id).await?;
        Ok(id)
    }
}

/// Pull the canteen id out of a scan payload.
///
/// URL-shaped payloads must carry a non-empty `canteenId` query parameter;
/// anything without a query string is treated as a bare id.
fn extract_canteen_id(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.split_once('?') {
        Some((_, query)) => query
            .split('&')
            .find_map(|pair| pair.strip_prefix("canteenId="))
            .filter(|value| !value.is_empty()),
        None => Some(raw),
    }
}
