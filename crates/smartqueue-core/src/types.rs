// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types used across SmartQueue crates.
//!
//! All record types are JSON-serializable; they define the logical layout of
//! the persisted collections (`canteens`, `tokens`, `history`) as well as the
//! payloads exchanged with the predictor capability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a canteen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanteenId(pub String);

impl std::fmt::Display for CanteenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a queue token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub String);

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a queue token.
///
/// The allowed transitions form a strict DAG:
/// `WAITING -> READY`, `WAITING -> COMPLETED`, `READY -> COMPLETED`, and any
/// non-terminal status `-> CANCELLED`. `COMPLETED` and `CANCELLED` are
/// terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Waiting,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Returns true when no further transitions are permitted.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Returns true when `next` is a legal transition from this status.
    #[must_use]
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::{Cancelled, Completed, Ready, Waiting};
        match (self, next) {
            (Waiting, Ready) | (Waiting, Completed) | (Ready, Completed) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// An independently-queued service point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Canteen {
    /// Opaque unique identifier.
    pub id: CanteenId,
    /// Display name.
    pub name: String,
    /// Campus the canteen is located on.
    pub campus: String,
    /// Theme tag assigned at registration (used by display layers).
    pub theme_tag: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// One placed order's queue ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Globally unique identifier, assigned at creation.
    pub id: TokenId,
    /// The canteen this token belongs to.
    pub canteen_id: CanteenId,
    /// Per-canteen, per-day sequential display label (`A-001`, `A-002`, ...).
    /// Never reused or renumbered.
    pub token_number: String,
    /// Name of the ordered item.
    pub food_item: String,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Creation timestamp — the lifecycle clock origin.
    pub created_at: DateTime<Utc>,
    /// Local calendar day of creation (`YYYY-MM-DD`), captured once at
    /// creation. Token numbering and daily statistics scope on this value.
    pub created_day: String,
    /// Local hour-of-day of creation (0-23), captured once at creation.
    pub created_hour: u32,
    /// Completion timestamp, set exactly once on transition into COMPLETED.
    pub completed_at: Option<DateTime<Utc>>,
    /// Current wait estimate in minutes. Updated while WAITING, frozen after.
    pub estimated_wait_minutes: u32,
    /// Optional explanation attached alongside an estimate or completion.
    pub estimation_reasoning: Option<String>,
}

/// One completed order's preparation record, used as training signal for
/// future estimates. The store keeps a bounded rolling window of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Unique record identifier.
    pub id: String,
    /// Item the order was for.
    pub food_item: String,
    /// Minutes between order creation and completion.
    pub prep_time_minutes: u32,
    /// Local hour-of-day the order was created (0-23).
    pub hour_of_day: u32,
    /// When the record was appended.
    pub recorded_at: DateTime<Utc>,
}

/// Derived queue statistics for a single canteen.
///
/// Always computed fresh from the token store — no separate counters are
/// maintained, so live and reported numbers cannot drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStats {
    /// Tokens created today, all statuses.
    pub total_orders_today: u32,
    /// Tokens currently WAITING.
    pub active_queue_length: u32,
    /// Mean wait of COMPLETED tokens in minutes; 0 when none completed.
    pub average_wait_minutes: f64,
    /// Busiest creation hour today, when any orders exist.
    pub peak_hour: Option<String>,
}

/// One slot of the hourly order histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficBucket {
    /// Hour of day (0-23).
    pub hour: u32,
    /// Display label, e.g. `9 AM` or `12 PM`.
    pub label: String,
    /// Orders created in this hour today.
    pub orders: u32,
}

/// A static orderable menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub id: &'static str,
    pub name: &'static str,
}

/// The static menu. Catalog management beyond this list is out of scope.
pub const MENU_ITEMS: [MenuItem; 7] = [
    MenuItem { id: "vadapav", name: "Vada Pav" },
    MenuItem { id: "alooparatha", name: "Aloo Paratha" },
    MenuItem { id: "samosa", name: "Samosa" },
    MenuItem { id: "masaladosa", name: "Masala Dosa" },
    MenuItem { id: "cholebhature", name: "Chole Bhature" },
    MenuItem { id: "sandwich", name: "Veg Sandwich" },
    MenuItem { id: "coffee", name: "Cold Coffee" },
];

// --- Predictor exchange types ---

/// A wait-time estimate produced by the predictor or a local fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    /// Estimated wait in minutes.
    pub minutes: u32,
    /// One-sentence explanation for the student.
    pub reasoning: String,
}

/// A historically-informed wait-time estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEstimate {
    /// Estimated wait in minutes.
    pub minutes: u32,
    /// One-sentence explanation for the student.
    pub reasoning: String,
    /// Whether the current hour was judged a peak hour.
    pub is_peak_hour: bool,
}

/// A recommendation on whether an order should be marked complete now.
///
/// Advisory only: staff-initiated completions always proceed regardless of
/// the recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionAdvice {
    /// Whether the advisor recommends completing now.
    pub should_complete: bool,
    /// One-sentence explanation for the decision.
    pub reasoning: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_transition_dag() {
        use OrderStatus::{Cancelled, Completed, Ready, Waiting};

        assert!(Waiting.can_transition_to(Ready));
        assert!(Waiting.can_transition_to(Completed));
        assert!(Ready.can_transition_to(Completed));
        assert!(Waiting.can_transition_to(Cancelled));
        assert!(Ready.can_transition_to(Cancelled));

        // No transitions out of terminal states.
        assert!(!Completed.can_transition_to(Waiting));
        assert!(!Completed.can_transition_to(Ready));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Waiting));
        assert!(!Cancelled.can_transition_to(Completed));

        // No backwards or self edges.
        assert!(!Ready.can_transition_to(Waiting));
        assert!(!Waiting.can_transition_to(Waiting));
        assert!(!Completed.can_transition_to(Completed));
    }

    #[test]
    fn status_terminal_flags() {
        assert!(!OrderStatus::Waiting.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn status_display_and_parse_roundtrip() {
        for status in [
            OrderStatus::Waiting,
            OrderStatus::Ready,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            let s = status.to_string();
            assert_eq!(s, s.to_uppercase(), "stored form is uppercase");
            let parsed = OrderStatus::from_str(&s).expect("should parse back");
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn status_serde_matches_stored_form() {
        let json = serde_json::to_string(&OrderStatus::Waiting).unwrap();
        assert_eq!(json, "\"WAITING\"");
        let parsed: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }

    #[test]
    fn token_serializes_with_all_fields() {
        let token = Token {
            id: TokenId("tok-1".into()),
            canteen_id: CanteenId("can-1".into()),
            token_number: "A-001".into(),
            food_item: "Samosa".into(),
            status: OrderStatus::Waiting,
            created_at: Utc::now(),
            created_day: "2026-03-02".into(),
            created_hour: 12,
            completed_at: None,
            estimated_wait_minutes: 5,
            estimation_reasoning: None,
        };
        let json = serde_json::to_string(&token).unwrap();
        assert!(json.contains("\"token_number\":\"A-001\""));
        assert!(json.contains("\"status\":\"WAITING\""));
    }

    #[test]
    fn menu_has_seven_unique_items() {
        assert_eq!(MENU_ITEMS.len(), 7);
        let mut ids: Vec<_> = MENU_ITEMS.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 7, "menu item ids must be unique");
    }
}
