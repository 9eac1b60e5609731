// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broadcast change signal for queue observers.
//!
//! Every committed mutation is followed by a zero-payload `queue-updated`
//! broadcast. Consumers re-fetch what they need rather than receiving a
//! delta. Delivery is fire-and-forget: a slow, lagging, or dropped receiver
//! can never block a mutation or affect other listeners.

use tokio::sync::broadcast;
use tracing::trace;

/// Event name carried to external consumers (e.g. the SSE feed).
pub const QUEUE_UPDATED: &str = "queue-updated";

/// Buffered notifications per receiver before it starts lagging. Lagged
/// receivers observe a `Lagged` error and simply re-fetch.
const CHANNEL_CAPACITY: usize = 64;

/// Process-wide broadcast of "queue state changed" notifications.
#[derive(Clone)]
pub struct ChangeSignal {
    tx: broadcast::Sender<()>,
}

impl ChangeSignal {
    /// Create a new signal with no subscribers.
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Register an observer. The receiver only sees notifications sent after
    /// this call.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Broadcast a queue-updated notification.
    ///
    /// Never fails and never blocks; with no subscribers the notification is
    /// simply dropped.
    pub fn notify(&self) {
        let receivers = self.tx.send(()).unwrap_or(0);
        trace!(receivers, "{QUEUE_UPDATED}");
    }

    /// Number of currently subscribed observers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeSignal {
    fn default() -> Self {
        Self::new()
    }
}
