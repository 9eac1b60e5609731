// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events feed of queue change notifications.
//!
//! Every committed mutation broadcasts a zero-payload `queue-updated` event;
//! consumers re-fetch whatever they display rather than receiving deltas.
//!
//! SSE event format:
//! ```text
//! event: queue-updated
//! data:
//! ```

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream};
use tokio::sync::broadcast;

use smartqueue_engine::QUEUE_UPDATED;

use crate::server::GatewayState;

/// GET /api/events
///
/// Streams `queue-updated` events for as long as the client stays connected.
/// A consumer that lags far enough to miss notifications receives a single
/// collapsed event and re-fetches; missed intermediate states carry no
/// information of their own.
pub async fn get_events(
    State(state): State<GatewayState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.signal.subscribe();

    let stream = stream::unfold(rx, |mut rx| async move {
        match rx.recv().await {
            Ok(()) => Some((Ok(Event::default().event(QUEUE_UPDATED).data("")), rx)),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "SSE consumer lagged, collapsing notifications");
                Some((Ok(Event::default().event(QUEUE_UPDATED).data("")), rx))
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
