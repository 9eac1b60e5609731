// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue engine for the SmartQueue canteen ordering service.
//!
//! Owns token lifecycle and sequential numbering, queue-position
//! computation, derived statistics, the canteen registry, the wait-time
//! estimation fallback chain, and the broadcast change signal.

pub mod engine;
pub mod estimator;
pub mod registry;
pub mod signal;
pub mod stats;

pub use engine::QueueEngine;
pub use estimator::Estimator;
pub use registry::CanteenRegistry;
pub use signal::{ChangeSignal, QUEUE_UPDATED};
