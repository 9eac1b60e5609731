// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability trait definitions.
//!
//! The wait-time predictor is the single pluggable capability in SmartQueue;
//! it uses `#[async_trait]` for dynamic dispatch compatibility.

pub mod predictor;

pub use predictor::PredictorAdapter;
