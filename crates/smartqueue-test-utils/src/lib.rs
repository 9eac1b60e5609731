// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test utilities for the SmartQueue workspace.
//!
//! Provides a scripted [`MockPredictor`] so engine and gateway tests run
//! deterministically without network access.

pub mod mock_predictor;

pub use mock_predictor::MockPredictor;
