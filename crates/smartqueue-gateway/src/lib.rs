// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the SmartQueue service.
//!
//! Exposes the queue engine's operations as a JSON API plus a Server-Sent
//! Events feed of change-signal notifications. Presentation stays with the
//! clients; this crate is the non-visual boundary surface only.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{build_router, start_server, GatewayState};
