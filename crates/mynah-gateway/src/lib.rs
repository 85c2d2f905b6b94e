// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator HTTP gateway for the Mynah agent.
//!
//! Serves a small unauthenticated surface for process supervision: a
//! `/health` endpoint reporting service status, admission pipeline
//! readiness, and uptime. The gateway is read-only; chat traffic never
//! flows through it.

pub mod health;
pub mod server;

pub use server::GatewayServer;
