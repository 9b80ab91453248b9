// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability: structured logging and run telemetry.
//!
//! Log output goes through centralized message types so that every event carries the
//! same structured fields wherever it is emitted. Message types follow a struct-based
//! pattern with a `Display` implementation and the [`messages::StructuredLog`] trait.
//!
//! # Architecture
//!
//! * `messages::engine` - Runner lifecycle, phases and the abort flag
//! * `messages::module` - Per-module lifecycle, fan-out pools and published messages
//! * `messages::store` - Container store bookkeeping
//! * `messages::validation` - Recipe validation and argument resolution
//! * `telemetry` - Key/value telemetry sinks fed by the runner and by modules
//!
//! # Usage
//!
//! ```rust
//! use recipe_engine::observability::messages::engine::AbortRequested;
//! use recipe_engine::observability::messages::StructuredLog;
//!
//! AbortRequested {
//!     module: "disk_reader",
//!     reason: "image not found",
//! }
//! .log();
//! ```

pub mod messages;
pub mod telemetry;

pub use telemetry::{
    InMemoryTelemetry, Phase, PhaseEvent, Telemetry, TelemetryEntry, TracingTelemetry,
};
