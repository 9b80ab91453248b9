// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! This module contains all message types used throughout the recipe engine for
//! diagnostic and operational logging. Each message type implements `Display` for
//! consistent, human-readable output and [`StructuredLog`] so call sites emit the
//! same fields every time.
//!
//! # Organization
//!
//! Messages are organized by subsystem:
//!
//! * `engine` - Runner lifecycle, phases and the abort flag
//! * `module` - Per-module lifecycle, fan-out pools and published messages
//! * `store` - Container store bookkeeping and garbage collection
//! * `validation` - Recipe validation and argument resolution
//!
//! # Usage Pattern
//!
//! ```rust
//! use recipe_engine::observability::messages::engine::RunStarted;
//! use recipe_engine::observability::messages::StructuredLog;
//!
//! let msg = RunStarted {
//!     recipe: "text_pipeline",
//!     preflight_count: 1,
//!     module_count: 4,
//!     max_concurrency: None,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod engine;
pub mod module;
pub mod store;
pub mod validation;

/// A message that knows how to log itself with structured fields.
pub trait StructuredLog {
    /// Emit the message at its designated level.
    fn log(&self);

    /// A span carrying the message's fields, for work that belongs to the event.
    fn span(&self, name: &str) -> Span;
}
