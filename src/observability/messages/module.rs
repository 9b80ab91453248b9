// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for per-module lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Module state transitions and phase timing
//! * Module failures, recorded errors and aborts
//! * Fan-out worker pools
//! * Messages published by modules

use crate::engine::ModuleState;
use crate::errors::ModuleError;
use crate::observability::messages::StructuredLog;
use crate::observability::Phase;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A module moved to a new lifecycle state.
///
/// # Log Level
/// `trace!` - Very chatty
pub struct ModuleStateChanged<'a> {
    pub module: &'a str,
    pub state: ModuleState,
}

impl Display for ModuleStateChanged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Module '{}' is {}", self.module, self.state)
    }
}

impl StructuredLog for ModuleStateChanged<'_> {
    fn log(&self) {
        tracing::trace!(module = self.module, state = %self.state, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "module_state",
            span_name = name,
            module = self.module,
            state = %self.state,
        )
    }
}

/// A module finished one phase.
///
/// # Log Level
/// `debug!` - Per-module timing
///
/// # Example
/// ```
/// use recipe_engine::observability::messages::module::ModulePhaseCompleted;
/// use recipe_engine::observability::Phase;
/// use std::time::Duration;
///
/// let msg = ModulePhaseCompleted {
///     module: "hasher",
///     phase: Phase::Run,
///     duration: Duration::from_millis(12),
/// };
///
/// assert_eq!(msg.to_string(), "Module 'hasher' finished run in 12ms");
/// ```
pub struct ModulePhaseCompleted<'a> {
    pub module: &'a str,
    pub phase: Phase,
    pub duration: Duration,
}

impl Display for ModulePhaseCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' finished {} in {:?}",
            self.module, self.phase, self.duration
        )
    }
}

impl StructuredLog for ModulePhaseCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            module = self.module,
            phase = %self.phase,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "module_phase",
            span_name = name,
            module = self.module,
            phase = %self.phase,
        )
    }
}

/// A module method returned an error or panicked.
///
/// # Log Level
/// `error!` for critical errors, `warn!` otherwise
pub struct ModuleFailed<'a> {
    pub module: &'a str,
    pub phase: Phase,
    pub error: &'a ModuleError,
}

impl Display for ModuleFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' failed during {}: {}",
            self.module, self.phase, self.error
        )
    }
}

impl StructuredLog for ModuleFailed<'_> {
    fn log(&self) {
        if self.error.critical {
            tracing::error!(
                module = self.module,
                phase = %self.phase,
                unexpected = self.error.unexpected,
                stacktrace = ?self.error.stacktrace,
                "{}", self
            );
        } else {
            tracing::warn!(module = self.module, phase = %self.phase, "{}", self);
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "module_failed",
            span_name = name,
            module = self.module,
            phase = %self.phase,
            critical = self.error.critical,
        )
    }
}

/// A module recorded a non-critical error and carried on.
///
/// # Log Level
/// `warn!` - Degraded result
pub struct ModuleErrorRecorded<'a> {
    pub module: &'a str,
    pub error: &'a ModuleError,
}

impl Display for ModuleErrorRecorded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Module '{}' reported: {}", self.module, self.error)
    }
}

impl StructuredLog for ModuleErrorRecorded<'_> {
    fn log(&self) {
        tracing::warn!(module = self.module, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("module_error", span_name = name, module = self.module)
    }
}

/// A module never ran because the abort flag was set.
///
/// # Log Level
/// `warn!` - Skipped work
pub struct ModuleAborted<'a> {
    pub module: &'a str,
}

impl Display for ModuleAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' will not run: execution was aborted",
            self.module
        )
    }
}

impl StructuredLog for ModuleAborted<'_> {
    fn log(&self) {
        tracing::warn!(module = self.module, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("module_aborted", span_name = name, module = self.module)
    }
}

/// A fan-out module handed its containers to a worker pool.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use recipe_engine::observability::messages::module::FanOutDispatched;
///
/// let msg = FanOutDispatched {
///     module: "hasher",
///     container_type: "fspath",
///     container_count: 5,
///     pool_size: 2,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Module 'hasher' processing 5 fspath containers on 2 workers"
/// );
/// ```
pub struct FanOutDispatched<'a> {
    pub module: &'a str,
    pub container_type: &'a str,
    pub container_count: usize,
    pub pool_size: usize,
}

impl Display for FanOutDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' processing {} {} containers on {} workers",
            self.module, self.container_count, self.container_type, self.pool_size
        )
    }
}

impl StructuredLog for FanOutDispatched<'_> {
    fn log(&self) {
        tracing::info!(
            module = self.module,
            container_type = self.container_type,
            container_count = self.container_count,
            pool_size = self.pool_size,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "fan_out",
            span_name = name,
            module = self.module,
            container_type = self.container_type,
            pool_size = self.pool_size,
        )
    }
}

/// A fan-out worker failed after an earlier worker already did; only the first
/// error is returned from the module.
///
/// # Log Level
/// `warn!` - Secondary failure
pub struct AdditionalWorkerFailure<'a> {
    pub module: &'a str,
    pub error: &'a ModuleError,
}

impl Display for AdditionalWorkerFailure<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' had another worker failure: {}",
            self.module, self.error
        )
    }
}

impl StructuredLog for AdditionalWorkerFailure<'_> {
    fn log(&self) {
        tracing::warn!(
            module = self.module,
            critical = self.error.critical,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("worker_failure", span_name = name, module = self.module)
    }
}

/// A module published a message for the operator.
///
/// # Log Level
/// `info!`, or `error!` when the message is flagged as an error
pub struct MessagePublished<'a> {
    pub source: &'a str,
    pub message: &'a str,
    pub is_error: bool,
}

impl Display for MessagePublished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "[{}] {}", self.source, self.message)
    }
}

impl StructuredLog for MessagePublished<'_> {
    fn log(&self) {
        if self.is_error {
            tracing::error!(source = self.source, "{}", self);
        } else {
            tracing::info!(source = self.source, "{}", self);
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "message",
            span_name = name,
            source = self.source,
            is_error = self.is_error,
        )
    }
}
