// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for runner lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Run start and completion
//! * Phase boundaries (preflight, setup, run, cleanup)
//! * The abort flag

use crate::observability::messages::StructuredLog;
use crate::observability::Phase;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A recipe run started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use recipe_engine::observability::messages::engine::RunStarted;
///
/// let msg = RunStarted {
///     recipe: "triage",
///     preflight_count: 1,
///     module_count: 5,
///     max_concurrency: Some(4),
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Starting recipe 'triage': 1 preflights, 5 modules, max_concurrency=4"
/// );
/// ```
pub struct RunStarted<'a> {
    pub recipe: &'a str,
    pub preflight_count: usize,
    pub module_count: usize,
    pub max_concurrency: Option<usize>,
}

impl Display for RunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting recipe '{}': {} preflights, {} modules, max_concurrency=",
            self.recipe, self.preflight_count, self.module_count
        )?;
        match self.max_concurrency {
            Some(limit) => write!(f, "{}", limit),
            None => f.write_str("unbounded"),
        }
    }
}

impl StructuredLog for RunStarted<'_> {
    fn log(&self) {
        tracing::info!(
            recipe = self.recipe,
            preflight_count = self.preflight_count,
            module_count = self.module_count,
            max_concurrency = ?self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run",
            span_name = name,
            recipe = self.recipe,
            preflight_count = self.preflight_count,
            module_count = self.module_count,
        )
    }
}

/// A recipe run finished, successfully or not.
///
/// # Log Level
/// `info!` when clean, `warn!` when errors were recorded
pub struct RunCompleted<'a> {
    pub recipe: &'a str,
    pub duration: Duration,
    pub error_count: usize,
    pub aborted: bool,
}

impl Display for RunCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Recipe '{}' finished in {:?} with {} errors{}",
            self.recipe,
            self.duration,
            self.error_count,
            if self.aborted { " (aborted)" } else { "" }
        )
    }
}

impl StructuredLog for RunCompleted<'_> {
    fn log(&self) {
        if self.error_count == 0 {
            tracing::info!(
                recipe = self.recipe,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        } else {
            tracing::warn!(
                recipe = self.recipe,
                duration_ms = self.duration.as_millis() as u64,
                error_count = self.error_count,
                aborted = self.aborted,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_completed",
            span_name = name,
            recipe = self.recipe,
            duration = ?self.duration,
            error_count = self.error_count,
            aborted = self.aborted,
        )
    }
}

/// A runner phase started.
///
/// # Log Level
/// `debug!` - Phase boundaries
pub struct PhaseStarted {
    pub phase: Phase,
    pub module_count: usize,
}

impl Display for PhaseStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Entering {} phase for {} modules",
            self.phase, self.module_count
        )
    }
}

impl StructuredLog for PhaseStarted {
    fn log(&self) {
        tracing::debug!(
            phase = %self.phase,
            module_count = self.module_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "phase",
            span_name = name,
            phase = %self.phase,
            module_count = self.module_count,
        )
    }
}

/// A runner phase finished for every module in it.
///
/// # Log Level
/// `debug!` - Phase boundaries
pub struct PhaseCompleted {
    pub phase: Phase,
    pub duration: Duration,
}

impl Display for PhaseCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Finished {} phase in {:?}", self.phase, self.duration)
    }
}

impl StructuredLog for PhaseCompleted {
    fn log(&self) {
        tracing::debug!(
            phase = %self.phase,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "phase_completed",
            span_name = name,
            phase = %self.phase,
            duration = ?self.duration,
        )
    }
}

/// A critical error set the abort flag; modules that have not started running will
/// not start.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use recipe_engine::observability::messages::engine::AbortRequested;
///
/// let msg = AbortRequested {
///     module: "disk_reader",
///     reason: "image not found",
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Critical error in 'disk_reader', aborting remaining modules: image not found"
/// );
/// ```
pub struct AbortRequested<'a> {
    pub module: &'a str,
    pub reason: &'a str,
}

impl Display for AbortRequested<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Critical error in '{}', aborting remaining modules: {}",
            self.module, self.reason
        )
    }
}

impl StructuredLog for AbortRequested<'_> {
    fn log(&self) {
        tracing::error!(module = self.module, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "abort_requested",
            span_name = name,
            module = self.module,
            reason = self.reason,
        )
    }
}

/// The abort flag was already set when the setup phase began.
///
/// # Log Level
/// `warn!` - Degraded run
pub struct SetupSkipped<'a> {
    pub recipe: &'a str,
}

impl Display for SetupSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipping module setup for recipe '{}': run already aborted",
            self.recipe
        )
    }
}

impl StructuredLog for SetupSkipped<'_> {
    fn log(&self) {
        tracing::warn!(recipe = self.recipe, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("setup_skipped", span_name = name, recipe = self.recipe)
    }
}
