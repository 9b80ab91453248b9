// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Run telemetry: key/value events attributed to a module and recipe.
//!
//! The runner records how long each module spent in every phase
//! (`preflights_delta`, `setup_delta`, `run_delta`, `cleanup_delta`), and modules add
//! their own entries through [`ModuleContext::log_telemetry`](crate::engine::ModuleContext::log_telemetry).
//! Sinks are swappable; [`InMemoryTelemetry`] keeps everything for a summary at the
//! end of the run and [`TracingTelemetry`] forwards each entry to `tracing`.

use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Runner phases that produce timing telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Preflight,
    SetUp,
    Run,
    CleanUp,
}

impl Phase {
    /// Telemetry key for the time a module spent in this phase.
    pub fn delta_key(&self) -> &'static str {
        match self {
            Phase::Preflight => "preflights_delta",
            Phase::SetUp => "setup_delta",
            Phase::Run => "run_delta",
            Phase::CleanUp => "cleanup_delta",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let name = match self {
            Phase::Preflight => "preflight",
            Phase::SetUp => "setup",
            Phase::Run => "run",
            Phase::CleanUp => "cleanup",
        };
        f.write_str(name)
    }
}

/// One module finishing one phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseEvent {
    pub module: String,
    pub phase: Phase,
    pub duration: Duration,
    pub failed: bool,
}

/// Telemetry sink shared by the runner and every module.
pub trait Telemetry: Send + Sync {
    fn log_telemetry(&self, key: &str, value: &str, module: &str, recipe: &str);

    /// Record a phase timing. The default stores it as a `<phase>_delta` entry.
    fn record_phase(&self, event: &PhaseEvent, recipe: &str) {
        self.log_telemetry(
            event.phase.delta_key(),
            &format!("{:?}", event.duration),
            &event.module,
            recipe,
        );
    }
}

/// A stored telemetry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryEntry {
    pub timestamp: SystemTime,
    pub recipe: String,
    pub module: String,
    pub key: String,
    pub value: String,
}

impl Display for TelemetryEntry {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "\t{}: \t{} ({} in {})",
            self.key, self.value, self.module, self.recipe
        )
    }
}

/// Keeps every entry in memory, tagged with a per-process workflow id.
#[derive(Debug)]
pub struct InMemoryTelemetry {
    workflow_id: String,
    entries: Mutex<Vec<TelemetryEntry>>,
}

impl InMemoryTelemetry {
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        Self {
            workflow_id: format!("{:x}-{:x}", nanos, std::process::id()),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    pub fn entries(&self) -> Vec<TelemetryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn entries_for(&self, module: &str) -> Vec<TelemetryEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.module == module)
            .collect()
    }

    /// Every entry in recording order, under a header naming the workflow.
    pub fn format_telemetry(&self) -> String {
        let mut output = vec![format!("Telemetry information for: {}", self.workflow_id)];
        output.extend(self.entries().iter().map(ToString::to_string));
        output.join("\n")
    }
}

impl Default for InMemoryTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl Telemetry for InMemoryTelemetry {
    fn log_telemetry(&self, key: &str, value: &str, module: &str, recipe: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(TelemetryEntry {
                timestamp: SystemTime::now(),
                recipe: recipe.to_string(),
                module: module.to_string(),
                key: key.to_string(),
                value: value.to_string(),
            });
    }
}

/// Forwards every entry to `tracing` at `info!` under the `telemetry` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn log_telemetry(&self, key: &str, value: &str, module: &str, recipe: &str) {
        tracing::info!(target: "telemetry", key, value, module, recipe, "{key}: {value}");
    }

    fn record_phase(&self, event: &PhaseEvent, recipe: &str) {
        tracing::info!(
            target: "telemetry",
            module = %event.module,
            phase = %event.phase,
            duration_ms = event.duration.as_millis() as u64,
            failed = event.failed,
            recipe,
            "{} finished {} in {:?}",
            event.module,
            event.phase,
            event.duration
        );
    }
}
