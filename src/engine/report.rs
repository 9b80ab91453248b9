// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use crate::errors::ModuleError;

/// Where a module is in its lifecycle.
///
/// `Pending -> SettingUp -> WaitingOnDependencies -> Running -> Completed`, with
/// `Aborted` reachable from any state before `Running`. `Completed` and `Aborted`
/// are final. A module that failed while running still ends `Completed`; the failure
/// is in the report's errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleState {
    Pending,
    SettingUp,
    WaitingOnDependencies,
    Running,
    Completed,
    Aborted,
}

impl Display for ModuleState {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let name = match self {
            ModuleState::Pending => "pending",
            ModuleState::SettingUp => "setting up",
            ModuleState::WaitingOnDependencies => "waiting on dependencies",
            ModuleState::Running => "running",
            ModuleState::Completed => "completed",
            ModuleState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Outcome of a recipe run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub recipe: String,
    /// Every error recorded during the run, in recording order.
    pub errors: Vec<ModuleError>,
    /// Final state of every preflight and module, by runtime name.
    pub states: HashMap<String, ModuleState>,
    /// Whether a critical error set the abort flag.
    pub aborted: bool,
}

impl RunReport {
    /// No critical error was recorded.
    pub fn is_success(&self) -> bool {
        !self.errors.iter().any(|e| e.critical)
    }

    /// Non-critical errors.
    pub fn warnings(&self) -> impl Iterator<Item = &ModuleError> {
        self.errors.iter().filter(|e| !e.critical)
    }

    pub fn critical_errors(&self) -> impl Iterator<Item = &ModuleError> {
        self.errors.iter().filter(|e| e.critical)
    }

    pub fn state(&self, runtime_name: &str) -> Option<ModuleState> {
        self.states.get(runtime_name).copied()
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let outcome = if self.is_success() {
            "succeeded"
        } else if self.aborted {
            "aborted"
        } else {
            "failed"
        };
        write!(
            f,
            "Recipe '{}' {} with {} errors",
            self.recipe,
            outcome,
            self.errors.len()
        )?;
        for error in &self.errors {
            let kind = match (error.critical, error.unexpected) {
                (_, true) => "unexpected",
                (true, false) => "critical",
                (false, false) => "warning",
            };
            write!(
                f,
                "\n  [{}] {}: {}",
                kind,
                error.module.as_deref().unwrap_or("<runner>"),
                error.message
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(errors: Vec<ModuleError>, aborted: bool) -> RunReport {
        RunReport {
            recipe: "r".into(),
            errors,
            states: HashMap::new(),
            aborted,
        }
    }

    #[test]
    fn test_warnings_do_not_fail_the_run() {
        let report = report(vec![ModuleError::new("soft").with_module("a")], false);
        assert!(report.is_success());
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(report.critical_errors().count(), 0);
    }

    #[test]
    fn test_display_lists_errors() {
        let report = report(
            vec![
                ModuleError::critical("disk full").with_module("writer"),
                ModuleError::unexpected("panic"),
            ],
            true,
        );
        assert!(!report.is_success());

        let text = report.to_string();
        assert!(text.starts_with("Recipe 'r' aborted with 2 errors"));
        assert!(text.contains("[critical] writer: disk full"));
        assert!(text.contains("[unexpected] <runner>: panic"));
    }
}
