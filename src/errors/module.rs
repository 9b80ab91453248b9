// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by modules while setting up or running.

use thiserror::Error;

use crate::errors::{ConfigError, ContainerError};

/// A failure reported by (or on behalf of) a module.
///
/// `critical` errors set the run's abort flag so that no module which has not yet
/// started its run phase will start. `unexpected` marks failures that were not
/// raised deliberately by the module (panics, foreign errors) and is diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ModuleError {
    pub message: String,
    /// Runtime name of the module the error belongs to; filled in by the runner
    /// when a module returns an error without one.
    pub module: Option<String>,
    pub critical: bool,
    pub unexpected: bool,
    /// Diagnostic detail for unexpected errors: the panic's join error or the
    /// foreign error's full chain (and backtrace, when one was captured).
    pub stacktrace: Option<String>,
}

impl ModuleError {
    /// A recoverable error: recorded, execution continues.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            module: None,
            critical: false,
            unexpected: false,
            stacktrace: None,
        }
    }

    /// An error that aborts every module that has not started running yet.
    pub fn critical(message: impl Into<String>) -> Self {
        Self {
            critical: true,
            ..Self::new(message)
        }
    }

    /// A critical error the module did not raise on purpose.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self {
            critical: true,
            unexpected: true,
            ..Self::new(message)
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_stacktrace(mut self, stacktrace: impl Into<String>) -> Self {
        self.stacktrace = Some(stacktrace.into());
        self
    }

    /// Attach the module name only if the error doesn't carry one already.
    pub(crate) fn attributed_to(mut self, module: &str) -> Self {
        if self.module.is_none() {
            self.module = Some(module.to_string());
        }
        self
    }
}

/// Misusing the container store from inside a module is a bug in the module:
/// treat it as critical.
impl From<ConfigError> for ModuleError {
    fn from(error: ConfigError) -> Self {
        ModuleError::critical(error.to_string())
    }
}

impl From<anyhow::Error> for ModuleError {
    fn from(error: anyhow::Error) -> Self {
        ModuleError::unexpected(format!("{error:#}")).with_stacktrace(format!("{error:?}"))
    }
}

impl From<ContainerError> for ModuleError {
    fn from(error: ContainerError) -> Self {
        ModuleError::critical(error.to_string())
    }
}
