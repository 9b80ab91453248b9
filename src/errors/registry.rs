// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Mutex, PoisonError};

use crate::errors::ModuleError;

/// Central, append-only record of every error raised during a run.
///
/// Errors are kept in the order they were recorded so reports can enumerate exactly
/// which modules failed and how.
#[derive(Debug, Default)]
pub struct ErrorRegistry {
    errors: Mutex<Vec<ModuleError>>,
}

impl ErrorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, error: ModuleError) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error);
    }

    /// Snapshot of everything recorded so far.
    pub fn errors(&self) -> Vec<ModuleError> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_critical(&self) -> bool {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|e| e.critical)
    }

    pub fn for_module(&self, module: &str) -> Vec<ModuleError> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.module.as_deref() == Some(module))
            .cloned()
            .collect()
    }
}
