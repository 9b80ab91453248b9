// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for recipe validation and argument resolution.
//!
//! This module contains message types for logging events related to:
//! * Recipe dependency graph validation
//! * Placeholder substitution in module arguments

use crate::errors::ValidationError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Recipe validation started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use recipe_engine::observability::messages::validation::ValidationStarted;
///
/// let msg = ValidationStarted {
///     recipe: "triage",
///     module_count: 5,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ValidationStarted<'a> {
    pub recipe: &'a str,
    pub module_count: usize,
}

impl Display for ValidationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Validating recipe '{}' with {} modules",
            self.recipe, self.module_count
        )
    }
}

impl StructuredLog for ValidationStarted<'_> {
    fn log(&self) {
        tracing::info!(
            recipe = self.recipe,
            module_count = self.module_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::INFO,
            "span_name",
            name = name,
            recipe = self.recipe,
            module_count = self.module_count,
        )
    }
}

/// Recipe validation completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ValidationCompleted<'a> {
    pub recipe: &'a str,
    pub module_count: usize,
}

impl Display for ValidationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Recipe '{}' validated successfully ({} modules)",
            self.recipe, self.module_count
        )
    }
}

impl StructuredLog for ValidationCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            recipe = self.recipe,
            module_count = self.module_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::INFO,
            "span_name",
            name = name,
            recipe = self.recipe,
            module_count = self.module_count,
        )
    }
}

/// Recipe validation failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use recipe_engine::errors::ValidationError;
/// use recipe_engine::observability::messages::validation::ValidationFailed;
///
/// let errors = vec![ValidationError::MissingName];
/// let msg = ValidationFailed {
///     recipe: "triage",
///     errors: &errors,
/// };
///
/// assert_eq!(msg.to_string(), "Recipe 'triage' failed validation with 1 errors");
/// ```
pub struct ValidationFailed<'a> {
    pub recipe: &'a str,
    pub errors: &'a [ValidationError],
}

impl Display for ValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Recipe '{}' failed validation with {} errors",
            self.recipe,
            self.errors.len()
        )
    }
}

impl StructuredLog for ValidationFailed<'_> {
    fn log(&self) {
        for error in self.errors {
            tracing::error!(recipe = self.recipe, error = %error, "Validation error");
        }
        tracing::error!(
            recipe = self.recipe,
            error_count = self.errors.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            recipe = self.recipe,
            error_count = self.errors.len(),
        )
    }
}

/// Module arguments still contain `@token` placeholders after resolution.
///
/// # Log Level
/// `warn!` - Usually a missing running argument
pub struct UnresolvedPlaceholders<'a> {
    pub module: &'a str,
    pub placeholders: &'a [String],
}

impl Display for UnresolvedPlaceholders<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' has unresolved placeholders: {}",
            self.module,
            self.placeholders.join(", ")
        )
    }
}

impl StructuredLog for UnresolvedPlaceholders<'_> {
    fn log(&self) {
        tracing::warn!(
            module = self.module,
            placeholders = ?self.placeholders,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::WARN,
            "span_name",
            name = name,
            module = self.module,
            placeholder_count = self.placeholders.len(),
        )
    }
}
