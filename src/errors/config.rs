// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors that can occur during recipe dependency graph validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A circular dependency was detected in the module graph
    #[error("Cyclic dependency detected: {}", cycle.join(" -> "))]
    CyclicDependency {
        /// The cycle path showing the circular dependency
        cycle: Vec<String>,
    },

    /// A module wants a runtime name that doesn't exist in the recipe
    #[error("Module '{module}' wants '{missing_dependency}' which does not exist")]
    UnresolvedDependency {
        module: String,
        missing_dependency: String,
    },

    /// Two modules resolve to the same runtime name
    #[error("Duplicate runtime name: '{runtime_name}'")]
    DuplicateRuntimeName { runtime_name: String },

    /// A module node has an empty name
    #[error("Name not set for module in recipe")]
    MissingName,
}

/// Configuration errors. All of these fail fast, before any module executes.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Recipe validation failed:\n{}", join_validation_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Container store has not parsed a recipe yet")]
    RecipeNotParsed,

    #[error("Container store already holds a parsed recipe; reset it first")]
    RecipeAlreadyParsed,

    #[error("Unknown module runtime name '{0}'")]
    UnknownModule(String),

    #[error("Must specify both key and value for a metadata filter")]
    IncompleteMetadataFilter,

    #[error("Module '{name}' cannot be found. It may not have been registered.")]
    UnregisteredModule { name: String },

    #[error("Module '{name}' is already registered")]
    DuplicateRegistration { name: String },

    #[error("Module '{runtime_name}' is a {actual} module but is declared as a {expected}")]
    WrongModuleKind {
        runtime_name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Module '{runtime_name}' declares an invalid argument set: {reason}")]
    InvalidArguments { runtime_name: String, reason: String },

    #[error("Unsupported recipe format '{extension}' (expected yaml, yml, json or toml)")]
    UnsupportedFormat { extension: String },

    #[error("Failed to read recipe: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML recipe: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON recipe: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML recipe: {0}")]
    Toml(#[from] toml::de::Error),
}

impl From<Vec<ValidationError>> for ConfigError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ConfigError::Validation(errors)
    }
}

fn join_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
