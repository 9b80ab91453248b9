// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::modules::*;
use crate::config::{ModuleRegistry, RegisteredModule};
use crate::errors::ConfigError;

/// Registers the built-in local modules.
pub struct LocalModuleFactory;

impl LocalModuleFactory {
    /// Register every local module under its recipe name:
    /// - "arg_check" -> ArgCheck (preflight)
    /// - "text_source" -> TextSource
    /// - "change_text_case" -> ChangeTextCase (thread-aware)
    /// - "word_counter" -> WordCounter
    /// - "console_reporter" -> ConsoleReporter
    pub fn register_all(registry: &mut ModuleRegistry) -> Result<(), ConfigError> {
        registry.register("arg_check", |_: &str| {
            RegisteredModule::Preflight(Arc::new(ArgCheck::default()))
        })?;
        registry.register("text_source", |_: &str| {
            RegisteredModule::Module(Arc::new(TextSource::default()))
        })?;
        registry.register("change_text_case", |_: &str| {
            RegisteredModule::ThreadAware(Arc::new(ChangeTextCase::default()))
        })?;
        registry.register("word_counter", |_: &str| {
            RegisteredModule::Module(Arc::new(WordCounter::default()))
        })?;
        registry.register("console_reporter", |_: &str| {
            RegisteredModule::Module(Arc::new(ConsoleReporter::default()))
        })?;
        Ok(())
    }

    /// List all available local module names
    pub fn list_available_modules() -> Vec<&'static str> {
        vec![
            "arg_check",
            "change_text_case",
            "console_reporter",
            "text_source",
            "word_counter",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all_matches_listing() {
        let mut registry = ModuleRegistry::new();
        LocalModuleFactory::register_all(&mut registry).unwrap();

        assert_eq!(registry.names(), LocalModuleFactory::list_available_modules());
    }

    #[test]
    fn test_contracts() {
        let mut registry = ModuleRegistry::new();
        LocalModuleFactory::register_all(&mut registry).unwrap();

        let test_cases = vec![
            ("arg_check", "preflight"),
            ("text_source", "module"),
            ("change_text_case", "thread-aware module"),
            ("word_counter", "module"),
            ("console_reporter", "module"),
        ];

        for (name, kind) in test_cases {
            let module = registry.create(name, name).unwrap();
            assert_eq!(module.kind(), kind, "Failed for module: {}", name);
        }
    }

    #[test]
    fn test_registering_twice_fails() {
        let mut registry = ModuleRegistry::new();
        LocalModuleFactory::register_all(&mut registry).unwrap();

        let result = LocalModuleFactory::register_all(&mut registry);
        assert!(matches!(result, Err(ConfigError::DuplicateRegistration { .. })));
    }
}
