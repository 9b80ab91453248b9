// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::ConfigError;
use crate::traits::{Module, PreflightModule, ThreadAwareModule};

/// A freshly created module instance, tagged with the contract it implements.
#[derive(Clone)]
pub enum RegisteredModule {
    Module(Arc<dyn Module>),
    ThreadAware(Arc<dyn ThreadAwareModule>),
    Preflight(Arc<dyn PreflightModule>),
}

impl RegisteredModule {
    pub fn kind(&self) -> &'static str {
        match self {
            RegisteredModule::Module(_) => "module",
            RegisteredModule::ThreadAware(_) => "thread-aware module",
            RegisteredModule::Preflight(_) => "preflight",
        }
    }
}

impl fmt::Debug for RegisteredModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegisteredModule({})", self.kind())
    }
}

/// Builds a module instance for the given runtime name.
pub type ModuleFactory = Arc<dyn Fn(&str) -> RegisteredModule + Send + Sync>;

/// Explicit table of every module a runner can instantiate.
///
/// Built once at process start and handed to the runner; there is no global
/// registration. Each recipe node gets its own instance from the factory, so two
/// nodes naming the same module never share state.
///
/// # Example
/// ```
/// use recipe_engine::config::ModuleRegistry;
/// use recipe_engine::backends::local::LocalModuleFactory;
///
/// let mut registry = ModuleRegistry::new();
/// LocalModuleFactory::register_all(&mut registry).unwrap();
///
/// assert!(registry.contains("word_counter"));
/// assert!(registry.create("nope", "nope").is_err());
/// ```
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`; registering a name twice is an error.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> RegisteredModule + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(ConfigError::DuplicateRegistration { name });
        }
        self.factories.insert(name, Arc::new(factory));
        Ok(())
    }

    /// Register `factory` under `name`, replacing any previous registration.
    pub fn register_or_replace<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&str) -> RegisteredModule + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered module names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn create(&self, name: &str, runtime_name: &str) -> Result<RegisteredModule, ConfigError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ConfigError::UnregisteredModule {
                name: name.to_string(),
            })?;
        Ok(factory(runtime_name))
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{StubModule, StubPreflight};

    #[test]
    fn test_register_and_create() {
        let mut registry = ModuleRegistry::new();
        registry
            .register("stub", |_: &str| {
                RegisteredModule::Module(Arc::new(StubModule::default()))
            })
            .unwrap();

        assert!(registry.contains("stub"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.create("stub", "stub_1").unwrap().kind(), "module");
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = ModuleRegistry::new();
        let factory =
            |_: &str| RegisteredModule::Preflight(Arc::new(StubPreflight::default()));
        registry.register("check", factory).unwrap();

        assert!(matches!(
            registry.register("check", factory),
            Err(ConfigError::DuplicateRegistration { name }) if name == "check"
        ));

        registry.register_or_replace("check", |_: &str| {
            RegisteredModule::Module(Arc::new(StubModule::default()))
        });
        assert_eq!(registry.create("check", "check").unwrap().kind(), "module");
    }

    #[test]
    fn test_unregistered_name() {
        let registry = ModuleRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.create("ghost", "ghost"),
            Err(ConfigError::UnregisteredModule { name }) if name == "ghost"
        ));
    }

    #[test]
    fn test_names_are_sorted() {
        let mut registry = ModuleRegistry::new();
        for name in ["b", "c", "a"] {
            registry
                .register(name, |_: &str| {
                    RegisteredModule::Module(Arc::new(StubModule::default()))
                })
                .unwrap();
        }
        assert_eq!(registry.names(), vec!["a", "b", "c"]);
    }
}
