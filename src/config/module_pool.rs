// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::{ModuleNode, ModuleRegistry, Recipe, RegisteredModule};
use crate::engine::Runnable;
use crate::errors::ConfigError;
use crate::traits::PreflightModule;

/// A recipe node paired with the instance created for it.
#[derive(Clone)]
pub struct PooledModule<M> {
    pub node: ModuleNode,
    pub module: M,
}

impl<M> PooledModule<M> {
    pub fn runtime_name(&self) -> &str {
        self.node.runtime_name()
    }
}

/// Every module instance of one recipe, ready to run.
///
/// Whole vs fan-out is decided here, once, from the registered contract. A preflight
/// listed under `modules` or a main module listed under `preflights` is rejected.
///
/// # Example
/// ```
/// use recipe_engine::backends::local::LocalModuleFactory;
/// use recipe_engine::config::{ModuleNode, ModulePool, ModuleRegistry, Recipe};
///
/// let mut registry = ModuleRegistry::new();
/// LocalModuleFactory::register_all(&mut registry).unwrap();
///
/// let recipe = Recipe {
///     name: "demo".into(),
///     modules: vec![
///         ModuleNode::new("text_source"),
///         ModuleNode::new("word_counter").wants(["text_source"]),
///     ],
///     ..Recipe::default()
/// };
///
/// let pool = ModulePool::from_recipe(&recipe, &registry).unwrap();
/// assert_eq!(pool.modules().len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct ModulePool {
    preflights: Vec<PooledModule<Arc<dyn PreflightModule>>>,
    modules: Vec<PooledModule<Runnable>>,
}

impl ModulePool {
    pub fn from_recipe(recipe: &Recipe, registry: &ModuleRegistry) -> Result<Self, ConfigError> {
        let mut pool = Self::default();

        for node in &recipe.preflights {
            match registry.create(&node.name, node.runtime_name())? {
                RegisteredModule::Preflight(module) => pool.preflights.push(PooledModule {
                    node: node.clone(),
                    module,
                }),
                other => {
                    return Err(ConfigError::WrongModuleKind {
                        runtime_name: node.runtime_name().to_string(),
                        expected: "preflight",
                        actual: other.kind(),
                    })
                }
            }
        }

        for node in &recipe.modules {
            let runnable = match registry.create(&node.name, node.runtime_name())? {
                RegisteredModule::Module(module) => Runnable::Whole(module),
                RegisteredModule::ThreadAware(module) => Runnable::FanOut(module),
                RegisteredModule::Preflight(_) => {
                    return Err(ConfigError::WrongModuleKind {
                        runtime_name: node.runtime_name().to_string(),
                        expected: "module",
                        actual: "preflight",
                    })
                }
            };
            pool.modules.push(PooledModule {
                node: node.clone(),
                module: runnable,
            });
        }

        Ok(pool)
    }

    pub fn preflights(&self) -> &[PooledModule<Arc<dyn PreflightModule>>] {
        &self.preflights
    }

    pub fn modules(&self) -> &[PooledModule<Runnable>] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.preflights.len() + self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
