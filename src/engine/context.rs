// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::containers::{
    Container, ContainerKind, ContainerQuery, ContainerStore, StreamingCallback,
};
use crate::errors::{ErrorRegistry, ModuleError};
use crate::observability::messages::module::{MessagePublished, ModuleErrorRecorded};
use crate::observability::messages::StructuredLog;
use crate::observability::Telemetry;
use crate::utils::Cache;

/// Receives every message a module publishes: `(source, message, is_error)`.
///
/// Calls arrive in the order modules make them, from whichever task published.
pub type PublishCallback = Arc<dyn Fn(&str, &str, bool) + Send + Sync>;

/// Everything a single run shares between its modules.
pub(crate) struct RunResources {
    pub(crate) recipe_name: String,
    pub(crate) store: ContainerStore,
    pub(crate) errors: ErrorRegistry,
    pub(crate) cache: Cache,
    pub(crate) abort: CancellationToken,
    pub(crate) telemetry: Arc<dyn Telemetry>,
    pub(crate) publisher: Option<PublishCallback>,
}

/// A module's handle on the engine for the duration of a run.
///
/// Every container operation is scoped to the module's runtime name: stores land in
/// its own slot and reads only see the producers it declared in `wants`. Cloning is
/// cheap; fan-out workers each get a clone.
#[derive(Clone)]
pub struct ModuleContext {
    name: Arc<str>,
    run: Arc<RunResources>,
}

impl ModuleContext {
    pub(crate) fn new(name: &str, run: Arc<RunResources>) -> Self {
        Self {
            name: Arc::from(name),
            run,
        }
    }

    /// The module's runtime name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn recipe_name(&self) -> &str {
        &self.run.recipe_name
    }

    pub fn store_container(&self, container: Container) -> Result<Arc<Container>, ModuleError> {
        Ok(self.run.store.store_container(&self.name, container)?)
    }

    pub fn store_kind<T: ContainerKind>(&self, value: &T) -> Result<Arc<Container>, ModuleError> {
        self.store_container(Container::from_kind(value)?)
    }

    pub fn get_containers(&self, container_type: &str) -> Result<Vec<Arc<Container>>, ModuleError> {
        self.query(&ContainerQuery::of_type(container_type))
    }

    pub fn get_containers_filtered(
        &self,
        container_type: &str,
        metadata_key: &str,
        metadata_value: impl Into<Value>,
    ) -> Result<Vec<Arc<Container>>, ModuleError> {
        self.query(
            &ContainerQuery::of_type(container_type).with_metadata(metadata_key, metadata_value),
        )
    }

    pub fn query(&self, query: &ContainerQuery) -> Result<Vec<Arc<Container>>, ModuleError> {
        Ok(self.run.store.get_containers(&self.name, query)?)
    }

    /// Decoded payloads of every visible `T` container.
    pub fn get_kind<T: ContainerKind>(&self) -> Result<Vec<T>, ModuleError> {
        self.get_containers(T::CONTAINER_TYPE)?
            .iter()
            .map(|container| container.decode::<T>().map_err(ModuleError::from))
            .collect()
    }

    pub fn register_streaming_callback(
        &self,
        container_type: &str,
        callback: StreamingCallback,
    ) -> Result<(), ModuleError> {
        Ok(self
            .run
            .store
            .register_streaming_callback(&self.name, container_type, callback)?)
    }

    /// Record a non-critical error against this module and keep going.
    ///
    /// The error is also published with `is_error` set. Critical failures are
    /// returned from the module method instead.
    pub fn record_error(&self, message: impl Into<String>) {
        let error = ModuleError::new(message).with_module(self.name());
        ModuleErrorRecorded {
            module: self.name(),
            error: &error,
        }
        .log();
        if let Some(publisher) = &self.run.publisher {
            publisher(self.name(), &error.message, true);
        }
        self.run.errors.record(error);
    }

    pub fn publish_message(&self, message: &str, is_error: bool) {
        MessagePublished {
            source: self.name(),
            message,
            is_error,
        }
        .log();
        if let Some(publisher) = &self.run.publisher {
            publisher(self.name(), message, is_error);
        }
    }

    pub fn log_telemetry(&self, key: &str, value: &str) {
        self.run
            .telemetry
            .log_telemetry(key, value, self.name(), &self.run.recipe_name);
    }

    pub fn cache(&self) -> &Cache {
        &self.run.cache
    }

    /// Whether a critical error has stopped the run. Long-running modules may use
    /// this to finish early; the runner never interrupts them.
    pub fn is_aborted(&self) -> bool {
        self.run.abort.is_cancelled()
    }
}

#[cfg(test)]
impl ModuleContext {
    /// A context over a fresh store that has parsed `recipe`, outside of any runner.
    pub(crate) fn detached(name: &str, recipe: &crate::config::Recipe) -> Self {
        let store = ContainerStore::new();
        store
            .parse_recipe(recipe)
            .expect("test recipe should parse");
        Self::new(
            name,
            Arc::new(RunResources {
                recipe_name: recipe.name.clone(),
                store,
                errors: ErrorRegistry::new(),
                cache: Cache::new(),
                abort: CancellationToken::new(),
                telemetry: Arc::new(crate::observability::InMemoryTelemetry::new()),
                publisher: None,
            }),
        )
    }

    /// Another module's context within the same run.
    pub(crate) fn sibling(&self, name: &str) -> Self {
        Self::new(name, Arc::clone(&self.run))
    }

    pub(crate) fn recorded_errors(&self) -> Vec<ModuleError> {
        self.run.errors.errors()
    }
}
