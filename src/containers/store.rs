// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dependency-scoped container storage.
//!
//! The store holds one slot per module runtime name. Every slot knows the set of
//! producers its module may read from (the module's `wants` plus itself), the
//! containers the module produced, and whether the module has completed.
//!
//! # Visibility
//! A module only ever sees containers produced by itself or by a module it declared
//! in `wants`. Readers receive shared `Arc<Container>` handles in a freshly allocated
//! `Vec`; slot storage is never handed out by reference.
//!
//! # Garbage collection
//! When a module completes, every slot whose dependents (modules listing it in their
//! dependency set, the owner included) have all completed is cleared. Memory for an
//! intermediate result is therefore reclaimed as soon as nothing can still read it.
//!
//! # Locking
//! All bookkeeping sits behind a single `std::sync::Mutex`. Nothing under the lock
//! awaits or performs I/O, and streaming callbacks are always invoked after the lock
//! is released.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::{validate_recipe, Recipe};
use crate::containers::Container;
use crate::errors::ConfigError;
use crate::observability::messages::store::{
    ContainerStored, DuplicateContainerSkipped, RecipeParsed, SlotsCollected,
    StreamingCallbackFailed,
};
use crate::observability::messages::StructuredLog;

/// Invoked with each new container of a registered type stored by a dependency.
pub type StreamingCallback = Arc<dyn Fn(Arc<Container>) + Send + Sync>;

/// Selection criteria for [`ContainerStore::get_containers`].
///
/// Metadata filtering needs both a key and a value; a query carrying only one of
/// them is rejected.
///
/// # Example
/// ```
/// use recipe_engine::containers::ContainerQuery;
///
/// let query = ContainerQuery::of_type("fspath")
///     .with_metadata("zone", "eu")
///     .pop();
/// assert!(query.pop);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerQuery {
    pub container_type: String,
    pub pop: bool,
    pub metadata_key: Option<String>,
    pub metadata_value: Option<Value>,
}

impl ContainerQuery {
    pub fn of_type(container_type: impl Into<String>) -> Self {
        Self {
            container_type: container_type.into(),
            ..Self::default()
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata_key = Some(key.into());
        self.metadata_value = Some(value.into());
        self
    }

    /// Remove the requester's own matching containers from its slot once read.
    pub fn pop(mut self) -> Self {
        self.pop = true;
        self
    }

    fn metadata_filter(&self) -> Result<Option<(&str, &Value)>, ConfigError> {
        match (&self.metadata_key, &self.metadata_value) {
            (Some(key), Some(value)) => Ok(Some((key.as_str(), value))),
            (None, None) => Ok(None),
            _ => Err(ConfigError::IncompleteMetadataFilter),
        }
    }

    fn matches(&self, container: &Container, filter: Option<(&str, &Value)>) -> bool {
        container.container_type() == self.container_type
            && filter.map_or(true, |(key, value)| container.matches_metadata(key, value))
    }
}

struct ModuleSlot {
    /// `wants` in declaration order, then the module itself.
    dependencies: Vec<String>,
    storage: Vec<Arc<Container>>,
    completed: bool,
    collected: bool,
    callbacks: HashMap<String, Vec<StreamingCallback>>,
}

impl ModuleSlot {
    fn new(dependencies: Vec<String>) -> Self {
        Self {
            dependencies,
            storage: Vec::new(),
            completed: false,
            collected: false,
            callbacks: HashMap::new(),
        }
    }
}

struct StoreState {
    /// Runtime names in recipe order, preflights first.
    order: Vec<String>,
    slots: HashMap<String, ModuleSlot>,
}

impl StoreState {
    fn slot(&self, name: &str) -> Result<&ModuleSlot, ConfigError> {
        self.slots
            .get(name)
            .ok_or_else(|| ConfigError::UnknownModule(name.to_string()))
    }

    fn slot_mut(&mut self, name: &str) -> Result<&mut ModuleSlot, ConfigError> {
        self.slots
            .get_mut(name)
            .ok_or_else(|| ConfigError::UnknownModule(name.to_string()))
    }
}

/// Thread-safe, dependency-scoped container store shared by every module of a run.
#[derive(Default)]
pub struct ContainerStore {
    state: Mutex<Option<StoreState>>,
    pending_callbacks: Mutex<Vec<JoinHandle<()>>>,
}

impl ContainerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<StoreState>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Build one slot per preflight and module of `recipe`.
    ///
    /// The recipe's dependency graph is validated first; nothing is stored when it
    /// is rejected.
    pub fn parse_recipe(&self, recipe: &Recipe) -> Result<(), ConfigError> {
        let mut guard = self.lock();
        if guard.is_some() {
            return Err(ConfigError::RecipeAlreadyParsed);
        }

        validate_recipe(recipe)?;

        let mut order = Vec::new();
        let mut slots = HashMap::new();
        for node in recipe.all_nodes() {
            let runtime_name = node.runtime_name().to_string();
            let mut dependencies = Vec::with_capacity(node.wants.len() + 1);
            for wanted in &node.wants {
                if !dependencies.contains(wanted) {
                    dependencies.push(wanted.clone());
                }
            }
            dependencies.push(runtime_name.clone());

            order.push(runtime_name.clone());
            slots.insert(runtime_name, ModuleSlot::new(dependencies));
        }

        RecipeParsed {
            recipe: &recipe.name,
            slot_count: order.len(),
        }
        .log();

        *guard = Some(StoreState { order, slots });
        Ok(())
    }

    /// Drop every slot so another recipe can be parsed.
    pub fn reset(&self) {
        *self.lock() = None;
        self.pending_callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Append `container` to `producer`'s slot and return the stored handle.
    ///
    /// A container equal to one the producer already stored (see the `PartialEq`
    /// impl on [`Container`]) is not stored again; the existing handle is returned
    /// instead. Streaming callbacks registered by dependents of `producer` for this
    /// container type are scheduled once the container is in place.
    pub fn store_container(
        &self,
        producer: &str,
        container: Container,
    ) -> Result<Arc<Container>, ConfigError> {
        let (stored, callbacks) = {
            let mut guard = self.lock();
            let state = guard.as_mut().ok_or(ConfigError::RecipeNotParsed)?;

            let slot = state.slot_mut(producer)?;
            if let Some(existing) = slot.storage.iter().find(|c| ***c == container) {
                DuplicateContainerSkipped {
                    producer,
                    container_type: existing.container_type(),
                    existing_id: existing.id(),
                }
                .log();
                return Ok(Arc::clone(existing));
            }

            let stored = Arc::new(container);
            slot.storage.push(Arc::clone(&stored));

            ContainerStored {
                producer,
                container_type: stored.container_type(),
                container_id: stored.id(),
            }
            .log();

            let callbacks: Vec<StreamingCallback> = state
                .order
                .iter()
                .filter(|name| name.as_str() != producer)
                .filter_map(|name| state.slots.get(name))
                .filter(|slot| slot.dependencies.iter().any(|d| d == producer))
                .filter_map(|slot| slot.callbacks.get(stored.container_type()))
                .flatten()
                .cloned()
                .collect();

            (stored, callbacks)
        };

        for callback in callbacks {
            self.schedule_callback(callback, Arc::clone(&stored));
        }

        Ok(stored)
    }

    fn schedule_callback(&self, callback: StreamingCallback, container: Arc<Container>) {
        match Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn_blocking(move || callback(container));
                self.pending_callbacks
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(task);
            }
            Err(_) => callback(container),
        }
    }

    /// Containers of `query.container_type` from every producer `requester` may read.
    ///
    /// Results follow the requester's dependency order (its `wants`, then itself),
    /// and each producer's insertion order within that. With `pop` set, the
    /// requester's own matching containers are removed from its slot; containers from
    /// other producers are returned but stay where they are.
    ///
    /// Types the requester registered a streaming callback for are delivered through
    /// that callback only, so dependencies' containers of such a type are left out.
    pub fn get_containers(
        &self,
        requester: &str,
        query: &ContainerQuery,
    ) -> Result<Vec<Arc<Container>>, ConfigError> {
        let filter = query.metadata_filter()?;

        let mut guard = self.lock();
        let state = guard.as_mut().ok_or(ConfigError::RecipeNotParsed)?;

        let requesting = state.slot(requester)?;
        let streamed = requesting.callbacks.contains_key(&query.container_type);

        let mut found = Vec::new();
        for producer in &requesting.dependencies {
            if streamed && producer != requester {
                continue;
            }
            let slot = state.slot(producer)?;
            found.extend(
                slot.storage
                    .iter()
                    .filter(|c| query.matches(c, filter))
                    .cloned(),
            );
        }

        if query.pop {
            let slot = state.slot_mut(requester)?;
            slot.storage.retain(|c| !query.matches(c, filter));
        }

        Ok(found)
    }

    /// Mark `name` completed and collect every slot nobody can read any more.
    ///
    /// Returns the runtime names of the slots cleared by this call.
    pub fn complete_module(&self, name: &str) -> Result<Vec<String>, ConfigError> {
        let mut guard = self.lock();
        let state = guard.as_mut().ok_or(ConfigError::RecipeNotParsed)?;

        state.slot_mut(name)?.completed = true;

        let collectable: Vec<String> = state
            .order
            .iter()
            .filter(|candidate| {
                let Some(slot) = state.slots.get(candidate.as_str()) else {
                    return false;
                };
                !slot.collected
                    && state
                        .slots
                        .values()
                        .filter(|s| s.dependencies.contains(*candidate))
                        .all(|s| s.completed)
            })
            .cloned()
            .collect();

        for collected in &collectable {
            if let Some(slot) = state.slots.get_mut(collected) {
                slot.storage.clear();
                slot.collected = true;
            }
        }

        if !collectable.is_empty() {
            SlotsCollected {
                completed: name,
                collected: &collectable,
            }
            .log();
        }

        Ok(collectable)
    }

    /// Have `callback` called with every `container_type` container stored by one of
    /// `module`'s dependencies from now on, in place of reading them with
    /// [`get_containers`](Self::get_containers).
    pub fn register_streaming_callback(
        &self,
        module: &str,
        container_type: impl Into<String>,
        callback: StreamingCallback,
    ) -> Result<(), ConfigError> {
        let mut guard = self.lock();
        let state = guard.as_mut().ok_or(ConfigError::RecipeNotParsed)?;
        state
            .slot_mut(module)?
            .callbacks
            .entry(container_type.into())
            .or_default()
            .push(callback);
        Ok(())
    }

    /// Wait for every streaming callback scheduled so far to return.
    ///
    /// A panicking callback is logged and otherwise ignored. Returns the number of
    /// callbacks that failed.
    pub async fn wait_for_callbacks(&self) -> usize {
        let mut failed = 0;
        loop {
            let pending: Vec<JoinHandle<()>> = std::mem::take(
                &mut *self
                    .pending_callbacks
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner),
            );
            if pending.is_empty() {
                return failed;
            }
            for task in pending {
                if let Err(error) = task.await {
                    failed += 1;
                    StreamingCallbackFailed {
                        error: &error.to_string(),
                    }
                    .log();
                }
            }
        }
    }

    /// Number of containers currently held in `name`'s slot.
    pub fn stored_count(&self, name: &str) -> Result<usize, ConfigError> {
        let guard = self.lock();
        let state = guard.as_ref().ok_or(ConfigError::RecipeNotParsed)?;
        Ok(state.slot(name)?.storage.len())
    }

    pub fn is_completed(&self, name: &str) -> Result<bool, ConfigError> {
        let guard = self.lock();
        let state = guard.as_ref().ok_or(ConfigError::RecipeNotParsed)?;
        Ok(state.slot(name)?.completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModuleNode;
    use crate::errors::ValidationError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn store_for(modules: Vec<ModuleNode>) -> ContainerStore {
        let store = ContainerStore::new();
        store
            .parse_recipe(&Recipe {
                name: "test".into(),
                modules,
                ..Recipe::default()
            })
            .unwrap();
        store
    }

    fn abc_store() -> ContainerStore {
        store_for(vec![
            ModuleNode::new("A"),
            ModuleNode::new("B").wants(["A"]),
            ModuleNode::new("C").wants(["B"]),
        ])
    }

    fn text(value: &str) -> Container {
        Container::new("text", json!(value))
    }

    fn payloads(containers: &[Arc<Container>]) -> Vec<Value> {
        containers.iter().map(|c| c.payload().clone()).collect()
    }

    #[test]
    fn test_calls_before_parse_fail() {
        let store = ContainerStore::new();
        assert!(matches!(
            store.store_container("a", text("x")),
            Err(ConfigError::RecipeNotParsed)
        ));
        assert!(matches!(
            store.complete_module("a"),
            Err(ConfigError::RecipeNotParsed)
        ));
    }

    #[test]
    fn test_parse_twice_requires_reset() {
        let store = store_for(vec![ModuleNode::new("a")]);
        let recipe = Recipe {
            name: "again".into(),
            modules: vec![ModuleNode::new("b")],
            ..Recipe::default()
        };

        assert!(matches!(
            store.parse_recipe(&recipe),
            Err(ConfigError::RecipeAlreadyParsed)
        ));

        store.reset();
        store.parse_recipe(&recipe).unwrap();
        assert!(matches!(
            store.stored_count("a"),
            Err(ConfigError::UnknownModule(_))
        ));
    }

    #[test]
    fn test_parse_rejects_cycles() {
        let store = ContainerStore::new();
        let result = store.parse_recipe(&Recipe {
            name: "cyclic".into(),
            modules: vec![
                ModuleNode::new("a").wants(["b"]),
                ModuleNode::new("b").wants(["a"]),
            ],
            ..Recipe::default()
        });

        match result {
            Err(ConfigError::Validation(errors)) => {
                assert!(matches!(errors[0], ValidationError::CyclicDependency { .. }))
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert!(matches!(
            store.stored_count("a"),
            Err(ConfigError::RecipeNotParsed)
        ));
    }

    #[test]
    fn test_unknown_module_is_rejected() {
        let store = abc_store();
        assert!(matches!(
            store.store_container("Z", text("x")),
            Err(ConfigError::UnknownModule(name)) if name == "Z"
        ));
        assert!(matches!(
            store.get_containers("Z", &ContainerQuery::of_type("text")),
            Err(ConfigError::UnknownModule(_))
        ));
    }

    #[test]
    fn test_dependency_isolation() {
        let store = abc_store();
        store.store_container("A", text("from a")).unwrap();

        let visible_to_c = store
            .get_containers("C", &ContainerQuery::of_type("text"))
            .unwrap();
        assert!(visible_to_c.is_empty());

        let visible_to_b = store
            .get_containers("B", &ContainerQuery::of_type("text"))
            .unwrap();
        assert_eq!(payloads(&visible_to_b), vec![json!("from a")]);
    }

    #[test]
    fn test_self_visibility_without_wants() {
        let store = abc_store();
        store.store_container("A", text("mine")).unwrap();

        let own = store
            .get_containers("A", &ContainerQuery::of_type("text"))
            .unwrap();
        assert_eq!(payloads(&own), vec![json!("mine")]);
    }

    #[test]
    fn test_results_follow_dependency_then_insertion_order() {
        let store = store_for(vec![
            ModuleNode::new("x"),
            ModuleNode::new("y"),
            ModuleNode::new("z").wants(["y", "x"]),
        ]);
        store.store_container("x", text("x1")).unwrap();
        store.store_container("z", text("z1")).unwrap();
        store.store_container("y", text("y1")).unwrap();
        store.store_container("x", text("x2")).unwrap();

        let found = store
            .get_containers("z", &ContainerQuery::of_type("text"))
            .unwrap();
        assert_eq!(
            payloads(&found),
            vec![json!("y1"), json!("x1"), json!("x2"), json!("z1")]
        );
    }

    #[test]
    fn test_type_filter() {
        let store = abc_store();
        store.store_container("A", text("t")).unwrap();
        store
            .store_container("A", Container::new("other", json!(1)))
            .unwrap();

        let found = store
            .get_containers("B", &ContainerQuery::of_type("other"))
            .unwrap();
        assert_eq!(payloads(&found), vec![json!(1)]);
    }

    #[test]
    fn test_metadata_filter_precision() {
        let store = abc_store();
        store
            .store_container("A", text("eu").with_metadata("zone", "eu"))
            .unwrap();
        store
            .store_container("A", text("us").with_metadata("zone", "us"))
            .unwrap();
        store.store_container("A", text("untagged")).unwrap();

        let found = store
            .get_containers(
                "B",
                &ContainerQuery::of_type("text").with_metadata("zone", "eu"),
            )
            .unwrap();
        assert_eq!(payloads(&found), vec![json!("eu")]);
    }

    #[test]
    fn test_half_metadata_filter_is_rejected() {
        let store = abc_store();
        let query = ContainerQuery {
            container_type: "text".into(),
            metadata_key: Some("zone".into()),
            ..ContainerQuery::default()
        };
        assert!(matches!(
            store.get_containers("B", &query),
            Err(ConfigError::IncompleteMetadataFilter)
        ));
    }

    #[test]
    fn test_equal_payloads_are_all_stored() {
        let store = abc_store();
        let eu = store
            .store_container("A", text("same").with_metadata("zone", "eu"))
            .unwrap();
        let us = store
            .store_container("A", text("same").with_metadata("zone", "us"))
            .unwrap();

        assert_ne!(eu.id(), us.id());
        assert_eq!(store.stored_count("A").unwrap(), 2);

        let found = store
            .get_containers(
                "B",
                &ContainerQuery::of_type("text").with_metadata("zone", "us"),
            )
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), us.id());
    }

    #[test]
    fn test_value_compared_containers_are_stored_once() {
        let store = abc_store();
        let first = store
            .store_container("A", text("same").compared_by_value())
            .unwrap();
        let second = store
            .store_container("A", text("same").compared_by_value())
            .unwrap();

        assert_eq!(first.id(), second.id());
        assert_eq!(store.stored_count("A").unwrap(), 1);

        // De-duplication is per producer
        store
            .store_container("B", text("same").compared_by_value())
            .unwrap();
        assert_eq!(store.stored_count("B").unwrap(), 1);
    }

    #[test]
    fn test_pop_only_removes_own_containers() {
        let store = abc_store();
        store.store_container("A", text("upstream")).unwrap();
        store.store_container("B", text("own")).unwrap();

        let popped = store
            .get_containers("B", &ContainerQuery::of_type("text").pop())
            .unwrap();
        assert_eq!(popped.len(), 2);
        assert_eq!(store.stored_count("B").unwrap(), 0);
        assert_eq!(store.stored_count("A").unwrap(), 1);

        let again = store
            .get_containers("B", &ContainerQuery::of_type("text"))
            .unwrap();
        assert_eq!(payloads(&again), vec![json!("upstream")]);
    }

    #[test]
    fn test_abc_scenario_collection_timing() {
        let store = abc_store();
        store.store_container("A", text("a")).unwrap();
        store.store_container("B", text("b")).unwrap();
        store.store_container("C", text("c")).unwrap();

        // A's slot is still readable by B
        assert!(store.complete_module("A").unwrap().is_empty());
        assert_eq!(store.stored_count("A").unwrap(), 1);

        let collected = store.complete_module("B").unwrap();
        assert_eq!(collected, vec!["A".to_string()]);
        assert_eq!(store.stored_count("A").unwrap(), 0);
        assert_eq!(store.stored_count("B").unwrap(), 1);

        let collected = store.complete_module("C").unwrap();
        assert_eq!(collected, vec!["B".to_string(), "C".to_string()]);
        assert_eq!(store.stored_count("B").unwrap(), 0);
        assert_eq!(store.stored_count("C").unwrap(), 0);
    }

    #[test]
    fn test_slot_without_dependents_collected_on_own_completion() {
        let store = store_for(vec![ModuleNode::new("solo")]);
        store.store_container("solo", text("x")).unwrap();

        assert_eq!(store.complete_module("solo").unwrap(), vec!["solo"]);
        assert!(store.is_completed("solo").unwrap());
        assert_eq!(store.stored_count("solo").unwrap(), 0);

        // Collected slots are reported once
        assert!(store.complete_module("solo").unwrap().is_empty());
    }

    #[test]
    fn test_streaming_callbacks_run_inline_without_runtime() {
        let store = abc_store();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        store
            .register_streaming_callback(
                "B",
                "text",
                Arc::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        store.store_container("A", text("one")).unwrap();
        store
            .store_container("A", Container::new("other", json!(null)))
            .unwrap();
        // B's own containers do not trigger its callbacks
        store.store_container("B", text("two")).unwrap();
        // C does not depend on A
        store.store_container("C", text("three")).unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(store.stored_count("A").unwrap(), 2);
    }

    #[tokio::test]
    async fn test_streaming_callbacks_are_awaited() {
        let store = abc_store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store
            .register_streaming_callback(
                "B",
                "text",
                Arc::new(move |container: Arc<Container>| {
                    sink.lock().unwrap().push(container.payload().clone());
                }),
            )
            .unwrap();

        store.store_container("A", text("one")).unwrap();
        store.store_container("A", text("two")).unwrap();

        assert_eq!(store.wait_for_callbacks().await, 0);
        let mut received = seen.lock().unwrap().clone();
        received.sort_by_key(|v| v.to_string());
        assert_eq!(received, vec![json!("one"), json!("two")]);
    }

    #[test]
    fn test_streamed_types_are_not_returned_again() {
        let store = abc_store();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        store
            .register_streaming_callback(
                "B",
                "text",
                Arc::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        store.store_container("A", text("streamed")).unwrap();
        store
            .store_container("A", Container::new("other", json!(1)))
            .unwrap();
        store.store_container("B", text("own")).unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        let texts = store
            .get_containers("B", &ContainerQuery::of_type("text"))
            .unwrap();
        assert_eq!(payloads(&texts), vec![json!("own")]);

        // Other types still come from storage
        let others = store
            .get_containers("B", &ContainerQuery::of_type("other"))
            .unwrap();
        assert_eq!(payloads(&others), vec![json!(1)]);

        // C did not register a callback and reads B's containers as usual
        let for_c = store
            .get_containers("C", &ContainerQuery::of_type("text"))
            .unwrap();
        assert_eq!(payloads(&for_c), vec![json!("own")]);
    }

    #[tokio::test]
    async fn test_panicking_callback_is_counted() {
        let store = abc_store();
        store
            .register_streaming_callback("B", "text", Arc::new(|_| panic!("callback failure")))
            .unwrap();

        store.store_container("A", text("one")).unwrap();
        assert_eq!(store.wait_for_callbacks().await, 1);
        assert_eq!(store.stored_count("A").unwrap(), 1);
    }

    #[test]
    fn test_concurrent_stores_keep_every_container() {
        let store = Arc::new(abc_store());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        store
                            .store_container("A", text(&format!("{t}-{i}")))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.stored_count("A").unwrap(), 400);
    }
}
