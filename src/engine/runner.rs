// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The module runner: dependency-gated, concurrent execution of a recipe.
//!
//! # Phases
//!
//! 1. **Preflight**: preflights run one at a time in recipe order (`set_up` then
//!    `process`), each firing its completion signal when done.
//! 2. **Setup**: every main module's `set_up` runs concurrently on its own task. Any
//!    setup failure sets the abort flag; the other setups still finish.
//! 3. **Run**: one task per main module waits on the completion signal of every
//!    module it `wants`, then runs unless the abort flag is set. Whole modules call
//!    `process` once; fan-out modules run a bounded worker pool. Whatever happens, the
//!    task fires its own signal and then tells the container store the module is
//!    complete, which releases containers nobody can read any more.
//! 4. **Cleanup**: every preflight's `clean_up` runs in recipe order, always.
//!
//! # Error model
//!
//! Errors are recorded centrally and returned in the [`RunReport`]. A critical error
//! sets the abort flag: modules already running are left to finish, modules not yet
//! running will not start. Non-critical errors are recorded and execution continues.
//! A panic inside a module becomes a critical, unexpected error. Failed modules are
//! never retried.
//!
//! # Example
//! ```rust
//! use recipe_engine::backends::local::LocalModuleFactory;
//! use recipe_engine::config::{ModuleArgs, ModuleNode, ModuleRegistry, Recipe};
//! use recipe_engine::engine::{ModuleRunner, ModuleState};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = ModuleRegistry::new();
//! LocalModuleFactory::register_all(&mut registry)?;
//!
//! let recipe = Recipe {
//!     name: "count_words".into(),
//!     modules: vec![
//!         ModuleNode::new("text_source").with_arg("lines", "@input"),
//!         ModuleNode::new("word_counter").wants(["text_source"]),
//!     ],
//!     ..Recipe::default()
//! };
//!
//! let mut runner = ModuleRunner::new(registry);
//! runner.load_recipe(recipe)?;
//!
//! let running_args: ModuleArgs = [("input".to_string(), json!(["a b", "c"]))].into();
//! let report = runner.run(&running_args).await?;
//!
//! assert!(report.is_success());
//! assert_eq!(report.state("word_counter"), Some(ModuleState::Completed));
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::{
    find_placeholders, validate_recipe, ArgResolver, ModuleArgs, ModuleNode, ModulePool,
    ModuleRegistry, PlaceholderResolver, PooledModule, Recipe,
};
use crate::containers::ContainerStore;
use crate::engine::context::RunResources;
use crate::engine::runnable::{guarded, join_failure};
use crate::engine::{
    CompletionSignal, ModuleContext, ModuleState, PublishCallback, RunReport, Runnable,
};
use crate::errors::{ConfigError, ErrorRegistry, ModuleError};
use crate::observability::messages::engine::{
    AbortRequested, PhaseCompleted, PhaseStarted, RunCompleted, RunStarted, SetupSkipped,
};
use crate::observability::messages::module::{
    ModuleAborted, ModuleFailed, ModulePhaseCompleted, ModuleStateChanged,
};
use crate::observability::messages::validation::UnresolvedPlaceholders;
use crate::observability::messages::StructuredLog;
use crate::observability::{Phase, PhaseEvent, Telemetry, TracingTelemetry};
use crate::traits::PreflightModule;
use crate::utils::Cache;

/// Loads a recipe against a [`ModuleRegistry`] and runs it.
///
/// A loaded recipe can be run more than once; every run gets a fresh container
/// store, error registry, cache and abort flag, while module instances are reused
/// and set up again.
pub struct ModuleRunner {
    registry: ModuleRegistry,
    telemetry: Arc<dyn Telemetry>,
    publisher: Option<PublishCallback>,
    resolver: Arc<dyn ArgResolver>,
    max_concurrency: Option<usize>,
    loaded: Option<LoadedRecipe>,
}

struct LoadedRecipe {
    recipe: Recipe,
    pool: ModulePool,
}

impl ModuleRunner {
    pub fn new(registry: ModuleRegistry) -> Self {
        Self {
            registry,
            telemetry: Arc::new(TracingTelemetry),
            publisher: None,
            resolver: Arc::new(PlaceholderResolver::new()),
            max_concurrency: None,
            loaded: None,
        }
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_publisher(mut self, publisher: PublishCallback) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ArgResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Cap the number of modules in their run phase at once, overriding the recipe's
    /// `executor_options.max_concurrency`.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = Some(max_concurrency);
        self
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn recipe(&self) -> Option<&Recipe> {
        self.loaded.as_ref().map(|l| &l.recipe)
    }

    /// Validate `recipe` and instantiate every module it names.
    ///
    /// Nothing runs here; all configuration errors surface before any module does.
    pub fn load_recipe(&mut self, recipe: Recipe) -> Result<(), ConfigError> {
        validate_recipe(&recipe)?;
        let pool = ModulePool::from_recipe(&recipe, &self.registry)?;
        self.loaded = Some(LoadedRecipe { recipe, pool });
        Ok(())
    }

    /// Run the loaded recipe with `running_args` substituted into module arguments.
    ///
    /// Returns `Err` only for configuration problems detected before any module
    /// runs; module failures are reported in the returned [`RunReport`].
    pub async fn run(&self, running_args: &ModuleArgs) -> Result<RunReport, ConfigError> {
        let loaded = self.loaded.as_ref().ok_or(ConfigError::RecipeNotParsed)?;
        let recipe = &loaded.recipe;

        let arguments = self.resolve_arguments(recipe, running_args)?;

        let store = ContainerStore::new();
        store.parse_recipe(recipe)?;

        let execution = Execution {
            run: Arc::new(RunResources {
                recipe_name: recipe.name.clone(),
                store,
                errors: ErrorRegistry::new(),
                cache: Cache::new(),
                abort: CancellationToken::new(),
                telemetry: Arc::clone(&self.telemetry),
                publisher: self.publisher.clone(),
            }),
            states: StateTracker::new(recipe.all_nodes()),
            signals: Arc::new(
                recipe
                    .all_nodes()
                    .map(|n| (n.runtime_name().to_string(), CompletionSignal::new()))
                    .collect(),
            ),
            arguments: Arc::new(arguments),
        };

        let max_concurrency = self
            .max_concurrency
            .or(recipe.executor_options.max_concurrency)
            .map(|limit| limit.max(1));

        let run_started = RunStarted {
            recipe: &recipe.name,
            preflight_count: loaded.pool.preflights().len(),
            module_count: loaded.pool.modules().len(),
            max_concurrency,
        };
        run_started.log();
        let span = run_started.span("run");
        let started = Instant::now();

        async {
            execution.run_preflights(loaded.pool.preflights()).await;
            execution.set_up_modules(loaded.pool.modules()).await;
            execution
                .run_modules(loaded.pool.modules(), max_concurrency)
                .await;
            let failed_callbacks = execution.run.store.wait_for_callbacks().await;
            if failed_callbacks > 0 {
                execution.run.errors.record(ModuleError::new(format!(
                    "{failed_callbacks} streaming callback(s) failed"
                )));
            }
            execution.clean_up_preflights(loaded.pool.preflights()).await;
        }
        .instrument(span)
        .await;

        let errors = execution.run.errors.errors();
        let aborted = execution.run.abort.is_cancelled();

        RunCompleted {
            recipe: &recipe.name,
            duration: started.elapsed(),
            error_count: errors.len(),
            aborted,
        }
        .log();

        Ok(RunReport {
            recipe: recipe.name.clone(),
            errors,
            states: execution.states.snapshot(),
            aborted,
        })
    }

    fn resolve_arguments(
        &self,
        recipe: &Recipe,
        running_args: &ModuleArgs,
    ) -> Result<HashMap<String, ModuleArgs>, ConfigError> {
        let mut arguments = HashMap::new();
        for node in recipe.all_nodes() {
            let resolved = self
                .resolver
                .resolve(node.runtime_name(), &node.args, running_args)?;

            let leftovers: Vec<String> = resolved.values().flat_map(find_placeholders).collect();
            if !leftovers.is_empty() {
                UnresolvedPlaceholders {
                    module: node.runtime_name(),
                    placeholders: &leftovers,
                }
                .log();
            }

            arguments.insert(node.runtime_name().to_string(), resolved);
        }
        Ok(arguments)
    }
}

/// Per-module lifecycle states of one run.
#[derive(Clone)]
struct StateTracker {
    states: Arc<Mutex<HashMap<String, ModuleState>>>,
}

impl StateTracker {
    fn new<'a>(nodes: impl Iterator<Item = &'a ModuleNode>) -> Self {
        let states = nodes
            .map(|n| (n.runtime_name().to_string(), ModuleState::Pending))
            .collect();
        Self {
            states: Arc::new(Mutex::new(states)),
        }
    }

    fn set(&self, module: &str, state: ModuleState) {
        ModuleStateChanged { module, state }.log();
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(module.to_string(), state);
    }

    fn snapshot(&self) -> HashMap<String, ModuleState> {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Shared handles for one run, cloned into every module task.
#[derive(Clone)]
struct Execution {
    run: Arc<RunResources>,
    states: StateTracker,
    signals: Arc<HashMap<String, CompletionSignal>>,
    arguments: Arc<HashMap<String, ModuleArgs>>,
}

impl Execution {
    fn context(&self, module: &str) -> ModuleContext {
        ModuleContext::new(module, Arc::clone(&self.run))
    }

    fn arguments_for(&self, module: &str) -> ModuleArgs {
        self.arguments.get(module).cloned().unwrap_or_default()
    }

    fn is_aborted(&self) -> bool {
        self.run.abort.is_cancelled()
    }

    /// Record `error` for `module`, setting the abort flag when it is critical.
    fn fail(&self, module: &str, phase: Phase, error: ModuleError) {
        let error = error.attributed_to(module);
        ModuleFailed {
            module,
            phase,
            error: &error,
        }
        .log();

        if error.critical && !self.is_aborted() {
            AbortRequested {
                module,
                reason: &error.message,
            }
            .log();
            self.run.abort.cancel();
        }

        if let Some(publisher) = &self.run.publisher {
            publisher(module, &error.message, true);
        }
        self.run.errors.record(error);
    }

    fn record_phase(&self, module: &str, phase: Phase, started: Instant, failed: bool) {
        let duration = started.elapsed();
        ModulePhaseCompleted {
            module,
            phase,
            duration,
        }
        .log();
        self.run.telemetry.record_phase(
            &PhaseEvent {
                module: module.to_string(),
                phase,
                duration,
                failed,
            },
            &self.run.recipe_name,
        );
    }

    /// Fire `module`'s completion signal, then release whatever its completion makes
    /// unreachable.
    fn finish(&self, module: &str) {
        if let Some(signal) = self.signals.get(module) {
            signal.fire();
        }
        if let Err(error) = self.run.store.complete_module(module) {
            self.fail(module, Phase::Run, error.into());
        }
    }

    fn abort_module(&self, module: &str) {
        ModuleAborted { module }.log();
        self.states.set(module, ModuleState::Aborted);
        self.finish(module);
    }

    async fn run_preflights(&self, preflights: &[PooledModule<Arc<dyn PreflightModule>>]) {
        PhaseStarted {
            phase: Phase::Preflight,
            module_count: preflights.len(),
        }
        .log();
        let phase_started = Instant::now();

        for pooled in preflights {
            let name = pooled.runtime_name();
            if self.is_aborted() {
                self.abort_module(name);
                continue;
            }

            self.states.set(name, ModuleState::SettingUp);
            let started = Instant::now();

            let set_up = {
                let module = Arc::clone(&pooled.module);
                let ctx = self.context(name);
                let args = self.arguments_for(name);
                guarded(name, async move { module.set_up(&ctx, &args).await })
                    .await
                    .map_err(escalate)
            };

            let result = match set_up {
                Ok(()) => {
                    self.states.set(name, ModuleState::Running);
                    let module = Arc::clone(&pooled.module);
                    let ctx = self.context(name);
                    guarded(name, async move { module.process(&ctx).await }).await
                }
                Err(error) => Err(error),
            };

            let failed = result.is_err();
            if let Err(error) = result {
                self.fail(name, Phase::Preflight, error);
            }
            self.record_phase(name, Phase::Preflight, started, failed);
            self.states.set(name, ModuleState::Completed);
            self.finish(name);
        }

        PhaseCompleted {
            phase: Phase::Preflight,
            duration: phase_started.elapsed(),
        }
        .log();
    }

    async fn set_up_modules(&self, modules: &[PooledModule<Runnable>]) {
        PhaseStarted {
            phase: Phase::SetUp,
            module_count: modules.len(),
        }
        .log();
        let phase_started = Instant::now();

        if self.is_aborted() {
            SetupSkipped {
                recipe: &self.run.recipe_name,
            }
            .log();
            return;
        }

        let tasks: Vec<(String, JoinHandle<()>)> = modules
            .iter()
            .map(|pooled| {
                let execution = self.clone();
                let name = pooled.runtime_name().to_string();
                let runnable = pooled.module.clone();
                let task_name = name.clone();
                let task =
                    tokio::spawn(async move { execution.set_up_one(&task_name, runnable).await });
                (name, task)
            })
            .collect();

        for (name, task) in tasks {
            if let Err(join_error) = task.await {
                self.fail(&name, Phase::SetUp, join_failure(join_error));
            }
        }

        PhaseCompleted {
            phase: Phase::SetUp,
            duration: phase_started.elapsed(),
        }
        .log();
    }

    async fn set_up_one(&self, name: &str, runnable: Runnable) {
        self.states.set(name, ModuleState::SettingUp);
        let started = Instant::now();

        let ctx = self.context(name);
        let args = self.arguments_for(name);
        let result = guarded(name, async move { runnable.set_up(&ctx, &args).await }).await;

        let failed = result.is_err();
        if let Err(error) = result {
            self.fail(name, Phase::SetUp, escalate(error));
        }
        self.record_phase(name, Phase::SetUp, started, failed);
    }

    async fn run_modules(
        &self,
        modules: &[PooledModule<Runnable>],
        max_concurrency: Option<usize>,
    ) {
        PhaseStarted {
            phase: Phase::Run,
            module_count: modules.len(),
        }
        .log();
        let phase_started = Instant::now();

        let limiter = max_concurrency.map(|limit| Arc::new(Semaphore::new(limit)));

        let tasks: Vec<(String, JoinHandle<()>)> = modules
            .iter()
            .map(|pooled| {
                let execution = self.clone();
                let node = pooled.node.clone();
                let runnable = pooled.module.clone();
                let limiter = limiter.clone();
                let task =
                    tokio::spawn(async move { execution.run_one(node, runnable, limiter).await });
                (pooled.runtime_name().to_string(), task)
            })
            .collect();

        for (name, task) in tasks {
            if let Err(join_error) = task.await {
                self.fail(&name, Phase::Run, join_failure(join_error));
                self.finish(&name);
            }
        }

        PhaseCompleted {
            phase: Phase::Run,
            duration: phase_started.elapsed(),
        }
        .log();
    }

    async fn run_one(
        &self,
        node: ModuleNode,
        runnable: Runnable,
        limiter: Option<Arc<Semaphore>>,
    ) {
        let name = node.runtime_name();
        self.states.set(name, ModuleState::WaitingOnDependencies);

        for dependency in &node.wants {
            if let Some(signal) = self.signals.get(dependency) {
                signal.wait().await;
            }
        }

        let permit = match limiter {
            Some(limiter) => match limiter.acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(e) => {
                    self.fail(
                        name,
                        Phase::Run,
                        ModuleError::unexpected(format!("Concurrency limiter closed: {e}")),
                    );
                    self.abort_module(name);
                    return;
                }
            },
            None => None,
        };

        if self.is_aborted() {
            self.abort_module(name);
            return;
        }

        self.states.set(name, ModuleState::Running);
        let started = Instant::now();

        let ctx = self.context(name);
        let result = guarded(name, async move { runnable.run(&ctx).await }).await;
        drop(permit);

        let failed = result.is_err();
        if let Err(error) = result {
            self.fail(name, Phase::Run, error);
        }
        self.record_phase(name, Phase::Run, started, failed);
        self.states.set(name, ModuleState::Completed);
        self.finish(name);
    }

    async fn clean_up_preflights(&self, preflights: &[PooledModule<Arc<dyn PreflightModule>>]) {
        PhaseStarted {
            phase: Phase::CleanUp,
            module_count: preflights.len(),
        }
        .log();
        let phase_started = Instant::now();

        for pooled in preflights {
            let name = pooled.runtime_name();
            let started = Instant::now();

            let module = Arc::clone(&pooled.module);
            let ctx = self.context(name);
            let result = guarded(name, async move { module.clean_up(&ctx).await }).await;

            let failed = result.is_err();
            if let Err(error) = result {
                self.fail(name, Phase::CleanUp, error);
            }
            self.record_phase(name, Phase::CleanUp, started, failed);
        }

        PhaseCompleted {
            phase: Phase::CleanUp,
            duration: phase_started.elapsed(),
        }
        .log();
    }
}

/// Setup failures always abort the run.
fn escalate(error: ModuleError) -> ModuleError {
    ModuleError {
        critical: true,
        ..error
    }
}
