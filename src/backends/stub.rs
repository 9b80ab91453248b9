// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scriptable modules for exercising the runner and the store in tests.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::config::ModuleArgs;
use crate::containers::Container;
use crate::engine::ModuleContext;
use crate::errors::ModuleError;
use crate::traits::{Module, PreflightModule, ThreadAwareModule};

/// Tracks how many callers are inside a section at once, and the peak.
#[derive(Debug, Default)]
pub struct ConcurrencyGauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl ConcurrencyGauge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    pub fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Ordered log of lifecycle calls, shareable between modules.
#[derive(Debug, Default, Clone)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries().iter().any(|e| e == entry)
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }
}

/// A whole module whose behaviour is set up with builder calls.
///
/// Every lifecycle call is written to its [`CallLog`] as `"<runtime name>:<method>"`;
/// a `process` call that got to the end also writes `"<runtime name>:processed"`.
#[derive(Default)]
pub struct StubModule {
    set_up_failure: Option<ModuleError>,
    process_failure: Option<ModuleError>,
    panic_on_process: bool,
    recorded_error: Option<String>,
    produces: Vec<(String, Value)>,
    reads: Vec<String>,
    delay: Option<Duration>,
    gauge: Option<Arc<ConcurrencyGauge>>,
    log: CallLog,
    seen: Mutex<Vec<(String, usize)>>,
}

impl StubModule {
    pub fn failing_set_up(mut self, error: ModuleError) -> Self {
        self.set_up_failure = Some(error);
        self
    }

    pub fn failing(mut self, error: ModuleError) -> Self {
        self.process_failure = Some(error);
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panic_on_process = true;
        self
    }

    /// Record a non-critical error from `process` and otherwise succeed.
    pub fn recording_error(mut self, message: impl Into<String>) -> Self {
        self.recorded_error = Some(message.into());
        self
    }

    pub fn producing(mut self, container_type: impl Into<String>, payload: Value) -> Self {
        self.produces.push((container_type.into(), payload));
        self
    }

    pub fn reading(mut self, container_type: impl Into<String>) -> Self {
        self.reads.push(container_type.into());
        self
    }

    pub fn sleeping(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn gauged(mut self, gauge: Arc<ConcurrencyGauge>) -> Self {
        self.gauge = Some(gauge);
        self
    }

    pub fn logging_to(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// How many containers of `container_type` the last `process` call could see.
    pub fn seen(&self, container_type: &str) -> Option<usize> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|(t, _)| t == container_type)
            .map(|(_, count)| *count)
    }
}

#[async_trait]
impl Module for StubModule {
    async fn set_up(&self, ctx: &ModuleContext, _args: &ModuleArgs) -> Result<(), ModuleError> {
        self.log.push(format!("{}:set_up", ctx.name()));
        match &self.set_up_failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn process(&self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        self.log.push(format!("{}:process", ctx.name()));
        if let Some(gauge) = &self.gauge {
            gauge.enter();
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(gauge) = &self.gauge {
            gauge.exit();
        }

        if self.panic_on_process {
            panic!("stub module '{}' panicked", ctx.name());
        }

        for container_type in &self.reads {
            let count = ctx.get_containers(container_type)?.len();
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((container_type.clone(), count));
        }

        for (container_type, payload) in &self.produces {
            ctx.store_container(Container::new(container_type.clone(), payload.clone()))?;
        }

        if let Some(message) = &self.recorded_error {
            ctx.record_error(message.clone());
        }

        self.log.push(format!("{}:processed", ctx.name()));
        match &self.process_failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// A fan-out module that counts its calls and can fail on the n-th one.
pub struct StubFanOut {
    container_type: String,
    pool_size: usize,
    keep_containers: bool,
    fail_on_call: Option<usize>,
    delay: Duration,
    calls: AtomicUsize,
    gauge: ConcurrencyGauge,
    pre_processed: AtomicBool,
    post_processed: AtomicBool,
    log: CallLog,
}

impl StubFanOut {
    pub fn new(container_type: impl Into<String>, pool_size: usize) -> Self {
        Self {
            container_type: container_type.into(),
            pool_size,
            keep_containers: true,
            fail_on_call: None,
            delay: Duration::from_millis(10),
            calls: AtomicUsize::new(0),
            gauge: ConcurrencyGauge::default(),
            pre_processed: AtomicBool::new(false),
            post_processed: AtomicBool::new(false),
            log: CallLog::default(),
        }
    }

    /// Fail with a critical error on the `call`-th `process` call (1-based).
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn popping(mut self) -> Self {
        self.keep_containers = false;
        self
    }

    pub fn logging_to(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_workers(&self) -> usize {
        self.gauge.peak()
    }

    pub fn pre_processed(&self) -> bool {
        self.pre_processed.load(Ordering::SeqCst)
    }

    pub fn post_processed(&self) -> bool {
        self.post_processed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ThreadAwareModule for StubFanOut {
    async fn set_up(&self, ctx: &ModuleContext, _args: &ModuleArgs) -> Result<(), ModuleError> {
        self.log.push(format!("{}:set_up", ctx.name()));
        Ok(())
    }

    async fn pre_process(&self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        self.log.push(format!("{}:pre_process", ctx.name()));
        self.pre_processed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn process(
        &self,
        ctx: &ModuleContext,
        container: Arc<Container>,
    ) -> Result<(), ModuleError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.gauge.enter();
        tokio::time::sleep(self.delay).await;
        self.gauge.exit();
        self.log.push(format!("{}:process", ctx.name()));

        if self.fail_on_call == Some(call) {
            return Err(ModuleError::critical(format!(
                "worker failed on {}",
                container.payload()
            )));
        }
        Ok(())
    }

    async fn post_process(&self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        self.log.push(format!("{}:post_process", ctx.name()));
        self.post_processed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn thread_on_container_type(&self) -> &str {
        &self.container_type
    }

    fn thread_pool_size(&self) -> usize {
        self.pool_size
    }

    fn keep_threaded_containers_in_state(&self) -> bool {
        self.keep_containers
    }
}

/// A preflight that logs its calls and can fail in `process`.
#[derive(Default)]
pub struct StubPreflight {
    process_failure: Option<ModuleError>,
    log: CallLog,
}

impl StubPreflight {
    pub fn failing(mut self, error: ModuleError) -> Self {
        self.process_failure = Some(error);
        self
    }

    pub fn logging_to(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }
}

#[async_trait]
impl PreflightModule for StubPreflight {
    async fn set_up(&self, ctx: &ModuleContext, _args: &ModuleArgs) -> Result<(), ModuleError> {
        self.log.push(format!("{}:set_up", ctx.name()));
        Ok(())
    }

    async fn process(&self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        self.log.push(format!("{}:process", ctx.name()));
        match &self.process_failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn clean_up(&self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        self.log.push(format!("{}:clean_up", ctx.name()));
        Ok(())
    }
}
