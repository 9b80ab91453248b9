// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinError;

use crate::config::ModuleArgs;
use crate::containers::ContainerQuery;
use crate::engine::ModuleContext;
use crate::errors::ModuleError;
use crate::observability::messages::module::{AdditionalWorkerFailure, FanOutDispatched};
use crate::observability::messages::StructuredLog;
use crate::traits::{Module, ThreadAwareModule};

/// How a main module is executed, decided once when the recipe is loaded.
#[derive(Clone)]
pub enum Runnable {
    /// `process` called once.
    Whole(Arc<dyn Module>),
    /// `pre_process`, a bounded worker pool over one container type, `post_process`.
    FanOut(Arc<dyn ThreadAwareModule>),
}

impl Runnable {
    pub async fn set_up(&self, ctx: &ModuleContext, args: &ModuleArgs) -> Result<(), ModuleError> {
        match self {
            Runnable::Whole(module) => module.set_up(ctx, args).await,
            Runnable::FanOut(module) => module.set_up(ctx, args).await,
        }
    }

    pub async fn run(&self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        match self {
            Runnable::Whole(module) => module.process(ctx).await,
            Runnable::FanOut(module) => run_fan_out(module, ctx).await,
        }
    }
}

/// Run one fan-out module.
///
/// Every visible container of the module's threading type is dispatched to a worker;
/// at most `thread_pool_size` workers run at once. A failing worker does not stop the
/// others. Once all workers are done, `post_process` runs and then the first worker
/// error in dispatch order, if any, is returned.
async fn run_fan_out(
    module: &Arc<dyn ThreadAwareModule>,
    ctx: &ModuleContext,
) -> Result<(), ModuleError> {
    module.pre_process(ctx).await?;

    let container_type = module.thread_on_container_type().to_string();
    let mut query = ContainerQuery::of_type(&container_type);
    if !module.keep_threaded_containers_in_state() {
        query = query.pop();
    }
    let containers = ctx.query(&query)?;
    let pool_size = module.thread_pool_size().max(1);

    FanOutDispatched {
        module: ctx.name(),
        container_type: &container_type,
        container_count: containers.len(),
        pool_size,
    }
    .log();

    let semaphore = Arc::new(Semaphore::new(pool_size));
    let mut workers = Vec::with_capacity(containers.len());
    for container in containers {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| ModuleError::unexpected(format!("Worker pool closed: {e}")))?;

        let module = Arc::clone(module);
        let ctx = ctx.clone();
        workers.push(tokio::spawn(async move {
            let _permit = permit;
            module.process(&ctx, container).await
        }));
    }

    let mut first_error: Option<ModuleError> = None;
    for worker in workers {
        let result = worker.await.unwrap_or_else(|e| Err(join_failure(e)));
        if let Err(error) = result {
            if first_error.is_none() {
                first_error = Some(error);
            } else {
                AdditionalWorkerFailure {
                    module: ctx.name(),
                    error: &error,
                }
                .log();
            }
        }
    }

    let post_result = module.post_process(ctx).await;

    match (first_error, post_result) {
        (Some(error), Err(post_error)) => {
            AdditionalWorkerFailure {
                module: ctx.name(),
                error: &post_error,
            }
            .log();
            Err(error)
        }
        (Some(error), Ok(())) => Err(error),
        (None, result) => result,
    }
}

/// Run `future` on its own task so a panic inside a module surfaces as an
/// unexpected [`ModuleError`] instead of tearing down the caller.
pub(crate) async fn guarded<F>(module: &str, future: F) -> Result<(), ModuleError>
where
    F: Future<Output = Result<(), ModuleError>> + Send + 'static,
{
    match tokio::spawn(future).await {
        Ok(result) => result.map_err(|e| e.attributed_to(module)),
        Err(join_error) => Err(join_failure(join_error).with_module(module)),
    }
}

pub(crate) fn join_failure(error: JoinError) -> ModuleError {
    let trace = format!("{error:?}");
    let failure = if error.is_panic() {
        let message = panic_message(error.into_panic());
        ModuleError::unexpected(format!("Module panicked: {message}"))
    } else {
        ModuleError::unexpected(format!("Module task did not finish: {error}"))
    };
    failure.with_stacktrace(trace)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
