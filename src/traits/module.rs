// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The three contracts a recipe step can implement.
//!
//! Every method takes `&self`: one instance is shared between the setup task, the
//! run task and, for fan-out modules, every pool worker. Implementations keep state
//! from `set_up` behind their own interior mutability.
//!
//! Returning `Err` with a critical [`ModuleError`] stops every module that has not
//! started its run phase. Non-critical problems are reported through
//! [`ModuleContext::record_error`] and the method returns `Ok`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::ModuleArgs;
use crate::containers::Container;
use crate::engine::ModuleContext;
use crate::errors::ModuleError;

/// A module processed once as a whole.
#[async_trait]
pub trait Module: Send + Sync {
    async fn set_up(&self, ctx: &ModuleContext, args: &ModuleArgs) -> Result<(), ModuleError>;

    async fn process(&self, ctx: &ModuleContext) -> Result<(), ModuleError>;
}

/// A module whose work is fanned out over the containers of one type.
///
/// The runner calls `pre_process` once, then `process` once per container of
/// [`thread_on_container_type`](Self::thread_on_container_type) visible to the
/// module, on at most [`thread_pool_size`](Self::thread_pool_size) workers at a time,
/// then `post_process` once, even when a worker failed.
#[async_trait]
pub trait ThreadAwareModule: Send + Sync {
    async fn set_up(&self, ctx: &ModuleContext, args: &ModuleArgs) -> Result<(), ModuleError>;

    async fn pre_process(&self, _ctx: &ModuleContext) -> Result<(), ModuleError> {
        Ok(())
    }

    async fn process(
        &self,
        ctx: &ModuleContext,
        container: Arc<Container>,
    ) -> Result<(), ModuleError>;

    async fn post_process(&self, _ctx: &ModuleContext) -> Result<(), ModuleError> {
        Ok(())
    }

    fn thread_on_container_type(&self) -> &str;

    fn thread_pool_size(&self) -> usize;

    /// When `false`, the module's own threaded containers are popped from the store
    /// as they are handed out.
    fn keep_threaded_containers_in_state(&self) -> bool {
        true
    }
}

/// A module run serially before everything else and cleaned up after everything else.
#[async_trait]
pub trait PreflightModule: Send + Sync {
    async fn set_up(&self, ctx: &ModuleContext, args: &ModuleArgs) -> Result<(), ModuleError>;

    async fn process(&self, ctx: &ModuleContext) -> Result<(), ModuleError>;

    async fn clean_up(&self, ctx: &ModuleContext) -> Result<(), ModuleError>;
}
