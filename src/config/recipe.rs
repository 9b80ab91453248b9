// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Arguments handed to a module's `set_up`, keyed by parameter name.
pub type ModuleArgs = HashMap<String, Value>;

/// A complete workflow definition.
///
/// # Fields
/// * `name` - Recipe name, used in telemetry and logs
/// * `description` - Free-form description (optional)
/// * `preflights` - Modules run serially before anything else, cleaned up last
/// * `modules` - Main modules, run concurrently under dependency gating
/// * `executor_options` - Runner tuning (optional)
///
/// # Example
/// ```yaml
/// name: text_pipeline
/// preflights:
///   - name: arg_check
///     args:
///       required: [input]
/// modules:
///   - name: text_source
///     args:
///       lines: "@input"
///   - name: word_counter
///     wants: [text_source]
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Recipe {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub preflights: Vec<ModuleNode>,
    #[serde(default)]
    pub modules: Vec<ModuleNode>,
    #[serde(default)]
    pub executor_options: ExecutorOptions,
}

impl Recipe {
    /// Every node, preflights first, in declaration order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &ModuleNode> {
        self.preflights.iter().chain(self.modules.iter())
    }

    pub fn node(&self, runtime_name: &str) -> Option<&ModuleNode> {
        self.all_nodes().find(|n| n.runtime_name() == runtime_name)
    }
}

/// One module instance in a recipe.
///
/// `runtime_name` defaults to `name` and is the key used everywhere in the store and
/// the runner. `wants` lists the runtime names whose output this module may read;
/// the module itself is always implicitly included.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ModuleNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_name: Option<String>,
    #[serde(default)]
    pub wants: Vec<String>,
    #[serde(default)]
    pub args: ModuleArgs,
}

impl ModuleNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_runtime_name(mut self, runtime_name: impl Into<String>) -> Self {
        self.runtime_name = Some(runtime_name.into());
        self
    }

    pub fn wants<I, S>(mut self, wants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wants = wants.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    pub fn runtime_name(&self) -> &str {
        self.runtime_name.as_deref().unwrap_or(&self.name)
    }
}

/// Runner tuning options.
///
/// # Fields
/// * `max_concurrency` - Maximum number of modules in their run phase at once.
///   Unset means one execution unit per module with no further bound. Fan-out
///   worker pools are bounded separately by each module's `thread_pool_size`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
}
