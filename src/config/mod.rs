// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod args;
mod loader;
mod module_pool;
mod recipe;
mod registry;
mod validation;

pub mod consts;

pub use args::{find_placeholders, substitute, ArgResolver, PlaceholderResolver};
pub use loader::{load_and_validate_recipe, load_recipe, parse_recipe_str};
pub use module_pool::{ModulePool, PooledModule};
pub use recipe::{ExecutorOptions, ModuleArgs, ModuleNode, Recipe};
pub use registry::{ModuleFactory, ModuleRegistry, RegisteredModule};
pub use validation::validate_recipe;
