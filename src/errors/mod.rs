// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod container;
mod module;
mod registry;

pub use config::{ConfigError, ValidationError};
pub use container::ContainerError;
pub use module::ModuleError;
pub use registry::ErrorRegistry;
