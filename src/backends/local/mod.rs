// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process text modules, mostly useful for demos and end-to-end tests.
//!
//! | Name | Contract | Reads | Stores |
//! |------|----------|-------|--------|
//! | `arg_check` | preflight | | |
//! | `text_source` | module | | `text_line` |
//! | `change_text_case` | thread-aware | `text_line` | `text_line` |
//! | `word_counter` | module | `text_line` | `word_count` |
//! | `console_reporter` | module | `word_count` | |

pub mod factory;
pub mod kinds;
pub mod modules;

pub use factory::LocalModuleFactory;
pub use kinds::{TextLine, WordCount};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ModuleArgs;
use crate::errors::ModuleError;

/// Deserialize a module's arguments into its typed configuration.
pub(crate) fn parse_args<T: DeserializeOwned>(
    runtime_name: &str,
    args: &ModuleArgs,
) -> Result<T, ModuleError> {
    let object = Value::Object(args.clone().into_iter().collect());
    serde_json::from_value(object).map_err(|e| {
        ModuleError::critical(format!("Invalid arguments for '{runtime_name}': {e}"))
    })
}
