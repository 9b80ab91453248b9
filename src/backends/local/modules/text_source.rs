// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{PoisonError, RwLock};

use crate::backends::local::{parse_args, TextLine};
use crate::config::ModuleArgs;
use crate::containers::Container;
use crate::engine::ModuleContext;
use crate::errors::ModuleError;
use crate::traits::Module;

/// Configuration for the Text Source module.
///
/// `lines` is either a list of strings or a single string split on newlines.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextSourceConfig {
    #[serde(default)]
    pub lines: Lines,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Lines {
    Many(Vec<String>),
    One(String),
}

impl Default for Lines {
    fn default() -> Self {
        Lines::Many(Vec::new())
    }
}

impl Lines {
    fn into_vec(self) -> Vec<String> {
        match self {
            Lines::Many(lines) => lines,
            Lines::One(text) => text.lines().map(str::to_string).collect(),
        }
    }
}

/// Text Source module - stores one `text_line` container per input line.
#[derive(Default)]
pub struct TextSource {
    lines: RwLock<Vec<String>>,
}

#[async_trait]
impl Module for TextSource {
    async fn set_up(&self, ctx: &ModuleContext, args: &ModuleArgs) -> Result<(), ModuleError> {
        let config: TextSourceConfig = parse_args(ctx.name(), args)?;
        *self.lines.write().unwrap_or_else(PoisonError::into_inner) = config.lines.into_vec();
        Ok(())
    }

    async fn process(&self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        let lines = self
            .lines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        if lines.is_empty() {
            ctx.record_error("No input lines to emit");
            return Ok(());
        }

        for (index, text) in lines.into_iter().enumerate() {
            let container = Container::from_kind(&TextLine { text })?.with_metadata("line", index);
            ctx.store_container(container)?;
        }
        Ok(())
    }
}
