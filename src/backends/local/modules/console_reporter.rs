// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{PoisonError, RwLock};

use crate::backends::local::{parse_args, TextLine, WordCount};
use crate::config::ModuleArgs;
use crate::engine::ModuleContext;
use crate::errors::ModuleError;
use crate::traits::Module;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsoleReporterConfig {
    /// Also publish every visible text line.
    #[serde(default)]
    pub show_lines: bool,
}

/// Console Reporter module - publishes a summary of the counts it can see.
#[derive(Default)]
pub struct ConsoleReporter {
    config: RwLock<ConsoleReporterConfig>,
}

#[async_trait]
impl Module for ConsoleReporter {
    async fn set_up(&self, ctx: &ModuleContext, args: &ModuleArgs) -> Result<(), ModuleError> {
        let config: ConsoleReporterConfig = parse_args(ctx.name(), args)?;
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        Ok(())
    }

    async fn process(&self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        let show_lines = self
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .show_lines;

        if show_lines {
            for line in ctx.get_kind::<TextLine>()? {
                ctx.publish_message(&line.text, false);
            }
        }

        let counts = ctx.get_kind::<WordCount>()?;
        if counts.is_empty() {
            ctx.record_error("No word counts to report");
            return Ok(());
        }

        for count in counts {
            ctx.publish_message(
                &format!(
                    "{} words, {} characters across {} lines",
                    count.word_count, count.char_count, count.line_count
                ),
                false,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModuleNode, Recipe};

    #[tokio::test]
    async fn test_missing_counts_is_a_warning() {
        let recipe = Recipe {
            name: "t".into(),
            modules: vec![ModuleNode::new("console_reporter")],
            ..Recipe::default()
        };
        let ctx = ModuleContext::detached("console_reporter", &recipe);
        let module = ConsoleReporter::default();
        module.set_up(&ctx, &ModuleArgs::new()).await.unwrap();

        assert!(module.process(&ctx).await.is_ok());
        let errors = ctx.recorded_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].module.as_deref(), Some("console_reporter"));
    }
}
