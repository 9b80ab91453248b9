// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::{PoisonError, RwLock};

use crate::backends::local::modules::TextCase;
use crate::backends::local::{parse_args, TextLine, WordCount};
use crate::config::ModuleArgs;
use crate::containers::ContainerKind;
use crate::engine::ModuleContext;
use crate::errors::ModuleError;
use crate::traits::Module;

/// Configuration for the Word Counter module.
///
/// With `case` set, only lines converted to that case are counted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WordCounterConfig {
    #[serde(default)]
    pub case: Option<TextCase>,
}

/// Word Counter module - counts characters, words and lines across visible text.
#[derive(Default)]
pub struct WordCounter {
    config: RwLock<WordCounterConfig>,
}

impl WordCounter {
    pub fn count<'a>(lines: impl IntoIterator<Item = &'a TextLine>) -> WordCount {
        lines.into_iter().fold(WordCount::default(), |mut total, line| {
            total.char_count += line.text.chars().count();
            total.word_count += line.text.split_whitespace().count();
            total.line_count += 1;
            total
        })
    }
}

#[async_trait]
impl Module for WordCounter {
    async fn set_up(&self, ctx: &ModuleContext, args: &ModuleArgs) -> Result<(), ModuleError> {
        let config: WordCounterConfig = parse_args(ctx.name(), args)?;
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        Ok(())
    }

    async fn process(&self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        let case = self
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .case;

        let containers = match case {
            Some(case) => {
                ctx.get_containers_filtered(TextLine::CONTAINER_TYPE, "case", case.to_string())?
            }
            None => ctx.get_containers(TextLine::CONTAINER_TYPE)?,
        };
        let lines = containers
            .iter()
            .map(|c| c.decode::<TextLine>())
            .collect::<Result<Vec<_>, _>>()?;

        let total = Self::count(&lines);
        ctx.log_telemetry("word_count", &total.word_count.to_string());
        ctx.store_kind(&total)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModuleNode, Recipe};
    use crate::containers::Container;
    use serde_json::json;

    fn context() -> ModuleContext {
        let recipe = Recipe {
            name: "t".into(),
            modules: vec![
                ModuleNode::new("source"),
                ModuleNode::new("word_counter").wants(["source"]),
            ],
            ..Recipe::default()
        };
        let ctx = ModuleContext::detached("word_counter", &recipe);
        let source = ctx.sibling("source");
        for (text, case) in [("hello world", None), ("HELLO WORLD AGAIN", Some("upper"))] {
            let mut container = Container::from_kind(&TextLine { text: text.into() }).unwrap();
            if let Some(case) = case {
                container = container.with_metadata("case", case);
            }
            source.store_container(container).unwrap();
        }
        ctx
    }

    #[test]
    fn test_count_empty() {
        assert_eq!(WordCounter::count(&Vec::<TextLine>::new()), WordCount::default());
    }

    #[tokio::test]
    async fn test_counts_all_visible_lines() {
        let ctx = context();
        let module = WordCounter::default();
        module.set_up(&ctx, &ModuleArgs::new()).await.unwrap();
        module.process(&ctx).await.unwrap();

        let counts = ctx.get_kind::<WordCount>().unwrap();
        assert_eq!(
            counts,
            vec![WordCount {
                char_count: 28,
                word_count: 5,
                line_count: 2,
            }]
        );
    }

    #[tokio::test]
    async fn test_counts_only_requested_case() {
        let ctx = context();
        let module = WordCounter::default();
        let args: ModuleArgs = [("case".to_string(), json!("upper"))].into();
        module.set_up(&ctx, &args).await.unwrap();
        module.process(&ctx).await.unwrap();

        let counts = ctx.get_kind::<WordCount>().unwrap();
        assert_eq!(counts[0].word_count, 3);
        assert_eq!(counts[0].line_count, 1);
    }
}
