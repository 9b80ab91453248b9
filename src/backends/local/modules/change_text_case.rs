// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::backends::local::{parse_args, TextLine};
use crate::config::consts::DEFAULT_THREAD_POOL_SIZE;
use crate::config::ModuleArgs;
use crate::containers::{Container, ContainerKind};
use crate::engine::ModuleContext;
use crate::errors::ModuleError;
use crate::traits::ThreadAwareModule;

const SMALL_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextCase {
    #[default]
    Upper,
    Lower,
    Proper,
    Title,
}

impl TextCase {
    pub fn apply(&self, input: &str) -> String {
        match self {
            TextCase::Upper => input.to_uppercase(),
            TextCase::Lower => input.to_lowercase(),
            TextCase::Proper => input
                .split_whitespace()
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" "),
            TextCase::Title => input
                .split_whitespace()
                .enumerate()
                .map(|(i, word)| {
                    let lower = word.to_lowercase();
                    if i > 0 && SMALL_WORDS.contains(&lower.as_str()) {
                        lower
                    } else {
                        capitalize(word)
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl fmt::Display for TextCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextCase::Upper => "upper",
            TextCase::Lower => "lower",
            TextCase::Proper => "proper",
            TextCase::Title => "title",
        };
        f.write_str(name)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

/// Configuration for the Change Text Case module.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeTextCaseConfig {
    #[serde(default)]
    pub case: TextCase,
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_threads() -> usize {
    DEFAULT_THREAD_POOL_SIZE
}

/// Change Text Case module - rewrites every visible `text_line` in parallel.
///
/// Each converted line is stored in this module's own slot with a `case` metadata
/// entry, so downstream modules can tell originals from conversions.
pub struct ChangeTextCase {
    case: RwLock<TextCase>,
    threads: AtomicUsize,
}

impl Default for ChangeTextCase {
    fn default() -> Self {
        Self {
            case: RwLock::new(TextCase::default()),
            threads: AtomicUsize::new(DEFAULT_THREAD_POOL_SIZE),
        }
    }
}

impl ChangeTextCase {
    fn case(&self) -> TextCase {
        *self.case.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ThreadAwareModule for ChangeTextCase {
    async fn set_up(&self, ctx: &ModuleContext, args: &ModuleArgs) -> Result<(), ModuleError> {
        let config: ChangeTextCaseConfig = parse_args(ctx.name(), args)?;
        if config.threads == 0 {
            return Err(ModuleError::critical(format!(
                "'{}' needs at least one thread",
                ctx.name()
            )));
        }
        *self.case.write().unwrap_or_else(PoisonError::into_inner) = config.case;
        self.threads.store(config.threads, Ordering::SeqCst);
        Ok(())
    }

    async fn process(
        &self,
        ctx: &ModuleContext,
        container: Arc<Container>,
    ) -> Result<(), ModuleError> {
        let line = container.decode::<TextLine>()?;
        let case = self.case();
        let converted = Container::from_kind(&TextLine {
            text: case.apply(&line.text),
        })?
        .with_metadata("case", case.to_string());

        if let Some(index) = container.metadata_value("line") {
            converted.set_metadata("line", index);
        }

        ctx.store_container(converted)?;
        Ok(())
    }

    async fn post_process(&self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        let converted = ctx
            .get_containers_filtered(TextLine::CONTAINER_TYPE, "case", self.case().to_string())?
            .len();
        ctx.log_telemetry("lines_converted", &converted.to_string());
        Ok(())
    }

    fn thread_on_container_type(&self) -> &str {
        TextLine::CONTAINER_TYPE
    }

    fn thread_pool_size(&self) -> usize {
        self.threads.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModuleNode, Recipe};
    use serde_json::json;

    #[test]
    fn test_case_conversions() {
        let test_cases = vec![
            (TextCase::Upper, "hello", "HELLO"),
            (TextCase::Lower, "HELLO", "hello"),
            (TextCase::Proper, "hello world", "Hello World"),
            (TextCase::Title, "the quick brown fox", "The Quick Brown Fox"),
            (TextCase::Title, "war AND peace", "War and Peace"),
        ];

        for (case, input, expected) in test_cases {
            assert_eq!(case.apply(input), expected, "Failed for case: {}", case);
        }
    }

    #[tokio::test]
    async fn test_set_up_reads_case_and_threads() {
        let recipe = Recipe {
            name: "t".into(),
            modules: vec![ModuleNode::new("change_text_case")],
            ..Recipe::default()
        };
        let ctx = ModuleContext::detached("change_text_case", &recipe);
        let module = ChangeTextCase::default();
        assert_eq!(module.thread_pool_size(), DEFAULT_THREAD_POOL_SIZE);

        let args: ModuleArgs = [
            ("case".to_string(), json!("title")),
            ("threads".to_string(), json!(2)),
        ]
        .into();
        module.set_up(&ctx, &args).await.unwrap();

        assert_eq!(module.case(), TextCase::Title);
        assert_eq!(module.thread_pool_size(), 2);
    }

    #[tokio::test]
    async fn test_zero_threads_is_rejected() {
        let recipe = Recipe {
            name: "t".into(),
            modules: vec![ModuleNode::new("change_text_case")],
            ..Recipe::default()
        };
        let ctx = ModuleContext::detached("change_text_case", &recipe);
        let args: ModuleArgs = [("threads".to_string(), json!(0))].into();

        let error = ChangeTextCase::default()
            .set_up(&ctx, &args)
            .await
            .unwrap_err();
        assert!(error.critical);
    }

    #[tokio::test]
    async fn test_process_stores_converted_line() {
        let recipe = Recipe {
            name: "t".into(),
            modules: vec![
                ModuleNode::new("change_text_case"),
                ModuleNode::new("reader").wants(["change_text_case"]),
            ],
            ..Recipe::default()
        };
        let ctx = ModuleContext::detached("change_text_case", &recipe);
        let module = ChangeTextCase::default();
        module.set_up(&ctx, &ModuleArgs::new()).await.unwrap();

        let input = Container::from_kind(&TextLine {
            text: "shout".into(),
        })
        .unwrap()
        .with_metadata("line", 4);
        module.process(&ctx, Arc::new(input)).await.unwrap();

        let stored = ctx
            .sibling("reader")
            .get_containers(TextLine::CONTAINER_TYPE)
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].decode::<TextLine>().unwrap().text, "SHOUT");
        assert_eq!(stored[0].metadata_value("case"), Some(json!("upper")));
        assert_eq!(stored[0].metadata_value("line"), Some(json!(4)));
    }
}
