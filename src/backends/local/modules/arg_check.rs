// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::{PoisonError, RwLock};

use crate::backends::local::parse_args;
use crate::config::{find_placeholders, ModuleArgs};
use crate::engine::ModuleContext;
use crate::errors::ModuleError;
use crate::traits::PreflightModule;

const CACHE_PREFIX: &str = "arg:";

/// Configuration for the Arg Check preflight.
///
/// `require` maps a name to the value it must resolve to, usually a `@placeholder`:
///
/// ```yaml
/// preflights:
///   - name: arg_check
///     args:
///       require:
///         input: "@input"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArgCheckConfig {
    #[serde(default)]
    pub require: Map<String, Value>,
}

/// Arg Check preflight - fails the run before any module starts when a required
/// running argument was not supplied.
///
/// Values that resolved are published to the run cache as `arg:<name>` and removed
/// again in `clean_up`.
#[derive(Default)]
pub struct ArgCheck {
    config: RwLock<ArgCheckConfig>,
}

impl ArgCheck {
    fn is_missing(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(text) if text.is_empty() => true,
            other => !find_placeholders(other).is_empty(),
        }
    }
}

#[async_trait]
impl PreflightModule for ArgCheck {
    async fn set_up(&self, ctx: &ModuleContext, args: &ModuleArgs) -> Result<(), ModuleError> {
        let config: ArgCheckConfig = parse_args(ctx.name(), args)?;
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        Ok(())
    }

    async fn process(&self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        let config = self
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let missing: Vec<&str> = config
            .require
            .iter()
            .filter(|(_, value)| Self::is_missing(value))
            .map(|(name, _)| name.as_str())
            .collect();

        if !missing.is_empty() {
            return Err(ModuleError::critical(format!(
                "Missing required arguments: {}",
                missing.join(", ")
            )));
        }

        for (name, value) in config.require {
            ctx.cache().set(format!("{CACHE_PREFIX}{name}"), value);
        }
        Ok(())
    }

    async fn clean_up(&self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        let config = self
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let removed = config
            .require
            .keys()
            .filter_map(|name| ctx.cache().remove(&format!("{CACHE_PREFIX}{name}")))
            .count();
        tracing::debug!(module = ctx.name(), removed, "Cleared checked arguments from cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModuleNode, Recipe};
    use serde_json::json;

    fn context() -> ModuleContext {
        let recipe = Recipe {
            name: "t".into(),
            preflights: vec![ModuleNode::new("arg_check")],
            ..Recipe::default()
        };
        ModuleContext::detached("arg_check", &recipe)
    }

    fn args(require: Value) -> ModuleArgs {
        [("require".to_string(), require)].into()
    }

    #[tokio::test]
    async fn test_missing_arguments_table() {
        struct TestCase {
            name: &'static str,
            require: Value,
            should_fail: bool,
        }

        let cases = vec![
            TestCase {
                name: "resolved string",
                require: json!({"input": "hello"}),
                should_fail: false,
            },
            TestCase {
                name: "resolved list",
                require: json!({"input": ["a", "b"]}),
                should_fail: false,
            },
            TestCase {
                name: "unresolved placeholder",
                require: json!({"input": "@input"}),
                should_fail: true,
            },
            TestCase {
                name: "empty string",
                require: json!({"input": ""}),
                should_fail: true,
            },
            TestCase {
                name: "null",
                require: json!({"input": null}),
                should_fail: true,
            },
            TestCase {
                name: "nothing required",
                require: json!({}),
                should_fail: false,
            },
        ];

        for case in cases {
            let ctx = context();
            let module = ArgCheck::default();
            module.set_up(&ctx, &args(case.require)).await.unwrap();

            let result = module.process(&ctx).await;
            assert_eq!(result.is_err(), case.should_fail, "case: {}", case.name);
            if let Err(error) = result {
                assert!(error.critical, "case: {}", case.name);
            }
        }
    }

    #[tokio::test]
    async fn test_cache_is_filled_then_cleared() {
        let ctx = context();
        let module = ArgCheck::default();
        module
            .set_up(&ctx, &args(json!({"zone": "eu"})))
            .await
            .unwrap();

        module.process(&ctx).await.unwrap();
        assert_eq!(ctx.cache().get("arg:zone"), Some(json!("eu")));

        module.clean_up(&ctx).await.unwrap();
        assert!(!ctx.cache().contains("arg:zone"));
    }
}
