// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! `@token` substitution in module arguments.
//!
//! Recipes refer to values supplied at run time with `@name` placeholders:
//!
//! ```yaml
//! modules:
//!   - name: text_source
//!     args:
//!       lines: "@input"
//!       banner: "collected for @case_id"
//! ```
//!
//! A string that contains a placeholder has every occurrence of `@token` replaced
//! by the running argument of the same name when that argument is a string. When the
//! running argument is anything else (a list, a number, ...), the whole value is
//! replaced by it. Arrays and objects are resolved recursively; placeholders with no
//! matching running argument are left as they are.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::config::ModuleArgs;
use crate::errors::ConfigError;

static TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@([\w_]+)").expect("placeholder regex should compile"));

/// Turns a module's declared arguments into the arguments handed to `set_up`.
pub trait ArgResolver: Send + Sync {
    fn resolve(
        &self,
        runtime_name: &str,
        args: &ModuleArgs,
        running_args: &ModuleArgs,
    ) -> Result<ModuleArgs, ConfigError>;
}

/// Default resolver: `@token` substitution from the running arguments.
///
/// Leftover placeholders are tolerated unless the resolver is [`strict`](Self::strict),
/// in which case they are a configuration error.
///
/// # Example
/// ```
/// use recipe_engine::config::{ArgResolver, ModuleArgs, PlaceholderResolver};
/// use serde_json::json;
///
/// let args: ModuleArgs = [("path".to_string(), json!("/cases/@case_id/disk.img"))].into();
/// let running: ModuleArgs = [("case_id".to_string(), json!("c-42"))].into();
///
/// let resolved = PlaceholderResolver::new().resolve("reader", &args, &running).unwrap();
/// assert_eq!(resolved["path"], json!("/cases/c-42/disk.img"));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderResolver {
    strict: bool,
}

impl PlaceholderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self { strict: true }
    }
}

impl ArgResolver for PlaceholderResolver {
    fn resolve(
        &self,
        runtime_name: &str,
        args: &ModuleArgs,
        running_args: &ModuleArgs,
    ) -> Result<ModuleArgs, ConfigError> {
        let resolved: ModuleArgs = args
            .iter()
            .map(|(key, value)| (key.clone(), substitute(value, running_args)))
            .collect();

        if self.strict {
            let leftovers: Vec<String> = resolved.values().flat_map(find_placeholders).collect();
            if !leftovers.is_empty() {
                return Err(ConfigError::InvalidArguments {
                    runtime_name: runtime_name.to_string(),
                    reason: format!("unresolved placeholders: {}", leftovers.join(", ")),
                });
            }
        }

        Ok(resolved)
    }
}

/// Replace `@token` placeholders in `value` with entries of `running_args`.
pub fn substitute(value: &Value, running_args: &ModuleArgs) -> Value {
    match value {
        Value::String(text) => substitute_string(text, running_args),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute(item, running_args))
                .collect(),
        ),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, item)| (key.clone(), substitute(item, running_args)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn substitute_string(text: &str, running_args: &ModuleArgs) -> Value {
    let mut result = text.to_string();
    for captures in TOKEN_REGEX.captures_iter(text) {
        let token = &captures[1];
        match running_args.get(token) {
            Some(Value::String(replacement)) => {
                result = result.replace(&format!("@{token}"), replacement);
            }
            Some(other) => return other.clone(),
            None => {}
        }
    }
    Value::String(result)
}

/// Every string in `value` that still contains a placeholder.
pub fn find_placeholders(value: &Value) -> Vec<String> {
    let mut found = Vec::new();
    collect_placeholders(value, &mut found);
    found
}

fn collect_placeholders(value: &Value, found: &mut Vec<String>) {
    match value {
        Value::String(text) if TOKEN_REGEX.is_match(text) => found.push(text.clone()),
        Value::Array(items) => items.iter().for_each(|item| collect_placeholders(item, found)),
        Value::Object(fields) => fields
            .values()
            .for_each(|item| collect_placeholders(item, found)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn running() -> ModuleArgs {
        [
            ("case_id".to_string(), json!("c-42")),
            ("paths".to_string(), json!(["/a", "/b"])),
            ("zone".to_string(), json!("eu")),
        ]
        .into()
    }

    #[test]
    fn test_substitution_table() {
        struct TestCase {
            name: &'static str,
            input: Value,
            expected: Value,
        }

        let cases = vec![
            TestCase {
                name: "whole string token",
                input: json!("@case_id"),
                expected: json!("c-42"),
            },
            TestCase {
                name: "embedded tokens",
                input: json!("@zone/@case_id/out"),
                expected: json!("eu/c-42/out"),
            },
            TestCase {
                name: "non-string running arg replaces whole value",
                input: json!("files: @paths"),
                expected: json!(["/a", "/b"]),
            },
            TestCase {
                name: "unknown token left in place",
                input: json!("@missing"),
                expected: json!("@missing"),
            },
            TestCase {
                name: "nested structures",
                input: json!({"dirs": ["@zone", 3], "inner": {"id": "@case_id"}}),
                expected: json!({"dirs": ["eu", 3], "inner": {"id": "c-42"}}),
            },
            TestCase {
                name: "non-string values untouched",
                input: json!(12),
                expected: json!(12),
            },
        ];

        for case in cases {
            assert_eq!(
                substitute(&case.input, &running()),
                case.expected,
                "case: {}",
                case.name
            );
        }
    }

    #[test]
    fn test_find_placeholders() {
        let value = json!({"a": "@left", "b": ["done", "also @here"], "c": 1});
        let mut found = find_placeholders(&value);
        found.sort();
        assert_eq!(found, vec!["@left", "also @here"]);
    }

    #[test]
    fn test_lenient_resolver_keeps_leftovers() {
        let args: ModuleArgs = [("path".to_string(), json!("@missing"))].into();
        let resolved = PlaceholderResolver::new()
            .resolve("m", &args, &running())
            .unwrap();
        assert_eq!(resolved["path"], json!("@missing"));
    }

    #[test]
    fn test_strict_resolver_rejects_leftovers() {
        let args: ModuleArgs = [("path".to_string(), json!("@missing"))].into();
        let result = PlaceholderResolver::strict().resolve("m", &args, &running());
        assert!(matches!(
            result,
            Err(ConfigError::InvalidArguments { runtime_name, .. }) if runtime_name == "m"
        ));
    }
}
