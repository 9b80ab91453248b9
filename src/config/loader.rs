// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::path::Path;

use crate::config::consts::{JSON_EXTENSION, TOML_EXTENSION, YAML_EXTENSIONS};
use crate::config::{validate_recipe, Recipe};
use crate::errors::ConfigError;
use crate::observability::messages::validation::{
    ValidationCompleted, ValidationFailed, ValidationStarted,
};
use crate::observability::messages::StructuredLog;

/// Load a recipe from a YAML, JSON or TOML file, picked by extension.
pub fn load_recipe<P: AsRef<Path>>(path: P) -> Result<Recipe, ConfigError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let content = fs::read_to_string(path)?;
    parse_recipe_str(&content, &extension)
}

/// Parse recipe text in the format named by `extension`.
pub fn parse_recipe_str(content: &str, extension: &str) -> Result<Recipe, ConfigError> {
    let recipe = if YAML_EXTENSIONS.contains(&extension) {
        serde_yaml::from_str(content)?
    } else if extension == JSON_EXTENSION {
        serde_json::from_str(content)?
    } else if extension == TOML_EXTENSION {
        toml::from_str(content)?
    } else {
        return Err(ConfigError::UnsupportedFormat {
            extension: extension.to_string(),
        });
    };
    Ok(recipe)
}

/// Load a recipe and validate its dependency graph.
///
/// Duplicate runtime names, unresolved `wants` and cycles are all reported together.
pub fn load_and_validate_recipe<P: AsRef<Path>>(path: P) -> Result<Recipe, ConfigError> {
    let recipe = load_recipe(path)?;
    let module_count = recipe.preflights.len() + recipe.modules.len();

    ValidationStarted {
        recipe: &recipe.name,
        module_count,
    }
    .log();

    if let Err(errors) = validate_recipe(&recipe) {
        ValidationFailed {
            recipe: &recipe.name,
            errors: &errors,
        }
        .log();
        return Err(ConfigError::Validation(errors));
    }

    ValidationCompleted {
        recipe: &recipe.name,
        module_count,
    }
    .log();

    Ok(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_format() {
        let yaml = "name: r\nmodules:\n  - name: a\n  - name: b\n    wants: [a]\n";
        let json = r#"{"name": "r", "modules": [{"name": "a"}, {"name": "b", "wants": ["a"]}]}"#;
        let toml = r#"
name = "r"

[[modules]]
name = "a"

[[modules]]
name = "b"
wants = ["a"]
"#;

        for (content, extension) in [(yaml, "yaml"), (yaml, "yml"), (json, "json"), (toml, "toml")] {
            let recipe = parse_recipe_str(content, extension).unwrap();
            assert_eq!(recipe.name, "r", "format {extension}");
            assert_eq!(recipe.modules[1].wants, vec!["a"], "format {extension}");
        }
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            parse_recipe_str("", "ini"),
            Err(ConfigError::UnsupportedFormat { extension }) if extension == "ini"
        ));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            parse_recipe_str("name: [unclosed", "yaml"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_recipe("/definitely/not/here.yaml"),
            Err(ConfigError::Io(_))
        ));
    }
}
