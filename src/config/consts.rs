// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Recipe file extensions parsed as YAML
pub const YAML_EXTENSIONS: [&str; 2] = ["yaml", "yml"];
/// Recipe file extension parsed as JSON
pub const JSON_EXTENSION: &str = "json";
/// Recipe file extension parsed as TOML
pub const TOML_EXTENSION: &str = "toml";

/// Worker count for built-in fan-out modules when the recipe does not set one
pub const DEFAULT_THREAD_POOL_SIZE: usize = 4;
