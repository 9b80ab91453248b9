// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors converting between a container's payload and a typed value.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Expected a '{expected}' container, found '{actual}'")]
    TypeMismatch {
        expected: &'static str,
        actual: String,
    },

    #[error("Container payload does not match '{container_type}': {source}")]
    Payload {
        container_type: String,
        #[source]
        source: serde_json::Error,
    },
}
