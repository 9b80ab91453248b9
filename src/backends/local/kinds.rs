// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::containers::ContainerKind;

/// One line of text flowing through the text modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
}

impl ContainerKind for TextLine {
    const CONTAINER_TYPE: &'static str = "text_line";
}

/// Totals computed by `word_counter`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub char_count: usize,
    pub word_count: usize,
    pub line_count: usize,
}

impl ContainerKind for WordCount {
    const CONTAINER_TYPE: &'static str = "word_count";
}
