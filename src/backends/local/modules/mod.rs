// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod arg_check;
pub mod change_text_case;
pub mod console_reporter;
pub mod text_source;
pub mod word_counter;

pub use arg_check::ArgCheck;
pub use change_text_case::{ChangeTextCase, TextCase};
pub use console_reporter::ConsoleReporter;
pub use text_source::TextSource;
pub use word_counter::WordCounter;
