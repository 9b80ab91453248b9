// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod context;
mod report;
mod runnable;
mod runner;
mod signal;


pub use context::{ModuleContext, PublishCallback};
pub use report::{ModuleState, RunReport};
pub use runnable::Runnable;
pub use runner::ModuleRunner;
pub use signal::CompletionSignal;
