// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Module implementations that ship with the engine.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process text modules used by the bundled recipes and the end-to-end tests:
//! a line source, a thread-aware case converter, a word counter, a reporter and an
//! argument-checking preflight. Register them with
//! [`LocalModuleFactory::register_all`](local::LocalModuleFactory::register_all).
//!
//! ## Stub Backend (Test-Only)
//! Scriptable modules for runner and store tests (only available in test builds):
//! - **StubModule**: whole module that can fail, panic, sleep, read and store
//! - **StubFanOut**: thread-aware module that counts calls and tracks peak workers
//! - **StubPreflight**: preflight that logs its lifecycle calls
//!
//! # Architecture
//!
//! ```text
//! ModuleRegistry → factory(runtime_name) → RegisteredModule → ModulePool → runner
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;
