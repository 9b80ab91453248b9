// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // module implementations
pub mod config;     // recipes, registry, argument resolution
pub mod containers; // containers + dependency-scoped store
pub mod engine;     // module runner
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // module contracts
pub mod utils;
