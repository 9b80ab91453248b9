// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed data records and the store that scopes them to declared dependencies.

pub mod container;
pub mod store;

pub use container::{Container, ContainerId, ContainerKind, Metadata};
pub use store::{ContainerQuery, ContainerStore, StreamingCallback};
