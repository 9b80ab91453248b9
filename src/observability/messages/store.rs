// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for container store bookkeeping.
//!
//! These are high-volume events and log at `debug!`, except for failed streaming
//! callbacks.

use crate::containers::ContainerId;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A recipe's slots were built.
///
/// # Log Level
/// `debug!` - Store lifecycle
pub struct RecipeParsed<'a> {
    pub recipe: &'a str,
    pub slot_count: usize,
}

impl Display for RecipeParsed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Container store parsed recipe '{}' into {} slots",
            self.recipe, self.slot_count
        )
    }
}

impl StructuredLog for RecipeParsed<'_> {
    fn log(&self) {
        tracing::debug!(recipe = self.recipe, slot_count = self.slot_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "recipe_parsed",
            span_name = name,
            recipe = self.recipe,
            slot_count = self.slot_count,
        )
    }
}

/// A container was appended to its producer's slot.
///
/// # Log Level
/// `debug!` - High-volume bookkeeping
///
/// # Example
/// ```
/// use recipe_engine::containers::Container;
/// use recipe_engine::observability::messages::store::ContainerStored;
///
/// let container = Container::new("text_line", serde_json::json!("hello"));
/// let msg = ContainerStored {
///     producer: "text_source",
///     container_type: container.container_type(),
///     container_id: container.id(),
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct ContainerStored<'a> {
    pub producer: &'a str,
    pub container_type: &'a str,
    pub container_id: ContainerId,
}

impl Display for ContainerStored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stored {} container {} for '{}'",
            self.container_type, self.container_id, self.producer
        )
    }
}

impl StructuredLog for ContainerStored<'_> {
    fn log(&self) {
        tracing::debug!(
            producer = self.producer,
            container_type = self.container_type,
            container_id = %self.container_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "container_stored",
            span_name = name,
            producer = self.producer,
            container_type = self.container_type,
            container_id = %self.container_id,
        )
    }
}

/// A container equal to one already in the producer's slot was not stored again.
///
/// # Log Level
/// `debug!` - Expected when modules re-emit results
pub struct DuplicateContainerSkipped<'a> {
    pub producer: &'a str,
    pub container_type: &'a str,
    pub existing_id: ContainerId,
}

impl Display for DuplicateContainerSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipping duplicate {} container from '{}' (already stored as {})",
            self.container_type, self.producer, self.existing_id
        )
    }
}

impl StructuredLog for DuplicateContainerSkipped<'_> {
    fn log(&self) {
        tracing::debug!(
            producer = self.producer,
            container_type = self.container_type,
            existing_id = %self.existing_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "duplicate_container",
            span_name = name,
            producer = self.producer,
            container_type = self.container_type,
        )
    }
}

/// Completing a module made one or more slots unreachable; their storage was dropped.
///
/// # Log Level
/// `debug!` - Memory reclamation
///
/// # Example
/// ```
/// use recipe_engine::observability::messages::store::SlotsCollected;
///
/// let collected = vec!["A".to_string()];
/// let msg = SlotsCollected {
///     completed: "B",
///     collected: &collected,
/// };
///
/// assert_eq!(msg.to_string(), "Completion of 'B' released containers of: A");
/// ```
pub struct SlotsCollected<'a> {
    pub completed: &'a str,
    pub collected: &'a [String],
}

impl Display for SlotsCollected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Completion of '{}' released containers of: {}",
            self.completed,
            self.collected.join(", ")
        )
    }
}

impl StructuredLog for SlotsCollected<'_> {
    fn log(&self) {
        tracing::debug!(
            completed = self.completed,
            collected = ?self.collected,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "slots_collected",
            span_name = name,
            completed = self.completed,
            collected_count = self.collected.len(),
        )
    }
}

/// A streaming callback panicked or was cancelled.
///
/// # Log Level
/// `warn!` - The container itself was stored; only the callback was lost
pub struct StreamingCallbackFailed<'a> {
    pub error: &'a str,
}

impl Display for StreamingCallbackFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Streaming callback failed: {}", self.error)
    }
}

impl StructuredLog for StreamingCallbackFailed<'_> {
    fn log(&self) {
        tracing::warn!(error = self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("streaming_callback_failed", span_name = name, error = self.error)
    }
}
