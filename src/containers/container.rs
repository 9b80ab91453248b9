// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::errors::ContainerError;

/// Open key/value metadata attached to a container.
pub type Metadata = HashMap<String, Value>;

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity handed out when a container is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u64);

impl ContainerId {
    fn next() -> Self {
        Self(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A strongly typed container payload.
///
/// Implementors pick the type tag consumers filter on; serde handles the payload.
/// Kinds whose payload fully identifies the thing it describes (a disk, a host) can
/// set `COMPARE_BY_VALUE`, making two containers with equal payloads the same
/// container as far as the store is concerned.
///
/// ```
/// use recipe_engine::containers::{Container, ContainerKind};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Disk {
///     name: String,
/// }
///
/// impl ContainerKind for Disk {
///     const CONTAINER_TYPE: &'static str = "disk";
/// }
///
/// let container = Container::from_kind(&Disk { name: "boot".into() }).unwrap();
/// assert_eq!(container.container_type(), "disk");
/// assert_eq!(container.decode::<Disk>().unwrap().name, "boot");
/// ```
pub trait ContainerKind: Serialize + DeserializeOwned {
    const CONTAINER_TYPE: &'static str;
    const COMPARE_BY_VALUE: bool = false;
}

/// A typed, metadata-tagged unit of data passed between modules.
///
/// The type tag and payload are fixed at creation. Metadata stays mutable so a
/// producer can annotate a container after storing it; the lock around it is only
/// ever held for a single read or write.
pub struct Container {
    id: ContainerId,
    container_type: String,
    payload: Value,
    compare_by_value: bool,
    metadata: RwLock<Metadata>,
}

impl Container {
    pub fn new(container_type: impl Into<String>, payload: Value) -> Self {
        Self {
            id: ContainerId::next(),
            container_type: container_type.into(),
            payload,
            compare_by_value: false,
            metadata: RwLock::new(Metadata::new()),
        }
    }

    /// Treat containers of the same type with equal payloads as the same container.
    pub fn compared_by_value(mut self) -> Self {
        self.compare_by_value = true;
        self
    }

    pub fn from_kind<T: ContainerKind>(value: &T) -> Result<Self, ContainerError> {
        let payload = serde_json::to_value(value).map_err(|source| ContainerError::Payload {
            container_type: T::CONTAINER_TYPE.to_string(),
            source,
        })?;
        let container = Self::new(T::CONTAINER_TYPE, payload);
        Ok(if T::COMPARE_BY_VALUE {
            container.compared_by_value()
        } else {
            container
        })
    }

    pub fn with_metadata(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_metadata(key, value);
        self
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn container_type(&self) -> &str {
        &self.container_type
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn decode<T: ContainerKind>(&self) -> Result<T, ContainerError> {
        if self.container_type != T::CONTAINER_TYPE {
            return Err(ContainerError::TypeMismatch {
                expected: T::CONTAINER_TYPE,
                actual: self.container_type.clone(),
            });
        }
        serde_json::from_value(self.payload.clone()).map_err(|source| ContainerError::Payload {
            container_type: self.container_type.clone(),
            source,
        })
    }

    pub fn set_metadata(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    pub fn metadata_value(&self, key: &str) -> Option<Value> {
        self.metadata
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn metadata(&self) -> Metadata {
        self.metadata
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Exact match on a single metadata entry.
    pub fn matches_metadata(&self, key: &str, value: &Value) -> bool {
        self.metadata
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .is_some_and(|v| v == value)
    }
}

/// Containers are equal when they are the same container, or when both compare by
/// value and share type tag and payload. Metadata never takes part.
impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        if self.id == other.id {
            return true;
        }
        self.compare_by_value
            && other.compare_by_value
            && self.container_type == other.container_type
            && self.payload == other.payload
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.id)
            .field("container_type", &self.container_type)
            .field("payload", &self.payload)
            .field("metadata", &self.metadata())
            .finish()
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {}", self.container_type, self.id, self.payload)
    }
}
