//! Runtime resource handles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stackform_core::ResourceKind;

/// Provider-assigned identity of a created resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceHandle {
    /// Provider-assigned identifier (instance id, ARN, ...)
    pub id: String,

    /// Resource kind
    pub kind: ResourceKind,

    /// Logical name from the descriptor
    pub name: String,

    /// When the resource was created
    pub created_at: DateTime<Utc>,
}

impl ResourceHandle {
    pub fn new(id: impl Into<String>, kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// Handles keyed by logical name, in creation order
///
/// Creation order is what rollback reverses, so the map preserves it
/// instead of using a hash map. Lookups are linear; synthesis graphs are
/// small.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandleMap {
    handles: Vec<ResourceHandle>,
}

impl HandleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a created handle. Logical names are unique within a plan.
    pub fn insert(&mut self, handle: ResourceHandle) {
        self.handles.push(handle);
    }

    pub fn get(&self, name: &str) -> Option<&ResourceHandle> {
        self.handles.iter().find(|h| h.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Handles in creation order
    pub fn iter(&self) -> impl Iterator<Item = &ResourceHandle> {
        self.handles.iter()
    }

    /// Handles in reverse creation order (rollback order)
    pub fn iter_rev(&self) -> impl Iterator<Item = &ResourceHandle> {
        self.handles.iter().rev()
    }

    /// Logical name → handle view for serialized output
    pub fn as_map(&self) -> std::collections::BTreeMap<&str, &ResourceHandle> {
        self.handles.iter().map(|h| (h.name.as_str(), h)).collect()
    }
}
