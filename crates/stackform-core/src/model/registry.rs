//! Descriptor registry
//!
//! Collects descriptors for one topology and rejects duplicate logical
//! names. The registry is an explicit container handed to the resolver,
//! not an ambient construct tree: nothing registers itself.

use crate::error::{Result, TopologyError};
use crate::model::{ResourceDescriptor, ResourceKind};
use std::collections::{BTreeMap, BTreeSet};

/// Registry of resource descriptors for a single topology
#[derive(Debug, Clone, Default)]
pub struct TopologyRegistry {
    descriptors: BTreeMap<String, ResourceDescriptor>,
}

impl TopologyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new descriptor
    ///
    /// Fails with [`TopologyError::DuplicateName`] when the logical name is
    /// already taken. Pure data collection, no side effects.
    pub fn register(
        &mut self,
        kind: ResourceKind,
        name: impl Into<String>,
        attributes: BTreeMap<String, serde_json::Value>,
        references: impl IntoIterator<Item = String>,
    ) -> Result<&ResourceDescriptor> {
        self.add(ResourceDescriptor::new(kind, name, attributes, references))
    }

    /// Add a pre-built descriptor
    pub fn add(&mut self, descriptor: ResourceDescriptor) -> Result<&ResourceDescriptor> {
        let name = descriptor.name.clone();
        if self.descriptors.contains_key(&name) {
            return Err(TopologyError::DuplicateName(name));
        }
        Ok(self.descriptors.entry(name).or_insert(descriptor))
    }

    pub fn get(&self, name: &str) -> Option<&ResourceDescriptor> {
        self.descriptors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.descriptors.values()
    }

    /// Names of all resources of a given kind
    pub fn names_of_kind(&self, kind: ResourceKind) -> BTreeSet<&str> {
        self.descriptors
            .values()
            .filter(|d| d.kind == kind)
            .map(|d| d.name.as_str())
            .collect()
    }

    /// Consume the registry, yielding descriptors sorted by logical name
    pub fn into_descriptors(self) -> Vec<ResourceDescriptor> {
        self.descriptors.into_values().collect()
    }
}
