//! Resource descriptor definitions

use crate::model::ResourceKind;
use crate::placeholder;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Declarative description of a single resource
///
/// Descriptors are immutable once registered: the graph is built from a
/// snapshot of these values, and nothing mutates them afterwards. Ordered
/// maps keep serialized output and plan construction deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Logical name, unique within a topology
    pub name: String,

    /// Resource kind
    pub kind: ResourceKind,

    /// Provider-specific attributes
    pub attributes: BTreeMap<String, serde_json::Value>,

    /// Logical names of resources this one depends on
    pub references: BTreeSet<String>,
}

impl ResourceDescriptor {
    /// Build a descriptor, folding `${ref:NAME}` placeholder targets found
    /// in string attribute values into `references`
    ///
    /// A placeholder therefore always produces a dependency edge, even when
    /// the author forgot to declare the reference explicitly.
    pub fn new(
        kind: ResourceKind,
        name: impl Into<String>,
        attributes: BTreeMap<String, serde_json::Value>,
        references: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut references: BTreeSet<String> = references.into_iter().collect();
        for value in attributes.values() {
            collect_placeholder_refs(value, &mut references);
        }
        Self {
            name: name.into(),
            kind,
            attributes,
            references,
        }
    }

    /// Full resource key (`kind:name`)
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind, self.name)
    }

    /// Get an attribute value as a specific type
    pub fn get_attr<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

fn collect_placeholder_refs(value: &serde_json::Value, refs: &mut BTreeSet<String>) {
    match value {
        serde_json::Value::String(s) => {
            for target in placeholder::placeholder_targets(s) {
                refs.insert(target.to_string());
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_placeholder_refs(item, refs);
            }
        }
        serde_json::Value::Object(map) => {
            for item in map.values() {
                collect_placeholder_refs(item, refs);
            }
        }
        _ => {}
    }
}
