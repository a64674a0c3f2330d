//! Synthesis plans

use serde::{Deserialize, Serialize};
use stackform_core::{ResourceDescriptor, ResourceKind};
use std::collections::BTreeMap;

/// Topologically ordered sequence of descriptors
///
/// Computed once by the resolver and reused for execution and, reversed,
/// for rollback. Every descriptor appears strictly after all descriptors
/// it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisPlan {
    steps: Vec<ResourceDescriptor>,
}

impl SynthesisPlan {
    pub(crate) fn new(steps: Vec<ResourceDescriptor>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[ResourceDescriptor] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.steps.iter()
    }

    /// Position of a logical name in the plan
    pub fn position(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|d| d.name == name)
    }

    /// Count of steps per resource kind
    pub fn summary(&self) -> PlanSummary {
        let mut by_kind = BTreeMap::new();
        for step in &self.steps {
            *by_kind.entry(step.kind).or_insert(0) += 1;
        }
        PlanSummary {
            total: self.steps.len(),
            by_kind,
        }
    }
}

/// Summary of a synthesis plan
#[derive(Debug, Clone)]
pub struct PlanSummary {
    pub total: usize,
    pub by_kind: BTreeMap<ResourceKind, usize>,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to create", self.total)?;
        let mut sep = " (";
        for (kind, count) in &self.by_kind {
            write!(f, "{sep}{count} {kind}")?;
            sep = ", ";
        }
        if !self.by_kind.is_empty() {
            write!(f, ")")?;
        }
        Ok(())
    }
}
