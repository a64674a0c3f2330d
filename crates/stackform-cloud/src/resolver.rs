//! Dependency resolution
//!
//! Builds a synthesis plan from a set of descriptors: derives dependency
//! edges from references, rejects dangling references and cycles, and
//! orders the remainder with Kahn's algorithm. The zero-in-degree frontier
//! is a `BTreeSet`, so ties break lexicographically by logical name and
//! the same descriptor set always yields the same plan.

use crate::error::{CloudError, Result};
use crate::plan::SynthesisPlan;
use stackform_core::ResourceDescriptor;
use std::collections::{BTreeMap, BTreeSet};

/// Build a synthesis plan from descriptors
///
/// Fails with [`CloudError::DanglingReference`] when a descriptor
/// references an unregistered name, and [`CloudError::CyclicDependency`]
/// naming the cycle members when the reference graph is not acyclic. Both
/// checks run before any provider interaction.
pub fn build_plan(descriptors: &[ResourceDescriptor]) -> Result<SynthesisPlan> {
    let by_name: BTreeMap<&str, &ResourceDescriptor> = {
        let mut map = BTreeMap::new();
        for descriptor in descriptors {
            if map.insert(descriptor.name.as_str(), descriptor).is_some() {
                return Err(CloudError::DuplicateName(descriptor.name.clone()));
            }
        }
        map
    };

    for descriptor in descriptors {
        for reference in &descriptor.references {
            if !by_name.contains_key(reference.as_str()) {
                return Err(CloudError::DanglingReference {
                    resource: descriptor.name.clone(),
                    reference: reference.clone(),
                });
            }
        }
    }

    // Kahn's algorithm. in-degree = number of unsatisfied dependencies.
    let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for descriptor in descriptors {
        in_degree.insert(descriptor.name.as_str(), descriptor.references.len());
        for reference in &descriptor.references {
            dependents
                .entry(reference.as_str())
                .or_default()
                .push(descriptor.name.as_str());
        }
    }

    let mut frontier: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(name, _)| *name)
        .collect();

    let mut steps = Vec::with_capacity(descriptors.len());
    while let Some(name) = frontier.pop_first() {
        steps.push((*by_name[name]).clone());
        for &dependent in dependents.get(name).map(Vec::as_slice).unwrap_or(&[]) {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    frontier.insert(dependent);
                }
            }
        }
    }

    if steps.len() != descriptors.len() {
        let emitted: BTreeSet<&str> = steps.iter().map(|d| d.name.as_str()).collect();
        let remaining: BTreeSet<&str> = by_name
            .keys()
            .copied()
            .filter(|name| !emitted.contains(name))
            .collect();
        return Err(CloudError::CyclicDependency(find_cycle(&by_name, &remaining)));
    }

    tracing::debug!("Resolved plan with {} steps", steps.len());
    Ok(SynthesisPlan::new(steps))
}

/// Extract the members of one cycle from the unsorted remainder
///
/// The remainder contains the cycle itself plus anything depending on it;
/// walking dependency edges within the remainder must eventually revisit a
/// node, and the walked suffix from that node is a cycle. Members are
/// returned sorted so the error message is deterministic.
fn find_cycle(
    by_name: &BTreeMap<&str, &ResourceDescriptor>,
    remaining: &BTreeSet<&str>,
) -> Vec<String> {
    let Some(&start) = remaining.iter().next() else {
        return Vec::new();
    };

    let mut path: Vec<&str> = Vec::new();
    let mut on_path: BTreeSet<&str> = BTreeSet::new();
    let mut current = start;

    loop {
        if on_path.contains(current) {
            let from = path.iter().position(|n| *n == current).unwrap_or(0);
            let mut members: Vec<String> =
                path[from..].iter().map(|n| n.to_string()).collect();
            members.sort();
            return members;
        }
        path.push(current);
        on_path.insert(current);
        // Every node in the remainder keeps at least one unsatisfied
        // dependency, otherwise Kahn's algorithm would have emitted it.
        match by_name
            .get(current)
            .and_then(|d| d.references.iter().map(String::as_str).find(|r| remaining.contains(r)))
        {
            Some(next) => current = next,
            None => {
                let mut members: Vec<String> = path.iter().map(|n| n.to_string()).collect();
                members.sort();
                return members;
            }
        }
    }
}
