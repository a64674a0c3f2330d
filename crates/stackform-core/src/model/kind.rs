//! Resource kind definitions

use crate::error::TopologyError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of a managed resource
///
/// Kinds use kebab-case names in topology files and serialized output
/// (e.g. `load-balancer`, `security-group`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Network segment (VPC, subnet)
    Network,
    /// Compute instance
    Compute,
    /// Managed database instance
    Database,
    /// Load balancer
    LoadBalancer,
    /// Load balancer listener
    Listener,
    /// Target group attached to a listener
    Target,
    /// Security group with ingress/egress rules
    SecurityGroup,
}

impl ResourceKind {
    /// All known kinds, in declaration order
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Network,
        ResourceKind::Compute,
        ResourceKind::Database,
        ResourceKind::LoadBalancer,
        ResourceKind::Listener,
        ResourceKind::Target,
        ResourceKind::SecurityGroup,
    ];

    /// Kebab-case name as used in topology files
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Network => "network",
            ResourceKind::Compute => "compute",
            ResourceKind::Database => "database",
            ResourceKind::LoadBalancer => "load-balancer",
            ResourceKind::Listener => "listener",
            ResourceKind::Target => "target",
            ResourceKind::SecurityGroup => "security-group",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| TopologyError::UnknownKind(s.to_string()))
    }
}
