//! Topology file discovery and loading

use crate::error::{Result, TopologyError};
use crate::model::ResourceDescriptor;
use crate::parser;
use std::path::{Path, PathBuf};

const CANDIDATES: [&str; 4] = [
    "topology.local.kdl",
    "topology.kdl",
    ".topology.kdl",
    "stack.kdl",
];

/// Locate the topology file for the current project
///
/// Search order:
/// 1. `STACKFORM_TOPOLOGY` environment variable (direct path)
/// 2. Current directory: `topology.local.kdl`, `topology.kdl`,
///    `.topology.kdl`, `stack.kdl`
/// 3. Global config: `~/.config/stackform/topology.kdl`
pub fn find_topology_file() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("STACKFORM_TOPOLOGY") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("stackform").join("topology.kdl");
        if global.exists() {
            return Ok(global);
        }
    }

    Err(TopologyError::TopologyFileNotFound)
}

/// Read and parse a topology file
pub fn load_topology(path: impl AsRef<Path>) -> Result<Vec<ResourceDescriptor>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    tracing::debug!("Loading topology from {}", path.display());
    parser::parse_topology(&content)
}
