//! Topology model error types

use thiserror::Error;

/// Errors raised while building or loading a topology
#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("Duplicate logical name: {0}")]
    DuplicateName(String),

    #[error("Unknown resource kind: {0}")]
    UnknownKind(String),

    #[error("Invalid topology: {0}")]
    InvalidConfig(String),

    #[error("KDL parse error: {0}")]
    Parse(#[from] kdl::KdlError),

    #[error("No topology file found (tried topology.kdl, .topology.kdl, stack.kdl)")]
    TopologyFileNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TopologyError>;
