//! stackform topology model
//!
//! Declarative descriptions of infrastructure resources: typed resource
//! kinds, immutable descriptors with explicit references, the registry that
//! collects them, and the KDL topology format they are loaded from. The
//! dependency resolution and synthesis machinery lives in
//! `stackform-cloud`; this crate is pure data.

pub mod error;
pub mod loader;
pub mod model;
pub mod parser;
pub mod placeholder;

// Re-exports
pub use error::{Result, TopologyError};
pub use loader::{find_topology_file, load_topology};
pub use model::{ResourceDescriptor, ResourceKind, TopologyRegistry};
pub use parser::{parse_registry, parse_topology};
