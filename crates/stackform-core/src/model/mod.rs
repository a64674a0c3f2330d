//! Topology model
//!
//! Typed definitions of resource kinds and descriptors, plus the registry
//! that collects them for one topology.

mod descriptor;
mod kind;
mod registry;

pub use descriptor::ResourceDescriptor;
pub use kind::ResourceKind;
pub use registry::TopologyRegistry;
