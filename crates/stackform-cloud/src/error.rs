//! Synthesis error types

use crate::provider::ProviderError;
use thiserror::Error;

/// Errors raised while resolving or synthesizing a topology
///
/// The structural variants (`DuplicateName`, `DanglingReference`,
/// `CyclicDependency`) are all detected before any provider call is made,
/// so they never leave partial infrastructure behind.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Duplicate logical name: {0}")]
    DuplicateName(String),

    #[error("{resource} references unregistered name: {reference}")]
    DanglingReference { resource: String, reference: String },

    #[error("Cyclic dependency between: {}", .0.join(", "))]
    CyclicDependency(Vec<String>),

    #[error("Synthesis cancelled before creating {0}")]
    Cancelled(String),

    #[error("Provider failed creating {resource}: {source}")]
    Provider {
        resource: String,
        #[source]
        source: ProviderError,
    },
}

pub type Result<T> = std::result::Result<T, CloudError>;
