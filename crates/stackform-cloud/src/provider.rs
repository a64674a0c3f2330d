//! Cloud provider trait definition
//!
//! The sole boundary to real cloud APIs. The synthesis engine never talks
//! to a provider SDK directly; it only issues `create` and `delete` calls
//! through this trait. Real providers live in their own crates and link
//! this one, the same way a CLI links a provider crate.

use crate::handle::ResourceHandle;
use async_trait::async_trait;
use stackform_core::ResourceKind;
use std::collections::BTreeMap;
use thiserror::Error;

/// Error reported by a provider for a single create/delete call
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The resource does not exist (already deleted, or never created)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The provider API rejected or failed the call
    #[error("API error: {0}")]
    Api(String),

    /// Authentication or authorization failure
    #[error("Authentication failed: {0}")]
    Auth(String),
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Cloud provider abstraction
///
/// Calls are awaited one at a time by the engine; implementations do not
/// need to support concurrent use within a single synthesis run.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Provider name (e.g. "dry-run", "aws")
    fn name(&self) -> &str;

    /// Create a resource, returning the provider-assigned identifier
    ///
    /// Attribute placeholders are already resolved by the engine; the
    /// provider sees concrete identifiers only.
    async fn create(
        &self,
        kind: ResourceKind,
        attributes: &BTreeMap<String, serde_json::Value>,
    ) -> ProviderResult<String>;

    /// Delete a previously created resource
    ///
    /// Deleting a resource that no longer exists must report
    /// [`ProviderError::NotFound`] rather than fail hard; rollback relies
    /// on that to stay idempotent.
    async fn delete(&self, handle: &ResourceHandle) -> ProviderResult<()>;
}
