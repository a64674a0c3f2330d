//! Dry-run provider
//!
//! Fabricates deterministic handles without touching any cloud API. Backs
//! `stackform up --provider dry-run` and the synthesis tests; real
//! providers live in their own crates.

use crate::handle::ResourceHandle;
use crate::provider::{CloudProvider, ProviderError, ProviderResult};
use async_trait::async_trait;
use stackform_core::ResourceKind;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

/// One recorded `create` call
#[derive(Debug, Clone)]
pub struct CreateCall {
    pub kind: ResourceKind,
    pub attributes: BTreeMap<String, serde_json::Value>,
    pub id: String,
}

#[derive(Debug, Default)]
struct DryRunState {
    sequence: u64,
    live: BTreeSet<String>,
    calls: Vec<CreateCall>,
}

/// Provider that creates nothing and remembers everything
#[derive(Debug, Default)]
pub struct DryRunProvider {
    state: Mutex<DryRunState>,
}

impl DryRunProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded create calls, in call order
    pub fn calls(&self) -> Vec<CreateCall> {
        self.state.lock().map(|s| s.calls.clone()).unwrap_or_default()
    }

    /// Number of create calls seen so far
    pub fn create_count(&self) -> usize {
        self.state.lock().map(|s| s.calls.len()).unwrap_or(0)
    }

    /// Number of fabricated resources not yet deleted
    pub fn live_count(&self) -> usize {
        self.state.lock().map(|s| s.live.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CloudProvider for DryRunProvider {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn create(
        &self,
        kind: ResourceKind,
        attributes: &BTreeMap<String, serde_json::Value>,
    ) -> ProviderResult<String> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ProviderError::Api("dry-run state poisoned".to_string()))?;
        state.sequence += 1;
        let id = format!("dry-{}-{:04}", kind, state.sequence);
        tracing::info!(%kind, %id, "[dry-run] create");
        state.live.insert(id.clone());
        state.calls.push(CreateCall {
            kind,
            attributes: attributes.clone(),
            id: id.clone(),
        });
        Ok(id)
    }

    async fn delete(&self, handle: &ResourceHandle) -> ProviderResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ProviderError::Api("dry-run state poisoned".to_string()))?;
        if state.live.remove(&handle.id) {
            tracing::info!(id = %handle.id, "[dry-run] delete");
            Ok(())
        } else {
            Err(ProviderError::NotFound(handle.id.clone()))
        }
    }
}
