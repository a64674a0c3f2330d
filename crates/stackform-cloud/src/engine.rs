//! Synthesis engine
//!
//! Walks a plan in order, resolves `${ref:NAME}` placeholders against the
//! handles created so far, and issues one provider `create` call per step.
//! A single run moves through
//! `Planning → Executing → {Completed | Failing → RollingBack → RolledBack}`;
//! [`synthesize`] drives the whole machine, [`SynthesisEngine`] is just the
//! Executing phase.

use crate::error::{CloudError, Result};
use crate::handle::{HandleMap, ResourceHandle};
use crate::plan::SynthesisPlan;
use crate::provider::CloudProvider;
use crate::resolver;
use crate::rollback::{RollbackCoordinator, RollbackReport};
use stackform_core::{placeholder, ResourceDescriptor};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

/// Phase of a single synthesis run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Planning,
    Executing,
    Completed,
    Failing,
    RollingBack,
    RolledBack,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Planning => write!(f, "planning"),
            RunState::Executing => write!(f, "executing"),
            RunState::Completed => write!(f, "completed"),
            RunState::Failing => write!(f, "failing"),
            RunState::RollingBack => write!(f, "rolling-back"),
            RunState::RolledBack => write!(f, "rolled-back"),
        }
    }
}

/// Execution halted mid-plan
///
/// Carries the partial handle map so the rollback coordinator can delete
/// what was already created.
#[derive(Debug)]
pub struct SynthesisHalt {
    /// Why execution stopped
    pub error: CloudError,

    /// Handles created before the halt, in creation order
    pub created: HandleMap,
}

/// Terminal result of a full synthesis run
#[derive(Debug)]
pub enum SynthesisOutcome {
    /// Every resource was created; the mapping is complete
    Completed { handles: HandleMap },

    /// Execution failed mid-plan; created resources were rolled back
    RolledBack {
        error: CloudError,
        report: RollbackReport,
    },
}

/// Executes a plan against a provider
///
/// Execution is not idempotent: re-running a plan without external state
/// tracking will attempt to create every resource again. State persistence
/// is deliberately left to the caller.
pub struct SynthesisEngine<'a> {
    provider: &'a dyn CloudProvider,
}

impl<'a> SynthesisEngine<'a> {
    pub fn new(provider: &'a dyn CloudProvider) -> Self {
        Self { provider }
    }

    /// Execute a plan, creating resources one at a time in plan order
    pub async fn execute(
        &self,
        plan: &SynthesisPlan,
    ) -> std::result::Result<HandleMap, SynthesisHalt> {
        self.execute_with_cancel(plan, &CancellationToken::new())
            .await
    }

    /// Execute a plan, aborting between steps once `cancel` fires
    ///
    /// Cancellation is treated identically to a creation failure: the
    /// remaining steps are skipped and the partial handle map is handed
    /// back for rollback.
    pub async fn execute_with_cancel(
        &self,
        plan: &SynthesisPlan,
        cancel: &CancellationToken,
    ) -> std::result::Result<HandleMap, SynthesisHalt> {
        let mut handles = HandleMap::new();

        for descriptor in plan.iter() {
            if cancel.is_cancelled() {
                return Err(SynthesisHalt {
                    error: CloudError::Cancelled(descriptor.name.clone()),
                    created: handles,
                });
            }

            let attributes = match resolve_attributes(descriptor, &handles) {
                Ok(attributes) => attributes,
                Err(error) => {
                    return Err(SynthesisHalt {
                        error,
                        created: handles,
                    });
                }
            };

            match self.provider.create(descriptor.kind, &attributes).await {
                Ok(id) => {
                    tracing::info!(
                        kind = %descriptor.kind,
                        name = %descriptor.name,
                        %id,
                        "created resource"
                    );
                    handles.insert(ResourceHandle::new(id, descriptor.kind, &descriptor.name));
                }
                Err(source) => {
                    return Err(SynthesisHalt {
                        error: CloudError::Provider {
                            resource: descriptor.name.clone(),
                            source,
                        },
                        created: handles,
                    });
                }
            }
        }

        Ok(handles)
    }
}

/// Substitute placeholders in a descriptor's attributes with handle ids
///
/// Topological order guarantees every referenced handle exists by the time
/// its dependent is created; a miss here means the descriptor referenced a
/// name outside its declared references.
fn resolve_attributes(
    descriptor: &ResourceDescriptor,
    handles: &HandleMap,
) -> Result<BTreeMap<String, serde_json::Value>> {
    let mut resolved = BTreeMap::new();
    for (key, value) in &descriptor.attributes {
        resolved.insert(key.clone(), resolve_value(descriptor, value, handles)?);
    }
    Ok(resolved)
}

fn resolve_value(
    descriptor: &ResourceDescriptor,
    value: &serde_json::Value,
    handles: &HandleMap,
) -> Result<serde_json::Value> {
    match value {
        serde_json::Value::String(s) => {
            let substituted =
                placeholder::substitute(s, |name| handles.get(name).map(|h| h.id.clone()))
                    .map_err(|reference| CloudError::DanglingReference {
                        resource: descriptor.name.clone(),
                        reference,
                    })?;
            Ok(serde_json::Value::String(substituted))
        }
        serde_json::Value::Array(items) => Ok(serde_json::Value::Array(
            items
                .iter()
                .map(|item| resolve_value(descriptor, item, handles))
                .collect::<Result<_>>()?,
        )),
        serde_json::Value::Object(map) => Ok(serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), resolve_value(descriptor, v, handles)?)))
                .collect::<Result<_>>()?,
        )),
        other => Ok(other.clone()),
    }
}

/// Run one full synthesis: plan, execute, roll back on failure
///
/// Structural errors (duplicate, dangling, cyclic) are returned as `Err`
/// before any provider call; nothing needs cleanup on that path. Runtime
/// failures and cancellation roll back created resources and yield
/// [`SynthesisOutcome::RolledBack`].
pub async fn synthesize(
    descriptors: &[ResourceDescriptor],
    provider: &dyn CloudProvider,
    cancel: &CancellationToken,
) -> Result<SynthesisOutcome> {
    tracing::debug!(state = %RunState::Planning, resources = descriptors.len(), "resolving plan");
    let plan = resolver::build_plan(descriptors)?;

    tracing::info!(
        state = %RunState::Executing,
        provider = provider.name(),
        steps = plan.len(),
        "executing plan"
    );
    match SynthesisEngine::new(provider)
        .execute_with_cancel(&plan, cancel)
        .await
    {
        Ok(handles) => {
            tracing::info!(state = %RunState::Completed, created = handles.len(), "synthesis complete");
            Ok(SynthesisOutcome::Completed { handles })
        }
        Err(halt) => {
            tracing::warn!(state = %RunState::Failing, error = %halt.error, "synthesis halted");
            tracing::info!(state = %RunState::RollingBack, created = halt.created.len(), "rolling back");
            let report = RollbackCoordinator::new(provider)
                .rollback(&halt.created)
                .await;
            tracing::info!(state = %RunState::RolledBack, %report, "rollback finished");
            Ok(SynthesisOutcome::RolledBack {
                error: halt.error,
                report,
            })
        }
    }
}
