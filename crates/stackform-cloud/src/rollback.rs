//! Rollback coordination
//!
//! Compensating deletion of already-created resources after a mid-plan
//! failure. Best-effort: one failed deletion never stops the rest, and no
//! retries happen here (retry policy belongs to the caller).

use crate::handle::HandleMap;
use crate::provider::{CloudProvider, ProviderError};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Outcome of deleting one resource during rollback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackStatus {
    /// The provider deleted the resource
    Deleted,
    /// The resource was already gone; treated as success so a repeated
    /// rollback over the same handle map stays safe
    AlreadyAbsent,
    /// Deletion failed; an operator has to intervene
    Failed(String),
}

/// Per-resource rollback record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackEntry {
    /// Logical name of the resource
    pub name: String,

    /// Provider-assigned identifier that was deleted
    pub handle_id: String,

    /// What happened
    pub status: RollbackStatus,
}

/// Final report of a rollback pass
///
/// Terminal by construction: every handle was attempted exactly once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollbackReport {
    /// Entries in deletion order (reverse creation order)
    pub entries: Vec<RollbackEntry>,

    /// Total rollback time in milliseconds
    pub duration_ms: u64,
}

impl RollbackReport {
    pub fn deleted(&self) -> usize {
        self.count(|s| matches!(s, RollbackStatus::Deleted))
    }

    pub fn already_absent(&self) -> usize {
        self.count(|s| matches!(s, RollbackStatus::AlreadyAbsent))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, RollbackStatus::Failed(_)))
    }

    /// True when nothing was left behind
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    /// Entries whose deletion failed
    pub fn failed_entries(&self) -> impl Iterator<Item = &RollbackEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, RollbackStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&RollbackStatus) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.status)).count()
    }
}

impl std::fmt::Display for RollbackReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} deleted, {} already absent, {} failed",
            self.deleted(),
            self.already_absent(),
            self.failed()
        )
    }
}

/// Deletes created resources in reverse creation order
pub struct RollbackCoordinator<'a> {
    provider: &'a dyn CloudProvider,
}

impl<'a> RollbackCoordinator<'a> {
    pub fn new(provider: &'a dyn CloudProvider) -> Self {
        Self { provider }
    }

    /// Delete every handle, newest first, collecting per-resource outcomes
    ///
    /// A provider `NotFound` is recorded as [`RollbackStatus::AlreadyAbsent`]
    /// rather than a failure, which makes calling this twice over the same
    /// handle map harmless.
    pub async fn rollback(&self, handles: &HandleMap) -> RollbackReport {
        let started = Instant::now();
        let mut report = RollbackReport::default();

        for handle in handles.iter_rev() {
            let status = match self.provider.delete(handle).await {
                Ok(()) => {
                    tracing::info!(name = %handle.name, id = %handle.id, "deleted resource");
                    RollbackStatus::Deleted
                }
                Err(ProviderError::NotFound(_)) => {
                    tracing::debug!(name = %handle.name, id = %handle.id, "already absent");
                    RollbackStatus::AlreadyAbsent
                }
                Err(error) => {
                    tracing::warn!(name = %handle.name, id = %handle.id, %error, "delete failed");
                    RollbackStatus::Failed(error.to_string())
                }
            };
            report.entries.push(RollbackEntry {
                name: handle.name.clone(),
                handle_id: handle.id.clone(),
                status,
            });
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        report
    }
}
