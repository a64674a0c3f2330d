//! stackform synthesis
//!
//! Turns a declarative topology into an ordered sequence of provider API
//! calls, with rollback-on-failure semantics.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 stackform CLI                    │
//! │             (validate / plan / up)               │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               stackform-cloud                    │
//! │  ┌────────────┐ ┌──────────────┐ ┌───────────┐  │
//! │  │  Resolver  │→│    Engine    │→│ Rollback  │  │
//! │  │ (toposort) │ │  (execute)   │ │ (reverse) │  │
//! │  └────────────┘ └──────┬───────┘ └─────┬─────┘  │
//! │                        │               │        │
//! │  ┌─────────────────────▼───────────────▼─────┐  │
//! │  │       trait CloudProvider { ... }         │  │
//! │  └───────────────────────────────────────────┘  │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │    dry-run    │ │ real provider │
//! │   (in-tree)   │ │   (crates)    │
//! └───────────────┘ └───────────────┘
//! ```
//!
//! Resources are created strictly one at a time in topological order,
//! because later resources reference identifiers produced by earlier ones.
//! Structural errors (duplicates, dangling references, cycles) surface
//! before any provider call; runtime failures trigger a best-effort
//! rollback in reverse creation order.

pub mod dryrun;
pub mod engine;
pub mod error;
pub mod handle;
pub mod plan;
pub mod provider;
pub mod resolver;
pub mod rollback;

// Re-exports
pub use dryrun::DryRunProvider;
pub use engine::{synthesize, RunState, SynthesisEngine, SynthesisHalt, SynthesisOutcome};
pub use error::{CloudError, Result};
pub use handle::{HandleMap, ResourceHandle};
pub use plan::{PlanSummary, SynthesisPlan};
pub use provider::{CloudProvider, ProviderError, ProviderResult};
pub use resolver::build_plan;
pub use rollback::{RollbackCoordinator, RollbackEntry, RollbackReport, RollbackStatus};
pub use tokio_util::sync::CancellationToken;
