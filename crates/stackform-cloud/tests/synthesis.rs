//! End-to-end synthesis scenarios

use async_trait::async_trait;
use stackform_cloud::{
    build_plan, synthesize, CancellationToken, CloudError, CloudProvider, DryRunProvider,
    ProviderError, ProviderResult, ResourceHandle, SynthesisEngine, SynthesisOutcome,
};
use stackform_core::{parse_topology, ResourceDescriptor, ResourceKind};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

/// Provider that fails the nth create call (1-based) and tracks live ids
#[derive(Debug, Default)]
struct FailingProvider {
    fail_at: usize,
    calls: Mutex<usize>,
    live: Mutex<BTreeSet<String>>,
}

impl FailingProvider {
    fn fail_at(n: usize) -> Self {
        Self {
            fail_at: n,
            ..Self::default()
        }
    }

    fn live_count(&self) -> usize {
        self.live.lock().unwrap().len()
    }
}

#[async_trait]
impl CloudProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn create(
        &self,
        kind: ResourceKind,
        _attributes: &BTreeMap<String, serde_json::Value>,
    ) -> ProviderResult<String> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if *calls == self.fail_at {
            return Err(ProviderError::Api("quota exceeded".to_string()));
        }
        let id = format!("{}-{:02}", kind, *calls);
        self.live.lock().unwrap().insert(id.clone());
        Ok(id)
    }

    async fn delete(&self, handle: &ResourceHandle) -> ProviderResult<()> {
        if self.live.lock().unwrap().remove(&handle.id) {
            Ok(())
        } else {
            Err(ProviderError::NotFound(handle.id.clone()))
        }
    }
}

fn linear_three() -> Vec<ResourceDescriptor> {
    vec![
        ResourceDescriptor::new(ResourceKind::Network, "vpc1", BTreeMap::new(), vec![]),
        ResourceDescriptor::new(
            ResourceKind::Network,
            "subnet-a",
            BTreeMap::new(),
            vec!["vpc1".to_string()],
        ),
        ResourceDescriptor::new(
            ResourceKind::Compute,
            "web-1",
            BTreeMap::new(),
            vec!["subnet-a".to_string()],
        ),
    ]
}

#[tokio::test]
async fn failure_mid_plan_rolls_back_created_resources() {
    // Three-node linear plan where the second creation fails
    let provider = FailingProvider::fail_at(2);

    let outcome = synthesize(&linear_three(), &provider, &CancellationToken::new())
        .await
        .unwrap();

    match outcome {
        SynthesisOutcome::RolledBack { error, report } => {
            assert!(matches!(
                error,
                CloudError::Provider { ref resource, .. } if resource == "subnet-a"
            ));
            assert_eq!(report.entries.len(), 1);
            assert_eq!(report.entries[0].name, "vpc1");
            assert_eq!(report.deleted(), 1);
            assert_eq!(report.failed(), 0);
        }
        other => panic!("expected RolledBack, got {other:?}"),
    }
    // Nothing left behind
    assert_eq!(provider.live_count(), 0);
}

#[tokio::test]
async fn partial_handle_map_contains_only_created_resources() {
    let provider = FailingProvider::fail_at(2);
    let plan = build_plan(&linear_three()).unwrap();

    let halt = SynthesisEngine::new(&provider)
        .execute(&plan)
        .await
        .unwrap_err();

    assert_eq!(halt.created.len(), 1);
    assert!(halt.created.contains("vpc1"));
    assert!(!halt.created.contains("subnet-a"));
}

/// Provider that cancels the shared token from inside its first create,
/// simulating an operator interrupt while a resource is being provisioned
struct CancellingProvider {
    inner: DryRunProvider,
    cancel: CancellationToken,
}

#[async_trait]
impl CloudProvider for CancellingProvider {
    fn name(&self) -> &str {
        "cancelling"
    }

    async fn create(
        &self,
        kind: ResourceKind,
        attributes: &BTreeMap<String, serde_json::Value>,
    ) -> ProviderResult<String> {
        self.cancel.cancel();
        self.inner.create(kind, attributes).await
    }

    async fn delete(&self, handle: &ResourceHandle) -> ProviderResult<()> {
        self.inner.delete(handle).await
    }
}

#[tokio::test]
async fn cancellation_is_treated_as_failure() {
    let cancel = CancellationToken::new();
    let provider = CancellingProvider {
        inner: DryRunProvider::new(),
        cancel: cancel.clone(),
    };

    let outcome = synthesize(&linear_three(), &provider, &cancel).await.unwrap();

    match outcome {
        SynthesisOutcome::RolledBack { error, report } => {
            // First create succeeded, then the token stopped step two
            assert!(matches!(error, CloudError::Cancelled(name) if name == "subnet-a"));
            assert_eq!(report.deleted(), 1);
            assert!(report.is_clean());
        }
        other => panic!("expected RolledBack, got {other:?}"),
    }
    assert_eq!(provider.inner.live_count(), 0);
}

#[tokio::test]
async fn web_stack_demo_synthesizes_completely() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/web-stack.kdl");
    let content = std::fs::read_to_string(path).unwrap();
    let descriptors = parse_topology(&content).unwrap();

    let plan = build_plan(&descriptors).unwrap();
    assert_eq!(plan.len(), 13);

    // Dependencies strictly precede dependents
    for step in plan.iter() {
        let own = plan.position(&step.name).unwrap();
        for reference in &step.references {
            assert!(plan.position(reference).unwrap() < own);
        }
    }

    // Every web instance is a member of the target group, not just the
    // last one created
    let fleet = descriptors.iter().find(|d| d.name == "web-fleet").unwrap();
    assert!(fleet.references.contains("web-1"));
    assert!(fleet.references.contains("web-2"));

    let provider = DryRunProvider::new();
    let outcome = synthesize(&descriptors, &provider, &CancellationToken::new())
        .await
        .unwrap();

    let handles = match outcome {
        SynthesisOutcome::Completed { handles } => handles,
        other => panic!("expected Completed, got {other:?}"),
    };
    assert_eq!(handles.len(), 13);

    // The target group's create call saw both instances' real handle ids
    let fleet_call = provider
        .calls()
        .into_iter()
        .find(|c| c.kind == ResourceKind::Target)
        .unwrap();
    let members = fleet_call.attributes["members"].as_array().unwrap();
    let ids: Vec<&str> = members.iter().filter_map(|m| m.as_str()).collect();
    assert!(ids.contains(&handles.get("web-1").unwrap().id.as_str()));
    assert!(ids.contains(&handles.get("web-2").unwrap().id.as_str()));
}

#[tokio::test]
async fn repeated_plans_are_identical() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/web-stack.kdl");
    let content = std::fs::read_to_string(path).unwrap();
    let descriptors = parse_topology(&content).unwrap();

    let first = build_plan(&descriptors).unwrap();
    for _ in 0..5 {
        assert_eq!(build_plan(&descriptors).unwrap(), first);
    }
}
