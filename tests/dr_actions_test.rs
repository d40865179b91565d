//! End-to-end DR lifecycle over the in-memory hub
//!
//! A background task plays the role of the DR controller and placement
//! engine: it reacts to spec mutations by flipping status fields, while the
//! engine under test polls for them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use slog::{o, Logger};
use tokio::task::JoinHandle;

use drover::config::{ChannelConfig, Config, HubConfig};
use drover::context::Context;
use drover::deployers::Deployer;
use drover::dractions::{DrActions, DrError};
use drover::hub::{HubApi, InMemoryHub};
use drover::resources::meta::{Condition, ObjectMeta, CONDITION_TRUE};
use drover::resources::{
    drpc_name, ClusterDecision, DecisionGroup, DrAction, DrPolicy, Placement, PlacementDecision,
    PlacementDecisionStatus, PlacementStatus, CONDITION_AVAILABLE, CONDITION_PEER_READY,
    CONDITION_PLACEMENT_SATISFIED, OCM_SCHEDULING_DISABLE, PHASE_DEPLOYED, PHASE_FAILED_OVER,
    PHASE_RELOCATED,
};
use drover::util::CommandError;
use drover::workloads::{Deployment, Workload};

struct NoopDeployer {
    dr_capable: bool,
}

#[async_trait]
impl Deployer for NoopDeployer {
    fn name(&self) -> &str {
        "noop"
    }

    fn supports_dr_control(&self) -> bool {
        self.dr_capable
    }

    async fn deploy(&self, _workload: &dyn Workload) -> Result<(), CommandError> {
        Ok(())
    }

    async fn undeploy(&self, _workload: &dyn Workload) -> Result<(), CommandError> {
        Ok(())
    }
}

fn test_config(timeout: i64) -> Config {
    Config {
        hub: HubConfig::default(),
        clusters: vec!["c1".to_string(), "c2".to_string()],
        dr_policy: "dr-policy".to_string(),
        channel: ChannelConfig {
            repo: "https://github.com/example/workloads".to_string(),
            branch: "main".to_string(),
        },
        timeout,
        interval: 0,
        strict_phase_checks: false,
    }
}

fn test_context(hub: &InMemoryHub, config: Config) -> Arc<Context> {
    config.validate().expect("test config should be valid");
    Context::new(
        Logger::root(slog::Discard, o!()),
        config,
        Arc::new(hub.clone()),
    )
}

async fn seed_scheduled_workload(hub: &InMemoryHub, workload: &Deployment, cluster: &str) {
    let decision_name = format!("{}-decision-1", workload.placement_name());

    hub.insert_placement(Placement {
        metadata: ObjectMeta::namespaced(workload.placement_name(), workload.namespace()),
        status: PlacementStatus {
            conditions: vec![Condition::new(CONDITION_PLACEMENT_SATISFIED, CONDITION_TRUE)],
            decision_groups: vec![DecisionGroup {
                decisions: vec![decision_name.clone()],
            }],
        },
    })
    .await;

    hub.insert_placement_decision(PlacementDecision {
        metadata: ObjectMeta::namespaced(&decision_name, workload.namespace()),
        status: PlacementDecisionStatus {
            decisions: vec![ClusterDecision {
                cluster_name: cluster.to_string(),
            }],
        },
    })
    .await;

    hub.insert_dr_policy(DrPolicy::named("dr-policy", &["c1", "c2"]))
        .await;
}

/// Simulated DR controller: keeps the DRPC's conditions good, stamps a sync
/// checkpoint and moves the phase to the current action's terminal phase.
fn spawn_controller(hub: InMemoryHub, namespace: String, drpc: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            hub.with_drpc_mut(&namespace, &drpc, |d| {
                d.status.conditions = vec![
                    Condition::new(CONDITION_AVAILABLE, CONDITION_TRUE),
                    Condition::new(CONDITION_PEER_READY, CONDITION_TRUE),
                ];
                d.status.last_group_sync_time = Some(chrono::Utc::now());
                d.status.phase = match d.spec.action {
                    Some(DrAction::Failover) => PHASE_FAILED_OVER,
                    Some(DrAction::Relocate) => PHASE_RELOCATED,
                    None => PHASE_DEPLOYED,
                }
                .to_string();
            })
            .await;

            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_dr_lifecycle() {
    let hub = InMemoryHub::new();
    let ctx = test_context(&hub, test_config(10));
    let workload = Deployment::new("w1", "ns1", "deployments/busybox", &ctx.config);
    let deployer = NoopDeployer { dr_capable: true };
    let actions = DrActions::new(Arc::clone(&ctx));
    let drpc = drpc_name(workload.name());

    seed_scheduled_workload(&hub, &workload, "c1").await;
    let controller = spawn_controller(hub.clone(), "ns1".to_string(), drpc.clone());

    // enable: DRPC created with the resolved cluster, scheduling pinned
    actions
        .enable_protection(&workload, &deployer)
        .await
        .expect("enable should succeed");

    let created = hub.drpc("ns1", &drpc).await.expect("drpc should exist");
    assert_eq!(created.spec.preferred_cluster, "c1");
    assert_eq!(created.spec.dr_policy_ref.name, "dr-policy");
    assert_eq!(
        created.spec.pvc_selector.match_labels.get("appname"),
        Some(&"w1".to_string())
    );
    let placement = hub.placement("ns1", workload.placement_name()).await.unwrap();
    assert!(placement.scheduling_disabled());

    // enabling again is idempotent: already-exists is success
    actions
        .enable_protection(&workload, &deployer)
        .await
        .expect("second enable should succeed");

    // failover targets the complement of the preferred cluster
    actions
        .failover(&workload, &deployer)
        .await
        .expect("failover should succeed");

    let failed_over = hub.drpc("ns1", &drpc).await.unwrap();
    assert_eq!(failed_over.spec.failover_cluster, "c2");
    assert_eq!(failed_over.spec.action, Some(DrAction::Failover));
    assert_eq!(failed_over.status.phase, PHASE_FAILED_OVER);

    // relocate returns to the preferred cluster, failover cluster untouched
    actions
        .relocate(&workload, &deployer)
        .await
        .expect("relocate should succeed");

    let relocated = hub.drpc("ns1", &drpc).await.unwrap();
    assert_eq!(relocated.spec.action, Some(DrAction::Relocate));
    assert_eq!(relocated.spec.failover_cluster, "c2");
    assert_eq!(relocated.status.phase, PHASE_RELOCATED);

    // disable removes the DRPC and unpins scheduling
    actions
        .disable_protection(&workload, &deployer)
        .await
        .expect("disable should succeed");

    assert!(hub.drpc("ns1", &drpc).await.is_none());
    let placement = hub.placement("ns1", workload.placement_name()).await.unwrap();
    assert!(!placement.scheduling_disabled());
    assert!(!placement
        .metadata
        .annotations
        .contains_key(OCM_SCHEDULING_DISABLE));

    // disabling again is idempotent: delete of an absent DRPC is success
    actions
        .disable_protection(&workload, &deployer)
        .await
        .expect("second disable should succeed");

    controller.abort();
}

#[tokio::test]
async fn test_unsupported_deployer_rejected() {
    let hub = InMemoryHub::new();
    let ctx = test_context(&hub, test_config(1));
    let workload = Deployment::new("w1", "ns1", "deployments/busybox", &ctx.config);
    let deployer = NoopDeployer { dr_capable: false };
    let actions = DrActions::new(ctx);

    let err = actions
        .enable_protection(&workload, &deployer)
        .await
        .unwrap_err();
    assert!(matches!(err, DrError::UnsupportedDeployer { .. }));

    let err = actions
        .disable_protection(&workload, &deployer)
        .await
        .unwrap_err();
    assert!(matches!(err, DrError::UnsupportedDeployer { .. }));

    // rejected before any hub access
    assert_eq!(hub.drpc_count().await, 0);
}

#[tokio::test]
async fn test_enable_creates_nothing_while_placement_unsatisfied() {
    let hub = InMemoryHub::new();
    let ctx = test_context(&hub, test_config(0));
    let workload = Deployment::new("w1", "ns1", "deployments/busybox", &ctx.config);
    let deployer = NoopDeployer { dr_capable: true };
    let actions = DrActions::new(Arc::clone(&ctx));

    // placement exists but the engine never satisfies it
    hub.insert_placement(Placement {
        metadata: ObjectMeta::namespaced(workload.placement_name(), workload.namespace()),
        ..Default::default()
    })
    .await;

    let err = actions
        .enable_protection(&workload, &deployer)
        .await
        .unwrap_err();
    assert!(matches!(err, DrError::PlacementNotSatisfied { .. }));

    // no DRPC before the cluster is resolved, and scheduling stays live
    assert_eq!(hub.drpc_count().await, 0);
    let placement = hub.placement("ns1", workload.placement_name()).await.unwrap();
    assert!(!placement.scheduling_disabled());
}

#[tokio::test]
async fn test_failover_requires_ready_drpc() {
    let hub = InMemoryHub::new();
    let ctx = test_context(&hub, test_config(0));
    let workload = Deployment::new("w1", "ns1", "deployments/busybox", &ctx.config);
    let deployer = NoopDeployer { dr_capable: true };
    let actions = DrActions::new(Arc::clone(&ctx));
    let drpc = drpc_name(workload.name());

    seed_scheduled_workload(&hub, &workload, "c1").await;

    // a DRPC that exists but never becomes ready: conditions good, no sync
    let mut unsynced = drover::resources::DrPlacementControl {
        metadata: ObjectMeta::namespaced(&drpc, "ns1"),
        ..Default::default()
    };
    unsynced.spec.preferred_cluster = "c1".to_string();
    unsynced.status.conditions = vec![
        Condition::new(CONDITION_AVAILABLE, CONDITION_TRUE),
        Condition::new(CONDITION_PEER_READY, CONDITION_TRUE),
    ];
    hub.create_drpc(&unsynced).await.unwrap();

    let err = actions.failover(&workload, &deployer).await.unwrap_err();
    assert!(matches!(err, DrError::DrpcNotReady { .. }));

    // the failed precondition left the spec untouched
    let current = hub.drpc("ns1", &drpc).await.unwrap();
    assert!(current.spec.action.is_none());
    assert!(current.spec.failover_cluster.is_empty());
}

#[tokio::test]
async fn test_strict_phase_check_propagates() {
    let hub = InMemoryHub::new();
    let mut config = test_config(0);
    config.strict_phase_checks = true;
    let ctx = test_context(&hub, config);
    let workload = Deployment::new("w1", "ns1", "deployments/busybox", &ctx.config);
    let deployer = NoopDeployer { dr_capable: true };
    let actions = DrActions::new(Arc::clone(&ctx));
    let drpc = drpc_name(workload.name());

    seed_scheduled_workload(&hub, &workload, "c1").await;

    // ready but stuck in a phase other than Deployed
    let mut stuck = drover::resources::DrPlacementControl {
        metadata: ObjectMeta::namespaced(&drpc, "ns1"),
        ..Default::default()
    };
    stuck.spec.preferred_cluster = "c1".to_string();
    stuck.status.phase = "FailingOver".to_string();
    stuck.status.conditions = vec![
        Condition::new(CONDITION_AVAILABLE, CONDITION_TRUE),
        Condition::new(CONDITION_PEER_READY, CONDITION_TRUE),
    ];
    stuck.status.last_group_sync_time = Some(chrono::Utc::now());
    hub.create_drpc(&stuck).await.unwrap();

    let err = actions.failover(&workload, &deployer).await.unwrap_err();
    assert!(matches!(err, DrError::PhaseTimeout { .. }));
}
