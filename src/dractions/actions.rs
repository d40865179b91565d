use std::sync::Arc;

use slog::{info, o, warn, Logger};

use crate::context::Context;
use crate::deployers::Deployer;
use crate::dractions::errors::DrError;
use crate::dractions::retry::{wait_drpc_phase, wait_drpc_ready, wait_placement_decision};
use crate::resources::{
    drpc_name, DrAction, DrPlacementControl, DrPolicy, DrpcSpec, LabelSelector, ObjectMeta,
    ObjectRef, PHASE_DEPLOYED, PHASE_FAILED_OVER, PHASE_RELOCATED,
};
use crate::workloads::Workload;

/// The DR action engine: one instance per context, safe to share across
/// suites. Each operation fully owns its workload's DRPC for its duration;
/// concurrent calls against the same DRPC are not coordinated here.
pub struct DrActions {
    ctx: Arc<Context>,
    logger: Logger,
}

impl DrActions {
    pub fn new(ctx: Arc<Context>) -> Self {
        let logger = ctx.log.new(o!("component" => "dractions"));
        Self { ctx, logger }
    }

    fn ensure_dr_capable(&self, deployer: &dyn Deployer) -> Result<(), DrError> {
        if deployer.supports_dr_control() {
            Ok(())
        } else {
            Err(DrError::UnsupportedDeployer {
                deployer: deployer.name().to_string(),
            })
        }
    }

    /// Protect a workload: resolve its current cluster, pin scheduling, and
    /// create the DRPC encoding the protection intent.
    ///
    /// No rollback on failure: a DRPC created before a later step fails is
    /// left in place for inspection.
    pub async fn enable_protection(
        &self,
        workload: &dyn Workload,
        deployer: &dyn Deployer,
    ) -> Result<(), DrError> {
        self.ensure_dr_capable(deployer)?;

        let namespace = workload.namespace();
        let placement_name = workload.placement_name();
        let drpc = drpc_name(workload.name());
        let hub = self.ctx.hub.as_ref();
        let timeout = self.ctx.config.timeout();
        let interval = self.ctx.config.interval();

        info!(self.logger, "enabling protection";
            "workload" => workload.name(), "placement" => placement_name);

        // Resolve the decision while scheduling is still live. Disabling
        // scheduling first can leave the placement unsatisfied forever.
        let (mut placement, _, cluster) = wait_placement_decision(
            hub,
            &self.logger,
            timeout,
            interval,
            namespace,
            placement_name,
        )
        .await?;

        info!(self.logger, "workload is scheduled"; "cluster" => &cluster);

        placement.disable_scheduling();
        hub.update_placement(&placement).await?;
        info!(self.logger, "disabled placement scheduling"; "placement" => placement_name);

        let desired = self.build_drpc(workload, &cluster);
        match hub.create_drpc(&desired).await {
            Ok(()) => info!(self.logger, "created drpc"; "drpc" => &drpc),
            Err(e) if e.is_already_exists() => {
                info!(self.logger, "drpc already exists"; "drpc" => &drpc)
            }
            Err(e) => return Err(DrError::Api(e)),
        }

        wait_drpc_ready(hub, &self.logger, timeout, interval, namespace, &drpc).await
    }

    /// Unprotect a workload: delete its DRPC and let the placement engine
    /// schedule again. Deletion is fire-and-forget; there is no readiness
    /// wait afterwards.
    pub async fn disable_protection(
        &self,
        workload: &dyn Workload,
        deployer: &dyn Deployer,
    ) -> Result<(), DrError> {
        self.ensure_dr_capable(deployer)?;

        let namespace = workload.namespace();
        let placement_name = workload.placement_name();
        let drpc = drpc_name(workload.name());
        let hub = self.ctx.hub.as_ref();

        info!(self.logger, "disabling protection"; "workload" => workload.name());

        match hub.delete_drpc(namespace, &drpc).await {
            Ok(()) => info!(self.logger, "deleted drpc"; "drpc" => &drpc),
            Err(e) if e.is_not_found() => {
                info!(self.logger, "drpc already absent"; "drpc" => &drpc)
            }
            Err(e) => return Err(DrError::Api(e)),
        }

        let mut placement = hub.get_placement(namespace, placement_name).await?;
        placement.enable_scheduling();
        hub.update_placement(&placement).await?;
        info!(self.logger, "re-enabled placement scheduling"; "placement" => placement_name);

        Ok(())
    }

    /// Fail the workload over to the peer of its preferred cluster.
    pub async fn failover(
        &self,
        workload: &dyn Workload,
        deployer: &dyn Deployer,
    ) -> Result<(), DrError> {
        self.ensure_dr_capable(deployer)?;

        let namespace = workload.namespace();
        let drpc = drpc_name(workload.name());
        let hub = self.ctx.hub.as_ref();
        let timeout = self.ctx.config.timeout();
        let interval = self.ctx.config.interval();

        info!(self.logger, "starting failover"; "workload" => workload.name());

        wait_drpc_ready(hub, &self.logger, timeout, interval, namespace, &drpc).await?;
        self.phase_precheck(namespace, &drpc, PHASE_DEPLOYED).await?;

        let mut desired = hub.get_drpc(namespace, &drpc).await?;
        let policy = hub.get_dr_policy(&self.ctx.config.dr_policy).await?;
        let failover_cluster = complement_cluster(&policy, &desired.spec.preferred_cluster)?;

        info!(self.logger, "failing over";
            "preferred" => &desired.spec.preferred_cluster,
            "failover" => &failover_cluster);

        desired.spec.action = Some(DrAction::Failover);
        desired.spec.failover_cluster = failover_cluster;
        hub.update_drpc(&desired).await?;

        wait_drpc_phase(
            hub,
            &self.logger,
            timeout,
            interval,
            namespace,
            &drpc,
            PHASE_FAILED_OVER,
        )
        .await?;
        wait_drpc_ready(hub, &self.logger, timeout, interval, namespace, &drpc).await
    }

    /// Move the workload back to its preferred cluster.
    ///
    /// The DRPC's failover cluster is left untouched; relocate implicitly
    /// targets `preferredCluster`.
    pub async fn relocate(
        &self,
        workload: &dyn Workload,
        deployer: &dyn Deployer,
    ) -> Result<(), DrError> {
        self.ensure_dr_capable(deployer)?;

        let namespace = workload.namespace();
        let drpc = drpc_name(workload.name());
        let hub = self.ctx.hub.as_ref();
        let timeout = self.ctx.config.timeout();
        let interval = self.ctx.config.interval();

        info!(self.logger, "starting relocate"; "workload" => workload.name());

        wait_drpc_ready(hub, &self.logger, timeout, interval, namespace, &drpc).await?;
        self.phase_precheck(namespace, &drpc, PHASE_FAILED_OVER).await?;

        let mut desired = hub.get_drpc(namespace, &drpc).await?;
        desired.spec.action = Some(DrAction::Relocate);
        hub.update_drpc(&desired).await?;

        wait_drpc_phase(
            hub,
            &self.logger,
            timeout,
            interval,
            namespace,
            &drpc,
            PHASE_RELOCATED,
        )
        .await?;
        wait_drpc_ready(hub, &self.logger, timeout, interval, namespace, &drpc).await
    }

    /// Best-effort phase sanity check before issuing a transition.
    ///
    /// A failure here is logged and swallowed unless `strict_phase_checks`
    /// is configured, preserving the historical tolerance for the phase to
    /// lag while conditions are already good.
    async fn phase_precheck(
        &self,
        namespace: &str,
        drpc: &str,
        phase: &str,
    ) -> Result<(), DrError> {
        let result = wait_drpc_phase(
            self.ctx.hub.as_ref(),
            &self.logger,
            self.ctx.config.timeout(),
            self.ctx.config.interval(),
            namespace,
            drpc,
            phase,
        )
        .await;

        match result {
            Ok(()) => Ok(()),
            Err(e) if self.ctx.config.strict_phase_checks => Err(e),
            Err(e) => {
                warn!(self.logger, "phase pre-check failed, continuing";
                    "drpc" => drpc, "expected" => phase, "error" => %e);
                Ok(())
            }
        }
    }

    fn build_drpc(&self, workload: &dyn Workload, cluster: &str) -> DrPlacementControl {
        let mut metadata = ObjectMeta::namespaced(&drpc_name(workload.name()), workload.namespace());
        metadata
            .labels
            .insert("app".to_string(), workload.name().to_string());

        DrPlacementControl {
            metadata,
            spec: DrpcSpec {
                preferred_cluster: cluster.to_string(),
                dr_policy_ref: ObjectRef {
                    name: self.ctx.config.dr_policy.clone(),
                    ..Default::default()
                },
                placement_ref: ObjectRef {
                    kind: "placement".to_string(),
                    name: workload.placement_name().to_string(),
                },
                pvc_selector: LabelSelector {
                    match_labels: [("appname".to_string(), workload.pvc_label().to_string())]
                        .into_iter()
                        .collect(),
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// The other of the two policy clusters relative to `preferred`.
///
/// A binary complement, not a general N-cluster selection: the DRPolicy
/// always names exactly two clusters in this code path.
fn complement_cluster(policy: &DrPolicy, preferred: &str) -> Result<String, DrError> {
    let clusters = &policy.spec.dr_clusters;
    if clusters.len() != 2 {
        return Err(DrError::InvalidPolicy {
            policy: policy.metadata.name.clone(),
            reason: format!("expected 2 clusters, found {}", clusters.len()),
        });
    }
    if !clusters.iter().any(|c| c == preferred) {
        return Err(DrError::InvalidPolicy {
            policy: policy.metadata.name.clone(),
            reason: format!("preferred cluster '{}' is not in the policy", preferred),
        });
    }

    if preferred == clusters[0] {
        Ok(clusters[1].clone())
    } else {
        Ok(clusters[0].clone())
    }
}
