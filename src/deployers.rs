//! Deployment mechanisms
//!
//! The engine dispatches on a declared capability rather than downcasting to
//! a concrete deployer kind: only deployers that answer true to
//! `supports_dr_control` may be used with the DR actions.

use std::sync::Arc;

use async_trait::async_trait;
use slog::{info, o, Logger};

use crate::context::Context;
use crate::util::{run_command, CommandError};
use crate::workloads::Workload;

#[async_trait]
pub trait Deployer: Send + Sync {
    fn name(&self) -> &str;

    /// Capability check: whether workloads deployed this way can be placed
    /// under DR control. The engine rejects deployers lacking it.
    fn supports_dr_control(&self) -> bool;

    async fn deploy(&self, workload: &dyn Workload) -> Result<(), CommandError>;

    async fn undeploy(&self, workload: &dyn Workload) -> Result<(), CommandError>;
}

/// Subscription-style deployer: applies the workload's kustomize bundle to
/// the hub, where the subscription machinery propagates it to the scheduled
/// managed cluster.
pub struct Subscription {
    ctx: Arc<Context>,
    logger: Logger,
}

impl Subscription {
    pub fn new(ctx: Arc<Context>) -> Self {
        let logger = ctx.log.new(o!("deployer" => "subscription"));
        Self { ctx, logger }
    }
}

#[async_trait]
impl Deployer for Subscription {
    fn name(&self) -> &str {
        "subscription"
    }

    fn supports_dr_control(&self) -> bool {
        true
    }

    async fn deploy(&self, workload: &dyn Workload) -> Result<(), CommandError> {
        let url = workload.resource_url();
        info!(self.logger, "deploying workload"; "workload" => workload.name(), "url" => &url);

        let kubeconfig = format!("--kubeconfig={}", self.ctx.config.hub.kubeconfig);
        run_command("kubectl", &["apply", "-k", &url, &kubeconfig], &self.logger).await?;
        Ok(())
    }

    async fn undeploy(&self, workload: &dyn Workload) -> Result<(), CommandError> {
        let url = workload.resource_url();
        info!(self.logger, "undeploying workload"; "workload" => workload.name(), "url" => &url);

        let kubeconfig = format!("--kubeconfig={}", self.ctx.config.hub.kubeconfig);
        run_command("kubectl", &["delete", "-k", &url, &kubeconfig], &self.logger).await?;
        Ok(())
    }
}
