//! Test suites and the concurrent suite runner
//!
//! One suite drives one workload/deployer pair through a full DR lifecycle.
//! Suites share no workload-scoped state and run simultaneously, each on its
//! own task; a failed step halts that suite's remaining steps and is recorded
//! without affecting the others.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use slog::{error, info, o, Logger};

use crate::context::Context;
use crate::deployers::Deployer;
use crate::dractions::{DrActions, DrError};
use crate::workloads::Deployment;

/// A suite failure, recorded against the step that produced it.
#[derive(Debug)]
pub struct SuiteError {
    pub suite: String,
    pub step: String,
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl fmt::Display for SuiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "suite '{}' failed at step '{}': {}",
            self.suite, self.step, self.source
        )
    }
}

impl std::error::Error for SuiteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[async_trait]
pub trait TestSuite: Send + Sync {
    fn name(&self) -> &str;

    /// Run all steps in order, stopping at the first failure.
    async fn run(&self) -> Result<(), SuiteError>;
}

/// Run one named step, wrapping its failure with the suite and step names.
async fn step<T, E>(
    logger: &Logger,
    suite: &str,
    name: &str,
    fut: impl Future<Output = Result<T, E>> + Send,
) -> Result<T, SuiteError>
where
    E: std::error::Error + Send + Sync + 'static,
{
    info!(logger, "running step"; "step" => name);
    fut.await.map_err(|e| SuiteError {
        suite: suite.to_string(),
        step: name.to_string(),
        source: Box::new(e),
    })
}

/// Environment sanity checks run before anything mutates the hub: the hub
/// answers, and the configured DRPolicy exists and names exactly the two
/// configured managed clusters. Catches a misconfigured environment with a
/// pointed error instead of a mid-lifecycle timeout.
pub struct PrecheckSuite {
    ctx: Arc<Context>,
    logger: Logger,
}

impl PrecheckSuite {
    pub const NAME: &'static str = "precheck";

    pub fn new(ctx: Arc<Context>) -> Self {
        let logger = ctx.log.new(o!("suite" => Self::NAME));
        Self { ctx, logger }
    }

    async fn check_dr_policy(&self) -> Result<(), DrError> {
        let config = &self.ctx.config;
        let policy = self.ctx.hub.get_dr_policy(&config.dr_policy).await?;

        if policy.spec.dr_clusters.len() != 2 {
            return Err(DrError::InvalidPolicy {
                policy: policy.metadata.name.clone(),
                reason: format!(
                    "expected 2 clusters, found {}",
                    policy.spec.dr_clusters.len()
                ),
            });
        }
        for cluster in &config.clusters {
            if !policy.spec.dr_clusters.iter().any(|c| c == cluster) {
                return Err(DrError::InvalidPolicy {
                    policy: policy.metadata.name.clone(),
                    reason: format!("configured cluster '{}' is not in the policy", cluster),
                });
            }
        }

        info!(self.logger, "dr policy is usable"; "policy" => &policy.metadata.name);
        Ok(())
    }
}

#[async_trait]
impl TestSuite for PrecheckSuite {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self) -> Result<(), SuiteError> {
        step(&self.logger, Self::NAME, "dr-policy", self.check_dr_policy()).await?;
        Ok(())
    }
}

/// deploy -> enable -> failover -> relocate -> disable -> undeploy for one
/// workload through an injected deployer.
pub struct BasicSuite {
    workload: Deployment,
    deployer: Arc<dyn Deployer>,
    actions: DrActions,
    logger: Logger,
}

impl BasicSuite {
    pub const NAME: &'static str = "basic";

    pub fn new(ctx: Arc<Context>, deployer: Arc<dyn Deployer>) -> Self {
        let workload = Deployment::new("w1", "ns1", "deployments/busybox", &ctx.config);
        let actions = DrActions::new(Arc::clone(&ctx));
        let logger = ctx.log.new(o!("suite" => Self::NAME));

        Self {
            workload,
            deployer,
            actions,
            logger,
        }
    }
}

#[async_trait]
impl TestSuite for BasicSuite {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self) -> Result<(), SuiteError> {
        let log = &self.logger;
        let deployer = self.deployer.as_ref();

        step(log, Self::NAME, "deploy", deployer.deploy(&self.workload)).await?;
        step(
            log,
            Self::NAME,
            "enable",
            self.actions.enable_protection(&self.workload, deployer),
        )
        .await?;
        step(
            log,
            Self::NAME,
            "failover",
            self.actions.failover(&self.workload, deployer),
        )
        .await?;
        step(
            log,
            Self::NAME,
            "relocate",
            self.actions.relocate(&self.workload, deployer),
        )
        .await?;
        step(
            log,
            Self::NAME,
            "disable",
            self.actions.disable_protection(&self.workload, deployer),
        )
        .await?;
        step(log, Self::NAME, "undeploy", deployer.undeploy(&self.workload)).await?;
        Ok(())
    }
}

/// Run every suite on its own task and collect the failures.
///
/// One suite failing does not cancel the others; all suites run to their own
/// conclusion.
pub async fn run_suites(logger: &Logger, suites: Vec<Arc<dyn TestSuite>>) -> Vec<SuiteError> {
    let mut handles = Vec::with_capacity(suites.len());

    for suite in suites {
        let logger = logger.clone();
        let name = suite.name().to_string();
        let handle = tokio::spawn(async move {
            info!(logger, "suite starting"; "suite" => suite.name().to_string());
            let result = suite.run().await;
            match &result {
                Ok(()) => info!(logger, "suite passed"; "suite" => suite.name().to_string()),
                Err(e) => error!(logger, "suite failed";
                    "suite" => suite.name().to_string(),
                    "step" => e.step.clone(),
                    "error" => e.to_string()),
            }
            result
        });
        handles.push((name, handle));
    }

    let mut failures = Vec::new();
    for (name, handle) in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => failures.push(e),
            Err(join_error) => failures.push(SuiteError {
                suite: name,
                step: "task".to_string(),
                source: Box::new(join_error),
            }),
        }
    }
    failures
}
