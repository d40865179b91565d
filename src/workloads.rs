//! Workload abstraction
//!
//! A workload is one application lifecycle: a name, a namespace, the label
//! its PVCs carry and the placement the generic engine created for it. The
//! engine never touches workload internals; it only needs these identities.

use crate::config::Config;

pub trait Workload: Send + Sync {
    fn name(&self) -> &str;

    fn namespace(&self) -> &str;

    /// Value of the `appname` label on the workload's PVCs.
    fn pvc_label(&self) -> &str;

    fn placement_name(&self) -> &str;

    /// Kustomize bundle location the deployer applies and deletes.
    fn resource_url(&self) -> String;
}

/// A simple deployment-style workload sourced from the configured channel.
pub struct Deployment {
    name: String,
    namespace: String,
    pvc_label: String,
    placement_name: String,
    repo: String,
    branch: String,
    path: String,
}

impl Deployment {
    pub fn new(name: &str, namespace: &str, path: &str, config: &Config) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            pvc_label: name.to_string(),
            placement_name: format!("{}-placement", name),
            repo: config.channel.repo.clone(),
            branch: config.channel.branch.clone(),
            path: path.to_string(),
        }
    }
}

impl Workload for Deployment {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn pvc_label(&self) -> &str {
        &self.pvc_label
    }

    fn placement_name(&self) -> &str {
        &self.placement_name
    }

    fn resource_url(&self) -> String {
        format!("{}/{}?ref={}", self.repo, self.path, self.branch)
    }
}
