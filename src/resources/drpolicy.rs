use serde::{Deserialize, Serialize};

use crate::resources::meta::ObjectMeta;

/// Cluster-scoped policy naming the two managed clusters eligible for DR.
/// Read-only to the engine.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DrPolicy {
    pub metadata: ObjectMeta,
    pub spec: DrPolicySpec,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrPolicySpec {
    /// Ordered pair of managed-cluster names. This code path assumes
    /// exactly two clusters.
    pub dr_clusters: Vec<String>,
}

impl DrPolicy {
    pub fn named(name: &str, clusters: &[&str]) -> Self {
        Self {
            metadata: ObjectMeta {
                name: name.to_string(),
                ..Default::default()
            },
            spec: DrPolicySpec {
                dr_clusters: clusters.iter().map(|c| c.to_string()).collect(),
            },
        }
    }
}
