use serde::{Deserialize, Serialize};

use crate::resources::meta::{Condition, ObjectMeta};

/// Condition type set by the placement engine once it has scheduled the
/// workload to a concrete cluster.
pub const CONDITION_PLACEMENT_SATISFIED: &str = "PlacementSatisfied";

/// Annotation that stops the placement engine from re-scheduling a workload
/// while the DR controller owns its placement.
pub const OCM_SCHEDULING_DISABLE: &str =
    "cluster.open-cluster-management.io/experimental-scheduling-disable";

/// Upstream placement-engine resource naming which cluster hosts a workload.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    pub metadata: ObjectMeta,
    pub status: PlacementStatus,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlacementStatus {
    pub conditions: Vec<Condition>,
    pub decision_groups: Vec<DecisionGroup>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionGroup {
    /// Names of PlacementDecision objects in this group.
    pub decisions: Vec<String>,
}

impl Placement {
    /// True iff the scheduling-disable annotation is present.
    pub fn scheduling_disabled(&self) -> bool {
        self.metadata.annotations.contains_key(OCM_SCHEDULING_DISABLE)
    }

    pub fn disable_scheduling(&mut self) {
        self.metadata
            .annotations
            .insert(OCM_SCHEDULING_DISABLE.to_string(), "true".to_string());
    }

    pub fn enable_scheduling(&mut self) {
        self.metadata.annotations.remove(OCM_SCHEDULING_DISABLE);
    }
}

/// Names the concrete cluster currently hosting the workload.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementDecision {
    pub metadata: ObjectMeta,
    pub status: PlacementDecisionStatus,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementDecisionStatus {
    pub decisions: Vec<ClusterDecision>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterDecision {
    pub cluster_name: String,
}
