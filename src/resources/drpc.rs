//! DRPlacementControl: desired DR intent and observed phase for one workload

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resources::meta::{Condition, ObjectMeta};

/// DRPC condition type: the workload is available on the current primary.
pub const CONDITION_AVAILABLE: &str = "Available";

/// DRPC condition type: the peer cluster is ready to take over.
pub const CONDITION_PEER_READY: &str = "PeerReady";

/// Terminal phase after initial protection.
pub const PHASE_DEPLOYED: &str = "Deployed";

/// Terminal phase of a failover.
pub const PHASE_FAILED_OVER: &str = "FailedOver";

/// Terminal phase of a relocate.
pub const PHASE_RELOCATED: &str = "Relocated";

/// DRPC name for a workload: `<workload-name>-drpc`.
pub fn drpc_name(workload_name: &str) -> String {
    format!("{}-drpc", workload_name)
}

/// Desired DR intent plus observed status for one protected workload.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DrPlacementControl {
    pub metadata: ObjectMeta,
    pub spec: DrpcSpec,
    pub status: DrpcStatus,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrpcSpec {
    pub preferred_cluster: String,

    /// Set only while a failover is being initiated.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub failover_cluster: String,

    /// Set only when initiating a transition; unset means steady state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<DrAction>,

    pub dr_policy_ref: ObjectRef,
    pub placement_ref: ObjectRef,
    pub pvc_selector: LabelSelector,
}

/// The two transitions a DRPC can be asked to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrAction {
    Failover,
    Relocate,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectRef {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kind: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelSelector {
    pub match_labels: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrpcStatus {
    /// Coarse lifecycle stage (Deployed, FailingOver, FailedOver, ...).
    /// Compared by exact string match.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phase: String,

    pub conditions: Vec<Condition>,

    /// Non-nil only once a consistency-preserving sync checkpoint has been
    /// taken on the current primary. A DRPC without it is never ready.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_group_sync_time: Option<DateTime<Utc>>,
}
