//! Typed views of the hub resources the engine reads and mutates
//!
//! These structs mirror the wire shapes of the four resource kinds the DR
//! engine touches: Placement, PlacementDecision, DRPlacementControl and
//! DRPolicy. Only the fields the engine actually consumes are modeled.

pub mod drpc;
pub mod drpolicy;
pub mod meta;
pub mod placement;

pub use drpc::{
    drpc_name, DrAction, DrPlacementControl, DrpcSpec, DrpcStatus, LabelSelector, ObjectRef,
    CONDITION_AVAILABLE, CONDITION_PEER_READY, PHASE_DEPLOYED, PHASE_FAILED_OVER, PHASE_RELOCATED,
};
pub use drpolicy::{DrPolicy, DrPolicySpec};
pub use meta::{Condition, ObjectMeta, CONDITION_FALSE, CONDITION_TRUE};
pub use placement::{
    ClusterDecision, DecisionGroup, Placement, PlacementDecision, PlacementDecisionStatus,
    PlacementStatus, CONDITION_PLACEMENT_SATISFIED, OCM_SCHEDULING_DISABLE,
};
