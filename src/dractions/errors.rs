use std::fmt;
use std::time::Duration;

use crate::hub::ApiError;

/// Errors produced by the DR action engine
#[derive(Debug)]
pub enum DrError {
    /// The deployer does not declare the DR-control capability.
    UnsupportedDeployer { deployer: String },

    /// The placement engine never reported PlacementSatisfied before the
    /// deadline.
    PlacementNotSatisfied { placement: String, waited: Duration },

    /// A satisfied placement carries no decision group. Internal
    /// inconsistency, not retried.
    MissingDecisionGroup { placement: String },

    /// A placement decision names no cluster.
    EmptyDecision { decision: String },

    /// The DRPolicy does not name exactly two clusters, or the preferred
    /// cluster is not one of them.
    InvalidPolicy { policy: String, reason: String },

    /// The DRPC never reached the readiness predicate before the deadline.
    DrpcNotReady { drpc: String, waited: Duration },

    /// The DRPC never reached the expected phase before the deadline.
    PhaseTimeout {
        drpc: String,
        phase: String,
        waited: Duration,
    },

    /// Accessor failure, propagated unchanged.
    Api(ApiError),
}

impl fmt::Display for DrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrError::UnsupportedDeployer { deployer } => {
                write!(f, "deployer '{}' does not support DR control", deployer)
            }
            DrError::PlacementNotSatisfied { placement, waited } => write!(
                f,
                "placement '{}' not satisfied after {:?}",
                placement, waited
            ),
            DrError::MissingDecisionGroup { placement } => write!(
                f,
                "placement '{}' is satisfied but has no decision group",
                placement
            ),
            DrError::EmptyDecision { decision } => {
                write!(f, "placement decision '{}' names no cluster", decision)
            }
            DrError::InvalidPolicy { policy, reason } => {
                write!(f, "drpolicy '{}' is unusable: {}", policy, reason)
            }
            DrError::DrpcNotReady { drpc, waited } => {
                write!(f, "drpc '{}' not ready after {:?}", drpc, waited)
            }
            DrError::PhaseTimeout { drpc, phase, waited } => write!(
                f,
                "drpc '{}' did not reach phase {} after {:?}",
                drpc, phase, waited
            ),
            DrError::Api(e) => write!(f, "hub access failed: {}", e),
        }
    }
}

impl std::error::Error for DrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DrError::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ApiError> for DrError {
    fn from(e: ApiError) -> Self {
        DrError::Api(e)
    }
}
