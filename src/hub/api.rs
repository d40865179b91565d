use std::fmt;

use async_trait::async_trait;

use crate::resources::{DrPlacementControl, DrPolicy, Placement, PlacementDecision};

/// Errors surfaced by hub accessor operations
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Resource does not exist. Distinguished so callers can implement
    /// idempotent delete semantics.
    NotFound { kind: &'static str, name: String },

    /// Resource already exists. Distinguished so callers can implement
    /// idempotent create semantics.
    AlreadyExists { kind: &'static str, name: String },

    /// Request could not be sent or completed (network, connection).
    Request { reason: String },

    /// Hub answered with a non-success status other than the two above.
    Status { code: u16, reason: String },

    /// Payload could not be encoded or decoded.
    Serialization { reason: String },
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, ApiError::AlreadyExists { .. })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound { kind, name } => {
                write!(f, "{} '{}' not found", kind, name)
            }
            ApiError::AlreadyExists { kind, name } => {
                write!(f, "{} '{}' already exists", kind, name)
            }
            ApiError::Request { reason } => write!(f, "hub request failed: {}", reason),
            ApiError::Status { code, reason } => {
                write!(f, "hub returned status {}: {}", code, reason)
            }
            ApiError::Serialization { reason } => {
                write!(f, "failed to encode/decode payload: {}", reason)
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Typed accessor for the hub resources the DR engine touches.
///
/// Placement and PlacementDecision are namespaced; DRPolicy is cluster-scoped
/// and read-only. Get of a missing object returns `ApiError::NotFound`, create
/// of an existing DRPC returns `ApiError::AlreadyExists`; callers above
/// special-case both.
#[async_trait]
pub trait HubApi: Send + Sync {
    async fn get_placement(&self, namespace: &str, name: &str) -> Result<Placement, ApiError>;

    async fn update_placement(&self, placement: &Placement) -> Result<(), ApiError>;

    async fn get_placement_decision(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<PlacementDecision, ApiError>;

    async fn get_drpc(&self, namespace: &str, name: &str) -> Result<DrPlacementControl, ApiError>;

    async fn create_drpc(&self, drpc: &DrPlacementControl) -> Result<(), ApiError>;

    async fn update_drpc(&self, drpc: &DrPlacementControl) -> Result<(), ApiError>;

    async fn delete_drpc(&self, namespace: &str, name: &str) -> Result<(), ApiError>;

    async fn get_dr_policy(&self, name: &str) -> Result<DrPolicy, ApiError>;
}
