//! In-process hub used by tests
//!
//! Plays the role the real hub plays in production: an eventually-consistent
//! store that other actors (the simulated DR controller, the test itself)
//! mutate while an engine operation polls it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::hub::api::{ApiError, HubApi};
use crate::resources::{DrPlacementControl, DrPolicy, Placement, PlacementDecision};

type Key = (String, String);

#[derive(Default)]
struct HubState {
    placements: HashMap<Key, Placement>,
    placement_decisions: HashMap<Key, PlacementDecision>,
    drpcs: HashMap<Key, DrPlacementControl>,
    dr_policies: HashMap<String, DrPolicy>,
}

/// In-memory implementation of [`HubApi`].
#[derive(Clone, Default)]
pub struct InMemoryHub {
    state: Arc<Mutex<HubState>>,
}

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

impl InMemoryHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_placement(&self, placement: Placement) {
        let mut state = self.state.lock().await;
        let k = key(&placement.metadata.namespace, &placement.metadata.name);
        state.placements.insert(k, placement);
    }

    pub async fn insert_placement_decision(&self, decision: PlacementDecision) {
        let mut state = self.state.lock().await;
        let k = key(&decision.metadata.namespace, &decision.metadata.name);
        state.placement_decisions.insert(k, decision);
    }

    pub async fn insert_dr_policy(&self, policy: DrPolicy) {
        let mut state = self.state.lock().await;
        state
            .dr_policies
            .insert(policy.metadata.name.clone(), policy);
    }

    /// Mutate a stored placement in place. Returns false if it does not exist.
    pub async fn with_placement_mut<F>(&self, namespace: &str, name: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut Placement),
    {
        let mut state = self.state.lock().await;
        match state.placements.get_mut(&key(namespace, name)) {
            Some(placement) => {
                mutate(placement);
                true
            }
            None => false,
        }
    }

    /// Mutate a stored DRPC in place. Returns false if it does not exist.
    pub async fn with_drpc_mut<F>(&self, namespace: &str, name: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut DrPlacementControl),
    {
        let mut state = self.state.lock().await;
        match state.drpcs.get_mut(&key(namespace, name)) {
            Some(drpc) => {
                mutate(drpc);
                true
            }
            None => false,
        }
    }

    pub async fn placement(&self, namespace: &str, name: &str) -> Option<Placement> {
        let state = self.state.lock().await;
        state.placements.get(&key(namespace, name)).cloned()
    }

    pub async fn drpc(&self, namespace: &str, name: &str) -> Option<DrPlacementControl> {
        let state = self.state.lock().await;
        state.drpcs.get(&key(namespace, name)).cloned()
    }

    pub async fn drpc_count(&self) -> usize {
        let state = self.state.lock().await;
        state.drpcs.len()
    }
}

#[async_trait]
impl HubApi for InMemoryHub {
    async fn get_placement(&self, namespace: &str, name: &str) -> Result<Placement, ApiError> {
        let state = self.state.lock().await;
        state
            .placements
            .get(&key(namespace, name))
            .cloned()
            .ok_or(ApiError::NotFound {
                kind: "placement",
                name: name.to_string(),
            })
    }

    async fn update_placement(&self, placement: &Placement) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        let k = key(&placement.metadata.namespace, &placement.metadata.name);
        if !state.placements.contains_key(&k) {
            return Err(ApiError::NotFound {
                kind: "placement",
                name: placement.metadata.name.clone(),
            });
        }
        // unconditional overwrite, matching the real accessor's semantics
        state.placements.insert(k, placement.clone());
        Ok(())
    }

    async fn get_placement_decision(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<PlacementDecision, ApiError> {
        let state = self.state.lock().await;
        state
            .placement_decisions
            .get(&key(namespace, name))
            .cloned()
            .ok_or(ApiError::NotFound {
                kind: "placementdecision",
                name: name.to_string(),
            })
    }

    async fn get_drpc(&self, namespace: &str, name: &str) -> Result<DrPlacementControl, ApiError> {
        let state = self.state.lock().await;
        state
            .drpcs
            .get(&key(namespace, name))
            .cloned()
            .ok_or(ApiError::NotFound {
                kind: "drplacementcontrol",
                name: name.to_string(),
            })
    }

    async fn create_drpc(&self, drpc: &DrPlacementControl) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        let k = key(&drpc.metadata.namespace, &drpc.metadata.name);
        if state.drpcs.contains_key(&k) {
            return Err(ApiError::AlreadyExists {
                kind: "drplacementcontrol",
                name: drpc.metadata.name.clone(),
            });
        }
        state.drpcs.insert(k, drpc.clone());
        Ok(())
    }

    async fn update_drpc(&self, drpc: &DrPlacementControl) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        let k = key(&drpc.metadata.namespace, &drpc.metadata.name);
        if !state.drpcs.contains_key(&k) {
            return Err(ApiError::NotFound {
                kind: "drplacementcontrol",
                name: drpc.metadata.name.clone(),
            });
        }
        state.drpcs.insert(k, drpc.clone());
        Ok(())
    }

    async fn delete_drpc(&self, namespace: &str, name: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        state
            .drpcs
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or(ApiError::NotFound {
                kind: "drplacementcontrol",
                name: name.to_string(),
            })
    }

    async fn get_dr_policy(&self, name: &str) -> Result<DrPolicy, ApiError> {
        let state = self.state.lock().await;
        state
            .dr_policies
            .get(name)
            .cloned()
            .ok_or(ApiError::NotFound {
                kind: "drpolicy",
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{DrpcSpec, ObjectMeta};

    fn drpc(name: &str, namespace: &str) -> DrPlacementControl {
        DrPlacementControl {
            metadata: ObjectMeta::namespaced(name, namespace),
            spec: DrpcSpec::default(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_drpc_create_get_delete() {
        let hub = InMemoryHub::new();

        let err = hub.get_drpc("ns1", "w1-drpc").await.unwrap_err();
        assert!(err.is_not_found());

        hub.create_drpc(&drpc("w1-drpc", "ns1")).await.unwrap();
        assert_eq!(hub.drpc_count().await, 1);

        let err = hub.create_drpc(&drpc("w1-drpc", "ns1")).await.unwrap_err();
        assert!(err.is_already_exists());

        hub.delete_drpc("ns1", "w1-drpc").await.unwrap();
        let err = hub.delete_drpc("ns1", "w1-drpc").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_with_drpc_mut() {
        let hub = InMemoryHub::new();
        hub.create_drpc(&drpc("w1-drpc", "ns1")).await.unwrap();

        let found = hub
            .with_drpc_mut("ns1", "w1-drpc", |d| {
                d.status.phase = "Deployed".to_string();
            })
            .await;
        assert!(found);
        assert_eq!(hub.drpc("ns1", "w1-drpc").await.unwrap().status.phase, "Deployed");

        assert!(!hub.with_drpc_mut("ns1", "missing", |_| {}).await);
    }
}
