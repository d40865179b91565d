//! Placement resolution and DRPC readiness/phase waits
//!
//! Thin wrappers around the generic poller: each probe re-fetches fresh
//! state from the hub, so a mutation issued before a wait is always observed
//! by it. Accessor errors fail the wait immediately; only "not yet" results
//! are retried.

use std::time::Duration;

use slog::{debug, info, Logger};
use tokio::sync::Mutex;

use crate::dractions::errors::DrError;
use crate::hub::HubApi;
use crate::resources::meta::find_condition;
use crate::resources::{
    DrpcStatus, Placement, CONDITION_AVAILABLE, CONDITION_PEER_READY,
    CONDITION_PLACEMENT_SATISFIED,
};
use crate::retry::{wait_until, WaitError};

/// The DRPC readiness predicate: Available and PeerReady both present and
/// True, and a sync checkpoint taken on the current primary.
///
/// An absent condition counts as not ready, same as an explicitly false one.
/// A DRPC without `lastGroupSyncTime` is never ready even with both
/// conditions true: an unsynced group is not a valid failover source.
pub fn drpc_ready(status: &DrpcStatus) -> bool {
    let available = find_condition(&status.conditions, CONDITION_AVAILABLE)
        .map(|c| c.is_true())
        .unwrap_or(false);
    let peer_ready = find_condition(&status.conditions, CONDITION_PEER_READY)
        .map(|c| c.is_true())
        .unwrap_or(false);

    available && peer_ready && status.last_group_sync_time.is_some()
}

/// Scan a placement for a satisfied decision.
///
/// `Ok(Some(name))` once PlacementSatisfied is True and a decision group
/// names a decision; `Ok(None)` while the placement engine has not scheduled
/// yet (retryable); `Err(MissingDecisionGroup)` when the placement claims to
/// be satisfied but carries no decision.
pub(crate) fn satisfied_decision(placement: &Placement) -> Result<Option<String>, DrError> {
    let satisfied = find_condition(&placement.status.conditions, CONDITION_PLACEMENT_SATISFIED)
        .map(|c| c.is_true())
        .unwrap_or(false);

    if !satisfied {
        return Ok(None);
    }

    match placement
        .status
        .decision_groups
        .first()
        .and_then(|group| group.decisions.first())
    {
        Some(name) if !name.is_empty() => Ok(Some(name.clone())),
        _ => Err(DrError::MissingDecisionGroup {
            placement: placement.metadata.name.clone(),
        }),
    }
}

/// Poll the placement until it is satisfied, then resolve the concrete
/// cluster through its decision.
///
/// Returns the placement as last observed (for the follow-up annotation
/// update), the decision name and the cluster name.
pub(crate) async fn wait_placement_decision(
    hub: &dyn HubApi,
    logger: &Logger,
    timeout: Duration,
    interval: Duration,
    namespace: &str,
    placement_name: &str,
) -> Result<(Placement, String, String), DrError> {
    let resolved: Mutex<Option<(Placement, String)>> = Mutex::new(None);
    let resolved_ref = &resolved;

    let result = wait_until(timeout, interval, || async move {
        let placement = hub
            .get_placement(namespace, placement_name)
            .await
            .map_err(DrError::Api)?;

        match satisfied_decision(&placement)? {
            Some(decision_name) => {
                *resolved_ref.lock().await = Some((placement, decision_name));
                Ok(true)
            }
            None => {
                debug!(logger, "placement not satisfied yet"; "placement" => placement_name);
                Ok(false)
            }
        }
    })
    .await;

    match result {
        Ok(()) => {}
        Err(WaitError::Timeout { waited }) => {
            return Err(DrError::PlacementNotSatisfied {
                placement: placement_name.to_string(),
                waited,
            })
        }
        Err(WaitError::Probe(e)) => return Err(e),
    }

    let (placement, decision_name) =
        resolved
            .into_inner()
            .ok_or_else(|| DrError::MissingDecisionGroup {
                placement: placement_name.to_string(),
            })?;

    info!(logger, "got placement decision"; "decision" => &decision_name);

    let decision = hub
        .get_placement_decision(namespace, &decision_name)
        .await?;

    let cluster = decision
        .status
        .decisions
        .first()
        .map(|d| d.cluster_name.clone())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| DrError::EmptyDecision {
            decision: decision_name.clone(),
        })?;

    Ok((placement, decision_name, cluster))
}

/// Poll the DRPC until the readiness predicate holds.
pub(crate) async fn wait_drpc_ready(
    hub: &dyn HubApi,
    logger: &Logger,
    timeout: Duration,
    interval: Duration,
    namespace: &str,
    name: &str,
) -> Result<(), DrError> {
    let result = wait_until(timeout, interval, || async move {
        let drpc = hub.get_drpc(namespace, name).await.map_err(DrError::Api)?;
        let ready = drpc_ready(&drpc.status);
        if !ready {
            debug!(logger, "drpc not ready yet"; "drpc" => name);
        }
        Ok(ready)
    })
    .await;

    match result {
        Ok(()) => {
            info!(logger, "drpc is ready"; "drpc" => name);
            Ok(())
        }
        Err(WaitError::Timeout { waited }) => Err(DrError::DrpcNotReady {
            drpc: name.to_string(),
            waited,
        }),
        Err(WaitError::Probe(e)) => Err(e),
    }
}

/// Poll the DRPC until its phase matches `phase` exactly.
pub(crate) async fn wait_drpc_phase(
    hub: &dyn HubApi,
    logger: &Logger,
    timeout: Duration,
    interval: Duration,
    namespace: &str,
    name: &str,
    phase: &str,
) -> Result<(), DrError> {
    let result = wait_until(timeout, interval, || async move {
        let drpc = hub.get_drpc(namespace, name).await.map_err(DrError::Api)?;
        if drpc.status.phase == phase {
            return Ok(true);
        }
        debug!(logger, "drpc phase not reached yet";
            "drpc" => name,
            "current" => &drpc.status.phase,
            "expected" => phase,
        );
        Ok(false)
    })
    .await;

    match result {
        Ok(()) => {
            info!(logger, "drpc reached phase"; "drpc" => name, "phase" => phase);
            Ok(())
        }
        Err(WaitError::Timeout { waited }) => Err(DrError::PhaseTimeout {
            drpc: name.to_string(),
            phase: phase.to_string(),
            waited,
        }),
        Err(WaitError::Probe(e)) => Err(e),
    }
}
