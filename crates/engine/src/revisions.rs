//! Revision history selection: order a workload's history-controllers by
//! rollout generation and pick current/previous.

use pano_core::{
    Deployment, DeploymentConfig, HasMeta, Pod, ReplicaSet, ReplicationController, Uid,
};
use serde::{Deserialize, Serialize};

use crate::owners::owned_by;

/// Revision recorded on a replica set, one per deployment rollout.
pub const DEPLOYMENT_REVISION_ANNOTATION: &str = "deployment.kubernetes.io/revision";
/// Version recorded on a replication controller, one per config rollout.
pub const DEPLOYMENT_CONFIG_VERSION_ANNOTATION: &str =
    "openshift.io/deployment-config.latest-version";
/// Rollout phase recorded on a replication controller by the deployer.
pub const DEPLOYMENT_PHASE_ANNOTATION: &str = "openshift.io/deployment.phase";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RolloutPhase {
    New,
    Pending,
    Running,
    Complete,
    Failed,
    Cancelled,
}

impl RolloutPhase {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "New" => Some(RolloutPhase::New),
            "Pending" => Some(RolloutPhase::Pending),
            "Running" => Some(RolloutPhase::Running),
            "Complete" => Some(RolloutPhase::Complete),
            "Failed" => Some(RolloutPhase::Failed),
            "Cancelled" => Some(RolloutPhase::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RolloutPhase::New => "New",
            RolloutPhase::Pending => "Pending",
            RolloutPhase::Running => "Running",
            RolloutPhase::Complete => "Complete",
            RolloutPhase::Failed => "Failed",
            RolloutPhase::Cancelled => "Cancelled",
        }
    }

    /// A rollout in one of these phases is over and did not land.
    pub fn is_abandoned(&self) -> bool {
        matches!(self, RolloutPhase::Cancelled | RolloutPhase::Failed)
    }
}

pub fn replica_set_revision(rs: &ReplicaSet) -> Option<i64> {
    rs.meta.annotation_i64(DEPLOYMENT_REVISION_ANNOTATION)
}

pub fn replication_controller_version(rc: &ReplicationController) -> Option<i64> {
    rc.meta.annotation_i64(DEPLOYMENT_CONFIG_VERSION_ANNOTATION)
}

pub fn rollout_phase(rc: &ReplicationController) -> Option<RolloutPhase> {
    rc.meta
        .annotation(DEPLOYMENT_PHASE_ANNOTATION)
        .and_then(RolloutPhase::parse)
}

/// Total order over history-controllers: numeric when both revisions are
/// present, a present revision beats an absent one, and two absent
/// revisions fall back to name order. The `descending` flag flips the whole
/// order, name fallback included.
pub fn sort_by_revision<T: HasMeta>(
    mut entries: Vec<&T>,
    revision: impl Fn(&T) -> Option<i64>,
    descending: bool,
) -> Vec<&T> {
    use std::cmp::Ordering;
    entries.sort_by(|l, r| {
        let ord = match (revision(l), revision(r)) {
            (Some(a), Some(b)) => a.cmp(&b),
            // Absent sorts before present in ascending order.
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => l.meta().name.cmp(&r.meta().name),
        };
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
    entries
}

/// One rollout generation: the history-controller's identity, extracted
/// revision, rollout phase (replication-controller path only) and the pods
/// it directly owns.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub uid: Uid,
    pub name: String,
    pub revision: Option<i64>,
    pub phase: Option<RolloutPhase>,
    pub pods: Vec<Pod>,
}

/// Current/previous rollout generations for one workload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RolloutView {
    pub current: Option<HistoryEntry>,
    pub previous: Option<HistoryEntry>,
    pub is_rolling_out: bool,
}

fn replica_set_entry(rs: &ReplicaSet, pods: &[Pod]) -> HistoryEntry {
    HistoryEntry {
        uid: rs.meta.uid,
        name: rs.meta.name.clone(),
        revision: replica_set_revision(rs),
        phase: None,
        pods: owned_by(rs.meta.uid, pods).into_iter().cloned().collect(),
    }
}

fn replication_controller_entry(rc: &ReplicationController, pods: &[Pod]) -> HistoryEntry {
    HistoryEntry {
        uid: rc.meta.uid,
        name: rc.meta.name.clone(),
        revision: replication_controller_version(rc),
        phase: rollout_phase(rc),
        pods: owned_by(rc.meta.uid, pods).into_iter().cloned().collect(),
    }
}

/// Select current/previous replica sets for a deployment. A replica set is
/// active when it still has replicas or carries the deployment's recorded
/// revision. A rollout is in progress whenever two generations are active.
pub fn replica_set_rollout(
    deployment: &Deployment,
    replica_sets: &[ReplicaSet],
    pods: &[Pod],
) -> RolloutView {
    let latest = deployment.meta.annotation_i64(DEPLOYMENT_REVISION_ANNOTATION);
    let active: Vec<&ReplicaSet> = owned_by(deployment.meta.uid, replica_sets)
        .into_iter()
        .filter(|rs| rs.replicas > 0 || replica_set_revision(rs) == latest)
        .collect();
    let mut sorted = sort_by_revision(active, replica_set_revision, true).into_iter();
    let current = sorted.next().map(|rs| replica_set_entry(rs, pods));
    let previous = sorted.next().map(|rs| replica_set_entry(rs, pods));
    let is_rolling_out = current.is_some() && previous.is_some();
    RolloutView { current, previous, is_rolling_out }
}

/// Select current/previous replication controllers for a deployment config.
/// Same shape as the replica set path, except a rollout whose current
/// generation was cancelled or failed no longer counts as in progress.
pub fn replication_controller_rollout(
    config: &DeploymentConfig,
    controllers: &[ReplicationController],
    pods: &[Pod],
) -> RolloutView {
    let active: Vec<&ReplicationController> = owned_by(config.meta.uid, controllers)
        .into_iter()
        .filter(|rc| rc.replicas > 0 || replication_controller_version(rc) == config.latest_version)
        .collect();
    let mut sorted = sort_by_revision(active, replication_controller_version, true).into_iter();
    let current = sorted.next().map(|rc| replication_controller_entry(rc, pods));
    let previous = sorted.next().map(|rc| replication_controller_entry(rc, pods));
    let is_rolling_out = current.is_some()
        && previous.is_some()
        && !current
            .as_ref()
            .and_then(|c| c.phase)
            .map(|p| p.is_abandoned())
            .unwrap_or(false);
    RolloutView { current, previous, is_rolling_out }
}
