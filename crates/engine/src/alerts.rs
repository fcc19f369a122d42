//! Alert aggregation: failure signals scanned off pods and rollout
//! signals off replication controllers, deduplicated by cause.

use pano_core::{Pod, ReplicationController, Uid};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::revisions::{
    replication_controller_version, rollout_phase, HistoryEntry, RolloutPhase,
};

pub const CRASH_LOOP_BACK_OFF: &str = "CrashLoopBackOff";
pub const POD_SCHEDULED: &str = "PodScheduled";
pub const UNSCHEDULABLE: &str = "Unschedulable";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: Severity,
    pub message: String,
}

/// Deduplication key for one alert cause. `owner` is the reporting pod's
/// controller uid when it has one, so every pod behind the same controller
/// collapses into a single alert per cause; `container` scopes container
/// signals and stays `None` for pod-level conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub reason: String,
    pub owner: Uid,
    pub container: Option<String>,
}

pub type AlertMap = FxHashMap<AlertKey, Alert>;

fn pod_owner(pod: &Pod) -> Uid {
    pod.meta.owner_uid().unwrap_or(pod.meta.uid)
}

/// Scan one pod for failure signals.
pub fn pod_alerts(pod: &Pod) -> AlertMap {
    let mut alerts = AlertMap::default();
    let owner = pod_owner(pod);

    let statuses = pod
        .status
        .init_container_statuses
        .iter()
        .chain(pod.status.container_statuses.iter());
    for status in statuses {
        if status.waiting_reason.as_deref() == Some(CRASH_LOOP_BACK_OFF) {
            alerts.insert(
                AlertKey {
                    reason: CRASH_LOOP_BACK_OFF.to_string(),
                    owner,
                    container: Some(status.name.clone()),
                },
                Alert {
                    severity: Severity::Error,
                    message: format!("Container {} is crash-looping.", status.name),
                },
            );
        }
    }

    for condition in &pod.status.conditions {
        if condition.kind == POD_SCHEDULED
            && condition.status == "False"
            && condition.reason.as_deref() == Some(UNSCHEDULABLE)
        {
            let message = condition.message.as_deref().unwrap_or("");
            alerts.insert(
                // Keyed by owner + reason only: the condition is pod-wide,
                // not scoped to any container.
                AlertKey { reason: UNSCHEDULABLE.to_string(), owner, container: None },
                Alert {
                    severity: Severity::Error,
                    message: format!("{}: {}", UNSCHEDULABLE, message),
                },
            );
        }
    }

    alerts
}

/// Merge alerts from a set of pods; keys collide exactly when the cause is
/// the same, so last write wins is fine.
pub fn combine_pod_alerts<'a>(pods: impl IntoIterator<Item = &'a Pod>) -> AlertMap {
    let mut combined = AlertMap::default();
    for pod in pods {
        combined.extend(pod_alerts(pod));
    }
    combined
}

/// Rollout-level alerts for a replication controller. Label the rollout by
/// `#<version>` when the version annotation parses, else by name.
pub fn rollout_alerts(rc: &ReplicationController) -> AlertMap {
    rollout_alerts_inner(
        rc.meta.uid,
        &rc.meta.name,
        replication_controller_version(rc),
        rollout_phase(rc),
    )
}

/// Same signals, read off an already-selected history entry.
pub fn history_rollout_alerts(entry: &HistoryEntry) -> AlertMap {
    rollout_alerts_inner(entry.uid, &entry.name, entry.revision, entry.phase)
}

fn rollout_alerts_inner(
    owner: Uid,
    name: &str,
    version: Option<i64>,
    phase: Option<RolloutPhase>,
) -> AlertMap {
    let mut alerts = AlertMap::default();
    let phase = match phase {
        Some(p) => p,
        None => return alerts,
    };
    let label = match version {
        Some(v) => format!("#{}", v),
        None => name.to_string(),
    };
    let key = AlertKey {
        reason: format!("Rollout{}", phase.as_str()),
        owner,
        container: None,
    };
    match phase {
        RolloutPhase::Cancelled => {
            alerts.insert(
                key,
                Alert {
                    severity: Severity::Info,
                    message: format!("Rollout {} was cancelled.", label),
                },
            );
        }
        RolloutPhase::Failed => {
            alerts.insert(
                key,
                Alert { severity: Severity::Error, message: format!("Rollout {} failed.", label) },
            );
        }
        _ => {}
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revisions::{
        DEPLOYMENT_CONFIG_VERSION_ANNOTATION, DEPLOYMENT_PHASE_ANNOTATION,
    };
    use pano_core::{ContainerStatus, Meta, OwnerRef, PodCondition};

    fn uid(n: u8) -> Uid {
        let mut u = [0u8; 16];
        u[0] = n;
        u
    }

    fn crash_pod(id: u8, owner: Option<u8>, container: &str) -> Pod {
        let mut pod = Pod::default();
        pod.meta.uid = uid(id);
        if let Some(o) = owner {
            pod.meta.owner_refs.push(OwnerRef { uid: uid(o), controller: true });
        }
        pod.status.container_statuses.push(ContainerStatus {
            name: container.to_string(),
            waiting_reason: Some(CRASH_LOOP_BACK_OFF.to_string()),
        });
        pod
    }

    #[test]
    fn crash_loop_produces_error_alert() {
        let pod = crash_pod(1, Some(9), "app");
        let alerts = pod_alerts(&pod);
        assert_eq!(alerts.len(), 1);
        let (key, alert) = alerts.iter().next().unwrap();
        assert_eq!(key.reason, CRASH_LOOP_BACK_OFF);
        assert_eq!(key.owner, uid(9));
        assert_eq!(key.container.as_deref(), Some("app"));
        assert_eq!(alert.severity, Severity::Error);
        assert_eq!(alert.message, "Container app is crash-looping.");
    }

    #[test]
    fn pods_sharing_an_owner_collapse_to_one_alert() {
        let pods = vec![crash_pod(1, Some(9), "app"), crash_pod(2, Some(9), "app")];
        let alerts = combine_pod_alerts(&pods);
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn distinct_containers_keep_distinct_alerts() {
        let pods = vec![crash_pod(1, Some(9), "app"), crash_pod(2, Some(9), "sidecar")];
        let alerts = combine_pod_alerts(&pods);
        assert_eq!(alerts.len(), 2);
    }

    #[test]
    fn ownerless_pods_fall_back_to_their_own_uid() {
        let pods = vec![crash_pod(1, None, "app"), crash_pod(2, None, "app")];
        let alerts = combine_pod_alerts(&pods);
        assert_eq!(alerts.len(), 2);
    }

    #[test]
    fn init_container_crash_loops_are_reported() {
        let mut pod = Pod::default();
        pod.meta.uid = uid(1);
        pod.status.init_container_statuses.push(ContainerStatus {
            name: "setup".to_string(),
            waiting_reason: Some(CRASH_LOOP_BACK_OFF.to_string()),
        });
        assert_eq!(pod_alerts(&pod).len(), 1);
    }

    #[test]
    fn unschedulable_condition_uses_its_message() {
        let mut pod = Pod::default();
        pod.meta.uid = uid(1);
        pod.meta.owner_refs.push(OwnerRef { uid: uid(9), controller: true });
        pod.status.conditions.push(PodCondition {
            kind: POD_SCHEDULED.to_string(),
            status: "False".to_string(),
            reason: Some(UNSCHEDULABLE.to_string()),
            message: Some("0/3 nodes are available".to_string()),
        });
        let alerts = pod_alerts(&pod);
        assert_eq!(alerts.len(), 1);
        let (key, alert) = alerts.iter().next().unwrap();
        assert_eq!(key.reason, UNSCHEDULABLE);
        assert_eq!(key.owner, uid(9));
        assert_eq!(key.container, None);
        assert_eq!(alert.message, "Unschedulable: 0/3 nodes are available");
    }

    #[test]
    fn scheduled_pods_raise_no_condition_alert() {
        let mut pod = Pod::default();
        pod.status.conditions.push(PodCondition {
            kind: POD_SCHEDULED.to_string(),
            status: "True".to_string(),
            reason: None,
            message: None,
        });
        assert!(pod_alerts(&pod).is_empty());
    }

    fn rc_with(version: Option<i64>, phase: &str) -> ReplicationController {
        let mut meta = Meta { uid: uid(5), name: "api-2".to_string(), ..Meta::default() };
        if let Some(v) = version {
            meta.annotations
                .push((DEPLOYMENT_CONFIG_VERSION_ANNOTATION.to_string(), v.to_string()));
        }
        meta.annotations.push((DEPLOYMENT_PHASE_ANNOTATION.to_string(), phase.to_string()));
        ReplicationController { meta, replicas: 0 }
    }

    #[test]
    fn cancelled_rollout_is_an_info_alert_labeled_by_version() {
        let alerts = rollout_alerts(&rc_with(Some(2), "Cancelled"));
        assert_eq!(alerts.len(), 1);
        let (key, alert) = alerts.iter().next().unwrap();
        assert_eq!(key.reason, "RolloutCancelled");
        assert_eq!(alert.severity, Severity::Info);
        assert_eq!(alert.message, "Rollout #2 was cancelled.");
    }

    #[test]
    fn failed_rollout_without_version_is_labeled_by_name() {
        let alerts = rollout_alerts(&rc_with(None, "Failed"));
        let alert = alerts.values().next().unwrap();
        assert_eq!(alert.severity, Severity::Error);
        assert_eq!(alert.message, "Rollout api-2 failed.");
    }

    #[test]
    fn quiet_phases_raise_nothing() {
        assert!(rollout_alerts(&rc_with(Some(2), "Running")).is_empty());
        assert!(rollout_alerts(&rc_with(Some(2), "Complete")).is_empty());
    }
}
