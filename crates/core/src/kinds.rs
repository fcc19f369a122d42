//! Concrete resource kinds consumed by the overview engine.
//!
//! Top-level workloads are a tagged union so the item builder stays generic;
//! dependents (pods, history-controllers, services, routes) are plain
//! structs. Every numeric status field defaults to 0 and every nested
//! collection to empty, so partially-loaded payloads decode cleanly.

use serde::{Deserialize, Serialize};

use crate::{HasMeta, Meta, Pairs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkloadKind {
    DaemonSet,
    Deployment,
    DeploymentConfig,
    StatefulSet,
}

impl WorkloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::DaemonSet => "DaemonSet",
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::DeploymentConfig => "DeploymentConfig",
            WorkloadKind::StatefulSet => "StatefulSet",
        }
    }
}

/// `{desired, ready}` replica counts. Non-negative by construction; missing
/// status fields land here as 0.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Readiness {
    pub desired: u32,
    pub ready: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Deployment {
    pub meta: Meta,
    /// spec.replicas
    #[serde(default)]
    pub replicas: u32,
    /// status.replicas
    #[serde(default)]
    pub status_replicas: u32,
    /// Labels on the pod template, matched by service selectors.
    #[serde(default)]
    pub template_labels: Pairs,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeploymentConfig {
    pub meta: Meta,
    #[serde(default)]
    pub replicas: u32,
    #[serde(default)]
    pub status_replicas: u32,
    /// status.latestVersion: the most recent rollout generation recorded on
    /// the config itself.
    #[serde(default)]
    pub latest_version: Option<i64>,
    #[serde(default)]
    pub template_labels: Pairs,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DaemonSet {
    pub meta: Meta,
    /// status.desiredNumberScheduled
    #[serde(default)]
    pub desired_scheduled: u32,
    /// status.currentNumberScheduled
    #[serde(default)]
    pub current_scheduled: u32,
    #[serde(default)]
    pub template_labels: Pairs,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatefulSet {
    pub meta: Meta,
    #[serde(default)]
    pub replicas: u32,
    #[serde(default)]
    pub status_replicas: u32,
    #[serde(default)]
    pub template_labels: Pairs,
}

/// Top-level workload, tagged by kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum Workload {
    DaemonSet(DaemonSet),
    Deployment(Deployment),
    DeploymentConfig(DeploymentConfig),
    StatefulSet(StatefulSet),
}

impl Workload {
    pub fn kind(&self) -> WorkloadKind {
        match self {
            Workload::DaemonSet(_) => WorkloadKind::DaemonSet,
            Workload::Deployment(_) => WorkloadKind::Deployment,
            Workload::DeploymentConfig(_) => WorkloadKind::DeploymentConfig,
            Workload::StatefulSet(_) => WorkloadKind::StatefulSet,
        }
    }

    pub fn meta(&self) -> &Meta {
        match self {
            Workload::DaemonSet(w) => &w.meta,
            Workload::Deployment(w) => &w.meta,
            Workload::DeploymentConfig(w) => &w.meta,
            Workload::StatefulSet(w) => &w.meta,
        }
    }

    pub fn template_labels(&self) -> &Pairs {
        match self {
            Workload::DaemonSet(w) => &w.template_labels,
            Workload::Deployment(w) => &w.template_labels,
            Workload::DeploymentConfig(w) => &w.template_labels,
            Workload::StatefulSet(w) => &w.template_labels,
        }
    }

    /// Kind-specific readiness extraction. Daemon sets count scheduled
    /// nodes; everything else counts replicas.
    pub fn readiness(&self) -> Readiness {
        match self {
            Workload::DaemonSet(w) => Readiness {
                desired: w.desired_scheduled,
                ready: w.current_scheduled,
            },
            Workload::Deployment(w) => Readiness { desired: w.replicas, ready: w.status_replicas },
            Workload::DeploymentConfig(w) => {
                Readiness { desired: w.replicas, ready: w.status_replicas }
            }
            Workload::StatefulSet(w) => {
                Readiness { desired: w.replicas, ready: w.status_replicas }
            }
        }
    }
}

impl HasMeta for Workload {
    fn meta(&self) -> &Meta {
        match self {
            Workload::DaemonSet(w) => &w.meta,
            Workload::Deployment(w) => &w.meta,
            Workload::DeploymentConfig(w) => &w.meta,
            Workload::StatefulSet(w) => &w.meta,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContainerStatus {
    pub name: String,
    /// state.waiting.reason, when the container is waiting.
    #[serde(default)]
    pub waiting_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PodCondition {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PodStatus {
    #[serde(default)]
    pub init_container_statuses: Vec<ContainerStatus>,
    #[serde(default)]
    pub container_statuses: Vec<ContainerStatus>,
    #[serde(default)]
    pub conditions: Vec<PodCondition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Pod {
    pub meta: Meta,
    #[serde(default)]
    pub status: PodStatus,
}

/// History-controller for deployments: one replica set per rollout
/// generation. The revision lives in an annotation on `meta`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReplicaSet {
    pub meta: Meta,
    /// status.replicas
    #[serde(default)]
    pub replicas: u32,
}

/// History-controller for deployment configs. Version and rollout phase
/// live in annotations on `meta`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReplicationController {
    pub meta: Meta,
    #[serde(default)]
    pub replicas: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub meta: Meta,
    #[serde(default)]
    pub selector: Pairs,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Route {
    pub meta: Meta,
    /// spec.to.name: the service this route sends traffic to.
    #[serde(default)]
    pub to_service: Option<String>,
}

macro_rules! impl_has_meta {
    ($($ty:ty),+ $(,)?) => {
        $(impl HasMeta for $ty {
            fn meta(&self) -> &Meta { &self.meta }
        })+
    };
}

impl_has_meta!(
    Deployment,
    DeploymentConfig,
    DaemonSet,
    StatefulSet,
    Pod,
    ReplicaSet,
    ReplicationController,
    Service,
    Route,
);
