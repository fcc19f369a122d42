//! Pano core types: the resource model the overview engine joins over.
//!
//! Everything here is a decoded, immutable snapshot. Collections arrive from
//! an external fetch collaborator; this crate never talks to a cluster.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub mod kinds;

pub use kinds::{
    ContainerStatus, DaemonSet, Deployment, DeploymentConfig, Pod, PodCondition, PodStatus,
    Readiness, ReplicaSet, ReplicationController, Route, Service, StatefulSet, Workload,
    WorkloadKind,
};

pub type Uid = [u8; 16];

/// Inline key/value storage for labels, annotations and selectors.
pub type Pairs = SmallVec<[(String, String); 8]>;

/// Reference from a dependent resource to the controller managing it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnerRef {
    pub uid: Uid,
    #[serde(default)]
    pub controller: bool,
}

/// Shared metadata head carried by every resource kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Meta {
    #[serde(default)]
    pub uid: Uid,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub labels: Pairs,
    #[serde(default)]
    pub annotations: Pairs,
    #[serde(default)]
    pub owner_refs: SmallVec<[OwnerRef; 2]>,
}

impl Meta {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parse an integer annotation. Absent or unparseable values fold to
    /// `None` so revision ordering can treat them as "no revision".
    pub fn annotation_i64(&self, key: &str) -> Option<i64> {
        self.annotation(key).and_then(|v| v.trim().parse::<i64>().ok())
    }

    /// Uid of the first owner reference, used to collapse per-pod signals
    /// onto their shared controller.
    pub fn owner_uid(&self) -> Option<Uid> {
        self.owner_refs.first().map(|r| r.uid)
    }
}

/// Access to the metadata head, implemented by every concrete kind.
pub trait HasMeta {
    fn meta(&self) -> &Meta;
}

/// Load failure reported by the upstream fetch collaborator. The engine
/// never acts on it beyond the loaded guard; hosts render it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct LoadError {
    pub message: String,
}

/// One kind's snapshot: items plus load-completion state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collection<T> {
    #[serde(default)]
    pub items: Vec<T>,
    #[serde(default)]
    pub loaded: bool,
    #[serde(default)]
    pub load_error: Option<LoadError>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new(), loaded: false, load_error: None }
    }
}

impl<T> Collection<T> {
    pub fn loaded(items: Vec<T>) -> Self {
        Self { items, loaded: true, load_error: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            loaded: false,
            load_error: Some(LoadError { message: message.into() }),
        }
    }
}

/// Label-selector matching: every selector pair must be present among
/// `labels`. An empty selector matches nothing here; a service without a
/// selector must not bind to every workload in the namespace.
pub fn selector_matches(selector: &Pairs, labels: &Pairs) -> bool {
    if selector.is_empty() {
        return false;
    }
    selector
        .iter()
        .all(|(k, v)| labels.iter().any(|(lk, lv)| lk == k && lv == v))
}

pub mod prelude {
    pub use super::kinds::{
        DaemonSet, Deployment, DeploymentConfig, Pod, ReplicaSet, ReplicationController, Route,
        Service, StatefulSet, Workload, WorkloadKind,
    };
    pub use super::kinds::Readiness;
    pub use super::{Collection, HasMeta, Meta, OwnerRef, Pairs, Uid};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(kv: &[(&str, &str)]) -> Pairs {
        kv.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn empty_selector_matches_nothing() {
        let labels = pairs(&[("app", "web")]);
        assert!(!selector_matches(&Pairs::new(), &labels));
    }

    #[test]
    fn selector_requires_every_pair() {
        let labels = pairs(&[("app", "web"), ("tier", "frontend")]);
        assert!(selector_matches(&pairs(&[("app", "web")]), &labels));
        assert!(selector_matches(
            &pairs(&[("app", "web"), ("tier", "frontend")]),
            &labels
        ));
        assert!(!selector_matches(&pairs(&[("app", "api")]), &labels));
        assert!(!selector_matches(
            &pairs(&[("app", "web"), ("env", "prod")]),
            &labels
        ));
    }

    #[test]
    fn annotation_i64_folds_garbage_to_none() {
        let mut meta = Meta::default();
        meta.annotations = pairs(&[("rev", "7"), ("junk", "seven"), ("pad", " 3 ")]);
        assert_eq!(meta.annotation_i64("rev"), Some(7));
        assert_eq!(meta.annotation_i64("junk"), None);
        assert_eq!(meta.annotation_i64("pad"), Some(3));
        assert_eq!(meta.annotation_i64("absent"), None);
    }

    #[test]
    fn partial_json_decodes_with_defaults() {
        // Status subtrees are routinely missing on freshly-created objects.
        let pod: Pod = serde_json::from_value(serde_json::json!({
            "meta": { "name": "web-1" }
        }))
        .unwrap();
        assert_eq!(pod.meta.name, "web-1");
        assert!(pod.status.container_statuses.is_empty());
        assert!(pod.status.conditions.is_empty());

        let d: Deployment = serde_json::from_value(serde_json::json!({
            "meta": { "name": "web" },
            "replicas": 3
        }))
        .unwrap();
        assert_eq!(d.replicas, 3);
        assert_eq!(d.status_replicas, 0);
    }
}
