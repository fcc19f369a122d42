//! Item builder: one normalized overview item per top-level workload.

use pano_core::{
    DaemonSet, Deployment, DeploymentConfig, Pod, Readiness, ReplicaSet, ReplicationController,
    Route, Service, StatefulSet, Uid, Workload,
};
use tracing::debug;

use crate::alerts::{combine_pod_alerts, history_rollout_alerts, AlertMap};
use crate::net::{routes_for, services_for};
use crate::owners::owned_by;
use crate::revisions::{replica_set_rollout, replication_controller_rollout, HistoryEntry};

/// Borrowed view over one reconciliation pass's input collections.
#[derive(Debug, Clone, Copy, Default)]
pub struct Collections<'a> {
    pub daemon_sets: &'a [DaemonSet],
    pub deployments: &'a [Deployment],
    pub deployment_configs: &'a [DeploymentConfig],
    pub stateful_sets: &'a [StatefulSet],
    pub pods: &'a [Pod],
    pub replica_sets: &'a [ReplicaSet],
    pub replication_controllers: &'a [ReplicationController],
    pub services: &'a [Service],
    pub routes: &'a [Route],
}

/// Derived entity for one workload: revision history, readiness, owned
/// pods, linked network resources and the merged alert map.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewItem {
    pub workload: Workload,
    pub current: Option<HistoryEntry>,
    pub previous: Option<HistoryEntry>,
    pub is_rolling_out: bool,
    pub readiness: Readiness,
    pub pods: Vec<Pod>,
    pub services: Vec<Service>,
    pub routes: Vec<Route>,
    pub alerts: AlertMap,
}

impl OverviewItem {
    pub fn uid(&self) -> Uid {
        self.workload.meta().uid
    }

    pub fn name(&self) -> &str {
        &self.workload.meta().name
    }
}

/// Build the full item set. Order is preserved relative to the input
/// collections: daemon sets, deployments, deployment configs, stateful
/// sets. Never fails; partial input degrades to zeroed/empty fields.
pub fn build_items(c: &Collections<'_>) -> Vec<OverviewItem> {
    let mut items = Vec::with_capacity(
        c.daemon_sets.len()
            + c.deployments.len()
            + c.deployment_configs.len()
            + c.stateful_sets.len(),
    );
    items.extend(c.daemon_sets.iter().map(|ds| podded_item(Workload::DaemonSet(ds.clone()), c)));
    items.extend(c.deployments.iter().map(|d| deployment_item(d, c)));
    items.extend(c.deployment_configs.iter().map(|dc| deployment_config_item(dc, c)));
    items.extend(c.stateful_sets.iter().map(|ss| podded_item(Workload::StatefulSet(ss.clone()), c)));
    debug!(items = items.len(), "built overview items");
    items
}

fn linked_services(workload: &Workload, c: &Collections<'_>) -> (Vec<Service>, Vec<Route>) {
    let services = services_for(workload.template_labels(), c.services);
    let routes = routes_for(&services, c.routes).into_iter().cloned().collect();
    (services.into_iter().cloned().collect(), routes)
}

/// Item for a kind without revision history: readiness plus alerts scanned
/// off directly-owned pods.
fn podded_item(workload: Workload, c: &Collections<'_>) -> OverviewItem {
    let pods: Vec<Pod> =
        owned_by(workload.meta().uid, c.pods).into_iter().cloned().collect();
    let (services, routes) = linked_services(&workload, c);
    let alerts = combine_pod_alerts(&pods);
    OverviewItem {
        readiness: workload.readiness(),
        workload,
        current: None,
        previous: None,
        is_rolling_out: false,
        pods,
        services,
        routes,
        alerts,
    }
}

fn history_pod_alerts(view_pods: [&Option<HistoryEntry>; 2]) -> AlertMap {
    combine_pod_alerts(
        view_pods
            .into_iter()
            .flat_map(|entry| entry.iter())
            .flat_map(|entry| entry.pods.iter()),
    )
}

fn deployment_item(d: &Deployment, c: &Collections<'_>) -> OverviewItem {
    let view = replica_set_rollout(d, c.replica_sets, c.pods);
    let workload = Workload::Deployment(d.clone());
    let pods: Vec<Pod> = owned_by(d.meta.uid, c.pods).into_iter().cloned().collect();
    let (services, routes) = linked_services(&workload, c);
    let alerts = history_pod_alerts([&view.current, &view.previous]);
    OverviewItem {
        readiness: workload.readiness(),
        workload,
        current: view.current,
        previous: view.previous,
        is_rolling_out: view.is_rolling_out,
        pods,
        services,
        routes,
        alerts,
    }
}

fn deployment_config_item(dc: &DeploymentConfig, c: &Collections<'_>) -> OverviewItem {
    let view = replication_controller_rollout(dc, c.replication_controllers, c.pods);
    let workload = Workload::DeploymentConfig(dc.clone());
    let pods: Vec<Pod> = owned_by(dc.meta.uid, c.pods).into_iter().cloned().collect();
    let (services, routes) = linked_services(&workload, c);
    let mut alerts = history_pod_alerts([&view.current, &view.previous]);
    for entry in view.current.iter().chain(view.previous.iter()) {
        alerts.extend(history_rollout_alerts(entry));
    }
    OverviewItem {
        readiness: workload.readiness(),
        workload,
        current: view.current,
        previous: view.previous,
        is_rolling_out: view.is_rolling_out,
        pods,
        services,
        routes,
        alerts,
    }
}
