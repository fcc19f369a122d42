//! Pano public facade: the overview engine a hosting shell drives.
//!
//! Hosts feed discrete events in (a new input snapshot, a filter edit, a
//! group-key change) and read derived state back out. The scheduler picks
//! the cheapest recompute tier for each event: full rebuild when raw
//! collections change, filter-only when just the text changed, group-only
//! when just the key changed. Everything runs synchronously on the caller.

#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pano_core::{
    Collection, DaemonSet, Deployment, DeploymentConfig, LoadError, Pod, ReplicaSet,
    ReplicationController, Route, Service, StatefulSet, Uid,
};
use pano_engine::{build_items, Collections, OverviewItem};
use pano_view::{default_group_key, discover_group_keys, filter_items, group_items, Group};

/// One pass's raw input bundle: namespace scope plus every per-kind
/// collection snapshot. Deep-compared by the scheduler to detect change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverviewInputs {
    pub namespace: String,
    pub daemon_sets: Collection<DaemonSet>,
    pub deployments: Collection<Deployment>,
    pub deployment_configs: Collection<DeploymentConfig>,
    pub stateful_sets: Collection<StatefulSet>,
    pub pods: Collection<Pod>,
    pub replica_sets: Collection<ReplicaSet>,
    pub replication_controllers: Collection<ReplicationController>,
    pub services: Collection<Service>,
    pub routes: Collection<Route>,
}

impl OverviewInputs {
    /// True once every required collection has finished loading. Rebuilds
    /// are suppressed until then.
    pub fn loaded(&self) -> bool {
        self.daemon_sets.loaded
            && self.deployments.loaded
            && self.deployment_configs.loaded
            && self.stateful_sets.loaded
            && self.pods.loaded
            && self.replica_sets.loaded
            && self.replication_controllers.loaded
            && self.services.loaded
            && self.routes.loaded
    }

    /// First reported load failure, for hosts that render an error state.
    pub fn load_error(&self) -> Option<&LoadError> {
        [
            self.daemon_sets.load_error.as_ref(),
            self.deployments.load_error.as_ref(),
            self.deployment_configs.load_error.as_ref(),
            self.stateful_sets.load_error.as_ref(),
            self.pods.load_error.as_ref(),
            self.replica_sets.load_error.as_ref(),
            self.replication_controllers.load_error.as_ref(),
            self.services.load_error.as_ref(),
            self.routes.load_error.as_ref(),
        ]
        .into_iter()
        .flatten()
        .next()
    }

    fn collections(&self) -> Collections<'_> {
        Collections {
            daemon_sets: &self.daemon_sets.items,
            deployments: &self.deployments.items,
            deployment_configs: &self.deployment_configs.items,
            stateful_sets: &self.stateful_sets.items,
            pods: &self.pods.items,
            replica_sets: &self.replica_sets.items,
            replication_controllers: &self.replication_controllers.items,
            services: &self.services.items,
            routes: &self.routes.items,
        }
    }
}

/// Which recompute tier an event actually executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recompute {
    None,
    Group,
    Filter,
    Full,
}

/// Observer for the full, unfiltered item set. A detail side-panel host
/// keeps one of these keyed by uid so lookups work independent of the
/// current filter and grouping.
pub trait SelectionSink {
    fn publish(&mut self, items: &[OverviewItem]);
}

/// Discards every publish.
pub struct NullSink;

impl SelectionSink for NullSink {
    fn publish(&mut self, _items: &[OverviewItem]) {}
}

/// Uid-keyed store over the last published item set. Clone handles share
/// the same map, so a host can keep one and hand the other to `Overview`.
#[derive(Clone, Default)]
pub struct MapSink {
    inner: Rc<RefCell<FxHashMap<Uid, OverviewItem>>>,
}

impl MapSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, uid: Uid) -> Option<OverviewItem> {
        self.inner.borrow().get(&uid).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl SelectionSink for MapSink {
    fn publish(&mut self, items: &[OverviewItem]) {
        let mut map = self.inner.borrow_mut();
        map.clear();
        for item in items {
            map.insert(item.uid(), item.clone());
        }
    }
}

/// The overview engine instance. Owns the current inputs, the view
/// parameters and every derived set; all state transitions go through the
/// event methods below.
pub struct Overview {
    inputs: OverviewInputs,
    filter_text: String,
    selected: Option<Uid>,
    group_key: Option<String>,
    group_key_options: Vec<String>,
    items: Vec<OverviewItem>,
    filtered: Vec<OverviewItem>,
    groups: Vec<Group>,
    sink: Box<dyn SelectionSink>,
}

impl Overview {
    pub fn new() -> Self {
        Self::with_sink(Box::new(NullSink))
    }

    pub fn with_sink(sink: Box<dyn SelectionSink>) -> Self {
        Self {
            inputs: OverviewInputs::default(),
            filter_text: String::new(),
            selected: None,
            group_key: None,
            group_key_options: Vec::new(),
            items: Vec::new(),
            filtered: Vec::new(),
            groups: Vec::new(),
            sink,
        }
    }

    // ---- events ----

    /// A new input snapshot arrived. Any difference against the held bundle
    /// schedules a full rebuild; rebuilds wait until every collection has
    /// loaded.
    pub fn apply_inputs(&mut self, next: OverviewInputs) -> Recompute {
        if next == self.inputs {
            return Recompute::None;
        }
        self.inputs = next;
        if !self.inputs.loaded() {
            debug!(namespace = %self.inputs.namespace, "inputs changed before load completed; rebuild deferred");
            return Recompute::None;
        }
        self.full_rebuild();
        Recompute::Full
    }

    /// Filter text changed: re-filter the held item set, then re-group.
    /// The build pipeline is not re-run.
    pub fn set_filter(&mut self, text: &str) -> Recompute {
        if text == self.filter_text {
            return Recompute::None;
        }
        self.filter_text = text.to_string();
        self.refilter();
        metrics::counter!("overview_recomputes_total", 1u64, "tier" => "filter");
        Recompute::Filter
    }

    /// Selected group key changed: re-group the held filtered set. An
    /// unknown key is not an error; everything lands in the sentinel
    /// bucket.
    pub fn set_group_key(&mut self, key: Option<&str>) -> Recompute {
        let key = key.filter(|k| !k.is_empty()).map(|k| k.to_string());
        if key == self.group_key {
            return Recompute::None;
        }
        self.group_key = key;
        self.groups = group_items(&self.filtered, self.group_key.as_deref());
        metrics::counter!("overview_recomputes_total", 1u64, "tier" => "group");
        Recompute::Group
    }

    /// Selection changed. The uid is a filter input (a selected item is
    /// always retained), so this runs the filter tier.
    pub fn set_selected(&mut self, uid: Option<Uid>) -> Recompute {
        if uid == self.selected {
            return Recompute::None;
        }
        self.selected = uid;
        self.refilter();
        metrics::counter!("overview_recomputes_total", 1u64, "tier" => "filter");
        Recompute::Filter
    }

    // ---- derived state ----

    /// Full unfiltered, ungrouped item set from the last rebuild.
    pub fn items(&self) -> &[OverviewItem] {
        &self.items
    }

    /// Item set after the name filter.
    pub fn filtered(&self) -> &[OverviewItem] {
        &self.filtered
    }

    /// Ordered groups for rendering.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Discovered label keys, for a group-by selector control.
    pub fn group_key_options(&self) -> &[String] {
        &self.group_key_options
    }

    pub fn group_key(&self) -> Option<&str> {
        self.group_key.as_deref()
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn selected(&self) -> Option<Uid> {
        self.selected
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        self.inputs.load_error()
    }

    // ---- tiers ----

    fn full_rebuild(&mut self) {
        let started = Instant::now();
        self.items = build_items(&self.inputs.collections());
        self.sink.publish(&self.items);

        let options = discover_group_keys(&self.items);
        if options != self.group_key_options {
            self.group_key_options = options;
            self.group_key = default_group_key(&self.group_key_options);
            info!(key = ?self.group_key, "group-by options changed; default key re-selected");
        }

        self.refilter();
        metrics::counter!("overview_recomputes_total", 1u64, "tier" => "full");
        metrics::gauge!("overview_items", self.items.len() as f64);
        metrics::histogram!("overview_rebuild_ms", started.elapsed().as_secs_f64() * 1_000.0);
    }

    fn refilter(&mut self) {
        self.filtered = filter_items(&self.items, &self.filter_text, self.selected);
        self.groups = group_items(&self.filtered, self.group_key.as_deref());
    }
}

impl Default for Overview {
    fn default() -> Self {
        Self::new()
    }
}
