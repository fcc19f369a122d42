//! Dynamic grouping by label value.

use pano_engine::OverviewItem;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;

/// Bucket for items lacking the grouping label. Contains a space, so it can
/// never collide with a real label value.
pub const EMPTY_GROUP_LABEL: &str = "other resources";

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// `None` only for the single catch-all group produced without a key.
    pub name: Option<String>,
    pub items: Vec<OverviewItem>,
}

/// Union of label keys across all items, first-seen order, no duplicates.
pub fn discover_group_keys(items: &[OverviewItem]) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let mut keys = Vec::new();
    for item in items {
        for (key, _) in item.workload.meta().labels.iter() {
            if seen.insert(key.clone()) {
                keys.push(key.clone());
            }
        }
    }
    keys
}

/// `"app"` when discovered, else the first discovered key, else none.
pub fn default_group_key(keys: &[String]) -> Option<String> {
    if keys.iter().any(|k| k == "app") {
        return Some("app".to_string());
    }
    keys.first().cloned()
}

fn compare_groups(a: &Group, b: &Group) -> Ordering {
    // The sentinel bucket sorts last no matter what.
    if a.name.as_deref() == Some(EMPTY_GROUP_LABEL) {
        return Ordering::Greater;
    }
    if b.name.as_deref() == Some(EMPTY_GROUP_LABEL) {
        return Ordering::Less;
    }
    a.name.cmp(&b.name)
}

/// Partition items by the value of `labels[key]`. No key means a single
/// unnamed group. Items within a bucket keep input order; buckets sort by
/// name with the sentinel last.
pub fn group_items(items: &[OverviewItem], key: Option<&str>) -> Vec<Group> {
    let key = match key {
        Some(k) if !k.is_empty() => k,
        _ => return vec![Group { name: None, items: items.to_vec() }],
    };

    let mut groups: Vec<Group> = Vec::new();
    for item in items {
        let name = item
            .workload
            .meta()
            .label(key)
            .unwrap_or(EMPTY_GROUP_LABEL)
            .to_string();
        match groups.iter_mut().find(|g| g.name.as_deref() == Some(name.as_str())) {
            Some(group) => group.items.push(item.clone()),
            None => groups.push(Group { name: Some(name), items: vec![item.clone()] }),
        }
    }
    groups.sort_by(compare_groups);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use pano_core::{Deployment, Meta, Pairs, Uid, Workload};

    fn uid(n: u8) -> Uid {
        let mut u = [0u8; 16];
        u[0] = n;
        u
    }

    fn item(id: u8, name: &str, labels: &[(&str, &str)]) -> OverviewItem {
        let labels: Pairs =
            labels.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let workload = Workload::Deployment(Deployment {
            meta: Meta {
                uid: uid(id),
                name: name.to_string(),
                labels,
                ..Meta::default()
            },
            ..Deployment::default()
        });
        OverviewItem {
            readiness: workload.readiness(),
            workload,
            current: None,
            previous: None,
            is_rolling_out: false,
            pods: Vec::new(),
            services: Vec::new(),
            routes: Vec::new(),
            alerts: Default::default(),
        }
    }

    #[test]
    fn keys_are_discovered_in_first_seen_order() {
        let items = vec![
            item(1, "a", &[("tier", "web"), ("app", "shop")]),
            item(2, "b", &[("app", "shop"), ("env", "prod")]),
        ];
        assert_eq!(discover_group_keys(&items), vec!["tier", "app", "env"]);
    }

    #[test]
    fn default_key_prefers_app() {
        let keys = vec!["tier".to_string(), "app".to_string()];
        assert_eq!(default_group_key(&keys), Some("app".to_string()));
        let keys = vec!["tier".to_string(), "env".to_string()];
        assert_eq!(default_group_key(&keys), Some("tier".to_string()));
        assert_eq!(default_group_key(&[]), None);
    }

    #[test]
    fn no_key_yields_one_unnamed_group() {
        let items = vec![item(1, "a", &[]), item(2, "b", &[])];
        let groups = group_items(&items, None);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, None);
        assert_eq!(groups[0].items.len(), 2);

        let groups = group_items(&items, Some(""));
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn sentinel_bucket_sorts_last() {
        let items = vec![
            item(1, "a", &[("env", "prod")]),
            item(2, "b", &[]),
            item(3, "c", &[("env", "dev")]),
            item(4, "d", &[]),
        ];
        let groups = group_items(&items, Some("env"));
        let names: Vec<&str> =
            groups.iter().map(|g| g.name.as_deref().unwrap()).collect();
        // Alphabetically "other resources" falls between "dev" and "prod",
        // but the sentinel always goes last.
        assert_eq!(names, vec!["dev", "prod", EMPTY_GROUP_LABEL]);
        assert_eq!(groups[2].items.len(), 2);
    }

    #[test]
    fn items_keep_input_order_within_a_bucket() {
        let items = vec![
            item(1, "z", &[("env", "prod")]),
            item(2, "a", &[("env", "prod")]),
        ];
        let groups = group_items(&items, Some("env"));
        let names: Vec<&str> = groups[0].items.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn unknown_key_buckets_everything_into_the_sentinel() {
        let items = vec![item(1, "a", &[("env", "prod")])];
        let groups = group_items(&items, Some("nope"));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name.as_deref(), Some(EMPTY_GROUP_LABEL));
    }

    #[test]
    fn grouping_is_idempotent_for_unchanged_inputs() {
        let items = vec![
            item(1, "a", &[("env", "prod")]),
            item(2, "b", &[("env", "dev")]),
        ];
        let first = group_items(&items, Some("env"));
        let second = group_items(&items, Some("env"));
        assert_eq!(first, second);
    }
}
