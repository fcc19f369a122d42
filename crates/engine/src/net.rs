//! Network links: services bound to a workload's pod template, and routes
//! bound to those services.

use pano_core::{selector_matches, Pairs, Route, Service};

/// Services whose selector matches the workload's pod template labels.
/// A service with an empty selector binds to nothing.
pub fn services_for<'a>(template_labels: &Pairs, services: &'a [Service]) -> Vec<&'a Service> {
    services
        .iter()
        .filter(|s| selector_matches(&s.selector, template_labels))
        .collect()
}

/// Routes targeting any of the given services by name.
pub fn routes_for<'a>(services: &[&Service], routes: &'a [Route]) -> Vec<&'a Route> {
    routes
        .iter()
        .filter(|r| {
            r.to_service
                .as_deref()
                .map(|name| services.iter().any(|s| s.meta.name == name))
                .unwrap_or(false)
        })
        .collect()
}
