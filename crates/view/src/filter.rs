//! Selection-aware fuzzy name filter.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use pano_core::Uid;
use pano_engine::OverviewItem;

/// Keep items whose workload name contains `text` as a case-insensitive
/// subsequence. The item matching `selected` is always retained so an
/// active selection never silently disappears from view. Empty text is the
/// identity.
pub fn filter_items(
    items: &[OverviewItem],
    text: &str,
    selected: Option<Uid>,
) -> Vec<OverviewItem> {
    if text.is_empty() {
        return items.to_vec();
    }
    let needle = text.to_lowercase();
    let matcher = SkimMatcherV2::default();
    items
        .iter()
        .filter(|item| {
            matcher.fuzzy_match(item.name(), &needle).is_some() || selected == Some(item.uid())
        })
        .cloned()
        .collect()
}
