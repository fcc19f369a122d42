//! Pano interactive views over built overview items: fuzzy filtering and
//! dynamic label grouping. Both are pure functions of the item set plus
//! view parameters; they never touch the raw collections.

#![forbid(unsafe_code)]

pub mod filter;
pub mod group;

pub use filter::filter_items;
pub use group::{default_group_key, discover_group_keys, group_items, Group, EMPTY_GROUP_LABEL};
