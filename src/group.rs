//! Grouping of extracted asset paths for UI consumption.

use std::collections::BTreeMap;

use tracing::debug;

use crate::paths::{AssetParts, parse_path};

/// Fixed prefix carried by registry file paths handed to the grouper,
/// stripped before parsing.
pub const ASSET_PATH_PREFIX: &str = "/package/";

/// Asset types the target platform knows how to render. Paths with any
/// other type segment are silently dropped from grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetType {
    Dashboard,
    Visualization,
    Search,
    IndexPattern,
    Map,
}

impl AssetType {
    /// Path segment spelling of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Dashboard => "dashboard",
            AssetType::Visualization => "visualization",
            AssetType::Search => "search",
            AssetType::IndexPattern => "index-pattern",
            AssetType::Map => "map",
        }
    }

    /// Recognize a path's type segment, if it belongs to the taxonomy.
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "dashboard" => Some(AssetType::Dashboard),
            "visualization" => Some(AssetType::Visualization),
            "search" => Some(AssetType::Search),
            "index-pattern" => Some(AssetType::IndexPattern),
            "map" => Some(AssetType::Map),
            _ => None,
        }
    }
}

/// Service name → asset type → assets, in deterministic (sorted) map order.
/// The asset lists preserve the input order of the call.
pub type GroupedAssets = BTreeMap<String, BTreeMap<AssetType, Vec<AssetParts>>>;

/// Group paths by service and recognized asset type.
///
/// Paths are supplied fresh on every call; there is no cross-call ordering
/// state.
pub fn group_by_service<'a, I>(paths: I) -> GroupedAssets
where
    I: IntoIterator<Item = &'a str>,
{
    let mut grouped = GroupedAssets::new();

    for raw in paths {
        let relative = raw.strip_prefix(ASSET_PATH_PREFIX).unwrap_or(raw);
        let parts = parse_path(relative);

        let Some(asset_type) = AssetType::from_path_segment(&parts.asset_type) else {
            debug!(path = raw, "dropping path with unrecognized asset type");
            continue;
        };

        grouped
            .entry(parts.service.clone())
            .or_default()
            .entry(asset_type)
            .or_default()
            .push(parts);
    }

    grouped
}
