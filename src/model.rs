//! Wire models for registry responses.

use serde::Deserialize;

/// Package metadata as returned by the registry's search and package
/// endpoints. Unknown fields are ignored; optional surface defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryPackage {
    pub name: String,
    pub version: String,
    /// Registry-relative path of the package archive, e.g.
    /// `/epr/system/system-1.2.0.tar.gz`.
    pub download: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl RegistryPackage {
    /// Composite `name-version` key identifying this release.
    pub fn key(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

/// One entry of the registry's category listing.
#[derive(Debug, Clone, Deserialize)]
pub struct CategorySummary {
    pub id: String,
    pub title: String,
    pub count: u64,
}

/// Optional filters for [`fetch_list`](crate::client::RegistryClient::fetch_list).
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub category: Option<String>,
}
