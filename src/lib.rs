//! Package-registry client and archive cache.
//!
//! Given a package key (`name-version`), resolve its metadata from a remote
//! registry, download the release archive once per process, extract entries
//! lazily under a caller-supplied filter, and cache both the raw archive
//! bytes and the extracted file contents in one in-memory store.
//!
//! ```text
//! RegistryClient ── fetch_list / fetch_info / fetch_file / fetch_categories
//!        │                                  (HTTP GET, base URL per call)
//!        ▼
//! ArchiveFetcher ── cache-first {pkgkey}.tar.gz ──► AssetCache
//!        │                                             ▲
//!        └── extract_entries ── filter ── path → buffer┘
//! ```
//!
//! Authentication, registry mirroring, package installation, and UI
//! rendering are out of scope; [`group_by_service`](group::group_by_service)
//! is the hand-off point to a rendering layer.

pub mod archive;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod group;
pub mod model;
pub mod paths;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use archive::{ARCHIVE_SUFFIX, ArchiveFetcher, archive_key};
pub use cache::{AssetCache, CacheConfig};
pub use client::RegistryClient;
pub use config::{ConfigError, ConfigProvider, RegistryConfig, SharedConfig};
pub use error::RegistryError;
pub use extract::{ArchiveEntry, extract_entries};
pub use group::{ASSET_PATH_PREFIX, AssetType, GroupedAssets, group_by_service};
pub use model::{CategorySummary, RegistryPackage, SearchParams};
pub use paths::{AssetParts, parse_path};
pub use transport::{HttpTransport, Transport};
