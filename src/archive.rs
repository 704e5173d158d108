//! Cache-first archive fetching.
//!
//! ```text
//! get_archive_info(pkgkey)
//!        │
//!        ├─ cache hit on {pkgkey}.tar.gz ──► extract under filter
//!        │
//!        └─ miss ─► fetch_info ─► fetch_file ─► cache ─► extract
//!                                  (one in-flight download per key)
//! ```
//!
//! Extraction populates the same cache with each accepted entry's
//! path → buffer, which is what [`ArchiveFetcher::get_asset`] serves from.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::AssetCache;
use crate::client::RegistryClient;
use crate::error::RegistryError;
use crate::extract::{ArchiveEntry, extract_entries};
use crate::paths::parse_path;

/// Suffix reserved for whole-archive cache keys. Parsed asset paths are
/// plain `pkgkey/...` segment paths and never take this form, so archive
/// and asset keys share one namespace without collisions.
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Cache key for a package's raw archive bytes.
pub fn archive_key(pkgkey: &str) -> String {
    format!("{pkgkey}{ARCHIVE_SUFFIX}")
}

/// Resolves, downloads, and extracts package archives with cache-first
/// semantics: a given pkgkey's archive is fetched from the network at most
/// once per process lifetime.
pub struct ArchiveFetcher {
    client: RegistryClient,
    cache: Arc<AssetCache>,
    fetch_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ArchiveFetcher {
    pub fn new(client: RegistryClient, cache: Arc<AssetCache>) -> Self {
        Self {
            client,
            cache,
            fetch_locks: Mutex::new(HashMap::new()),
        }
    }

    /// List every file path in the package's archive, caching each file's
    /// contents under its path as a side effect.
    pub async fn get_archive_info(&self, pkgkey: &str) -> Result<Vec<String>, RegistryError> {
        self.get_archive_info_filtered(pkgkey, |_| true).await
    }

    /// [`get_archive_info`](Self::get_archive_info) restricted to entries
    /// accepted by `filter`. Rejected entries are skipped without
    /// materializing their contents.
    pub async fn get_archive_info_filtered<F>(
        &self,
        pkgkey: &str,
        filter: F,
    ) -> Result<Vec<String>, RegistryError>
    where
        F: Fn(&ArchiveEntry) -> bool,
    {
        let buffer = self.archive_buffer(pkgkey).await?;

        let mut paths = Vec::new();
        extract_entries(&buffer, filter, |entry| {
            let parts = parse_path(&entry.path);
            if parts.file.is_empty() {
                // Directory-like entry: nothing to cache or list.
                return;
            }
            if let Some(contents) = entry.buffer {
                self.cache.insert(entry.path.clone(), contents);
                paths.push(entry.path);
            }
        })?;

        Ok(paths)
    }

    /// Cache-only lookup of a previously extracted asset (or a raw archive
    /// by its `.tar.gz` key). Callers populate the cache with
    /// [`get_archive_info`](Self::get_archive_info) first.
    pub fn get_asset(&self, key: &str) -> Result<Bytes, RegistryError> {
        self.cache
            .get(key)
            .ok_or_else(|| RegistryError::AssetNotFound {
                key: key.to_string(),
            })
    }

    /// The cache backing this fetcher.
    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    async fn archive_buffer(&self, pkgkey: &str) -> Result<Bytes, RegistryError> {
        let key = archive_key(pkgkey);
        if let Some(buffer) = self.cache.get(&key) {
            debug!(%pkgkey, "archive cache hit");
            return Ok(buffer);
        }

        let lock = self.fetch_lock(&key).await;
        let _guard = lock.lock().await;

        // A concurrent caller may have finished the download while we
        // waited on the lock.
        if let Some(buffer) = self.cache.get(&key) {
            debug!(%pkgkey, "archive fetched by concurrent caller");
            return Ok(buffer);
        }

        let info = self.client.fetch_info(pkgkey).await?;
        debug!(%pkgkey, download = %info.download, "downloading archive");

        let buffer = match self.client.fetch_file(&info.download).await {
            Ok(buffer) if !buffer.is_empty() => buffer,
            Ok(_) => {
                return Err(RegistryError::ArchiveUnavailable {
                    key: pkgkey.to_string(),
                    reason: "registry returned an empty archive".to_string(),
                });
            }
            Err(err) => {
                return Err(RegistryError::ArchiveUnavailable {
                    key: pkgkey.to_string(),
                    reason: err.to_string(),
                });
            }
        };

        self.cache.insert(key, buffer.clone());
        Ok(buffer)
    }

    async fn fetch_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.fetch_locks.lock().await;
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
