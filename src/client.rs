//! Registry HTTP operations.
//!
//! Four read operations against the configured registry base URL, plus the
//! generic JSON-fetch primitive backing them. The base URL comes from the
//! injected [`ConfigProvider`] on every call, so configuration changes apply
//! to the next request.

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::ConfigProvider;
use crate::error::RegistryError;
use crate::model::{CategorySummary, RegistryPackage, SearchParams};
use crate::transport::Transport;

/// Client for the registry's search, package, file, and category endpoints.
#[derive(Clone)]
pub struct RegistryClient {
    transport: Arc<dyn Transport>,
    config: Arc<dyn ConfigProvider>,
}

impl RegistryClient {
    pub fn new(transport: Arc<dyn Transport>, config: Arc<dyn ConfigProvider>) -> Self {
        Self { transport, config }
    }

    fn base_url(&self) -> String {
        self.config.registry_url().trim_end_matches('/').to_string()
    }

    /// Search the registry, optionally narrowed to one category.
    ///
    /// GET `{base}/search[?category=]`.
    pub async fn fetch_list(
        &self,
        params: Option<&SearchParams>,
    ) -> Result<Vec<RegistryPackage>, RegistryError> {
        let raw = format!("{}/search", self.base_url());
        let mut url = Url::parse(&raw).map_err(|source| RegistryError::InvalidUrl {
            url: raw,
            source,
        })?;

        if let Some(category) = params.and_then(|p| p.category.as_deref()) {
            url.query_pairs_mut().append_pair("category", category);
        }

        self.fetch_json(url.as_str()).await
    }

    /// Package metadata by `name-version` key.
    ///
    /// GET `{base}/package/{key}`.
    pub async fn fetch_info(&self, pkgkey: &str) -> Result<RegistryPackage, RegistryError> {
        let url = format!("{}/package/{}", self.base_url(), pkgkey);
        self.fetch_json(&url).await
    }

    /// Raw bytes of an arbitrary registry-relative file, typically the
    /// archive download path from [`fetch_info`](Self::fetch_info).
    ///
    /// GET `{base}{path}`. The body is streamed by the transport and
    /// returned unparsed.
    pub async fn fetch_file(&self, path: &str) -> Result<Bytes, RegistryError> {
        let base = self.base_url();
        let url = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };

        debug!(%url, "fetching registry file");
        self.transport.get(&url).await
    }

    /// Category listing.
    ///
    /// GET `{base}/categories`.
    pub async fn fetch_categories(&self) -> Result<Vec<CategorySummary>, RegistryError> {
        let url = format!("{}/categories", self.base_url());
        self.fetch_json(&url).await
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RegistryError> {
        let body = self.transport.get(url).await?;
        serde_json::from_slice(&body).map_err(|source| RegistryError::ResponseInvalid {
            url: url.to_string(),
            source,
        })
    }
}
