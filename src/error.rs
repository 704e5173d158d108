//! Error type for registry and archive operations.

use thiserror::Error;

/// Errors surfaced by registry requests, archive fetching, and extraction.
///
/// Every variant carries enough context (key, URL, decode stage) for the
/// caller to log or retry. Nothing is retried or swallowed inside this
/// crate; failures propagate to the immediate caller.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Network failure or non-2xx response from the registry.
    #[error("registry request failed for {url}: {reason}")]
    RegistryUnavailable { url: String, reason: String },

    /// The registry answered, but the body was not the JSON we expected.
    #[error("invalid registry response from {url}: {source}")]
    ResponseInvalid {
        url: String,
        source: serde_json::Error,
    },

    #[error("invalid registry URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    /// No archive bytes could be obtained for a package key.
    #[error("no archive available for package '{key}': {reason}")]
    ArchiveUnavailable { key: String, reason: String },

    /// Cache miss on a direct asset lookup. The archive holding the asset
    /// has to be fetched (via `get_archive_info`) before the asset can be
    /// served from the cache.
    #[error("asset '{key}' is not cached; fetch its archive first")]
    AssetNotFound { key: String },

    /// Corrupt gzip or tar structure.
    #[error("archive decode failed while {stage}: {source}")]
    Decode {
        stage: String,
        source: std::io::Error,
    },
}

impl RegistryError {
    pub(crate) fn unavailable(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RegistryUnavailable {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(stage: impl Into<String>, source: std::io::Error) -> Self {
        Self::Decode {
            stage: stage.into(),
            source,
        }
    }
}
