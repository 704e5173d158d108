//! Configuration for the registry client.
//!
//! The registry base URL is re-read from the [`ConfigProvider`] on every
//! request, so a runtime configuration change takes effect on the next call
//! rather than requiring a restart. [`RegistryConfig`] is the plain value
//! form; [`SharedConfig`] wraps it in a lock for processes that swap
//! configuration while requests are in flight.

use std::sync::RwLock;
use std::time::Duration;

use thiserror::Error;

/// Environment variable holding the registry base URL.
pub const ENV_REGISTRY_URL: &str = "PACKREG_REGISTRY_URL";
/// Environment variable holding the per-request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "PACKREG_TIMEOUT_SECS";
/// Environment variable bounding the asset cache entry count.
pub const ENV_CACHE_MAX_ENTRIES: &str = "PACKREG_CACHE_MAX_ENTRIES";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {key}")]
    Missing { key: String },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Source of the registry base URL, consulted at call time.
pub trait ConfigProvider: Send + Sync {
    /// Registry base URL. Re-read on every request so runtime configuration
    /// changes apply to the next call.
    fn registry_url(&self) -> String;
}

/// Static configuration for the registry client and its caches.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base URL of the registry service, e.g. `https://registry.example.com`.
    pub registry_url: String,
    /// Timeout applied to each outbound request.
    pub request_timeout: Duration,
    /// Optional bound on the number of cached buffers. `None` keeps the
    /// cache unbounded for the process lifetime.
    pub cache_max_entries: Option<usize>,
}

impl RegistryConfig {
    /// Configuration with the default timeout and an unbounded cache.
    pub fn new(registry_url: impl Into<String>) -> Self {
        Self {
            registry_url: registry_url.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_max_entries: None,
        }
    }

    /// Load configuration from `PACKREG_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let registry_url = optional_env(ENV_REGISTRY_URL)?.ok_or_else(|| ConfigError::Missing {
            key: ENV_REGISTRY_URL.to_string(),
        })?;
        let timeout_secs = parse_optional_env(ENV_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS)?;
        let cache_max_entries = optional_env(ENV_CACHE_MAX_ENTRIES)?
            .map(|raw| {
                raw.parse::<usize>().map_err(|e| ConfigError::InvalidValue {
                    key: ENV_CACHE_MAX_ENTRIES.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            registry_url,
            request_timeout: Duration::from_secs(timeout_secs),
            cache_max_entries,
        })
    }
}

impl ConfigProvider for RegistryConfig {
    fn registry_url(&self) -> String {
        self.registry_url.clone()
    }
}

/// Configuration that can be replaced at runtime. Requests issued after a
/// [`replace`](SharedConfig::replace) see the new registry URL.
pub struct SharedConfig {
    inner: RwLock<RegistryConfig>,
}

impl SharedConfig {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            inner: RwLock::new(config),
        }
    }

    /// Swap in a new configuration.
    pub fn replace(&self, config: RegistryConfig) {
        *self.inner.write().expect("config lock poisoned") = config;
    }

    /// Copy of the current configuration.
    pub fn snapshot(&self) -> RegistryConfig {
        self.inner.read().expect("config lock poisoned").clone()
    }
}

impl ConfigProvider for SharedConfig {
    fn registry_url(&self) -> String {
        self.inner
            .read()
            .expect("config lock poisoned")
            .registry_url
            .clone()
    }
}

fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(val) if val.is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}

fn parse_optional_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)?
        .map(|s| {
            s.parse().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{e}"),
            })
        })
        .transpose()
        .map(|opt| opt.unwrap_or(default))
}

/// Crate-wide mutex for tests that mutate process environment variables.
///
/// The process environment is global state shared across all threads, so
/// every `unsafe { set_var / remove_var }` call in tests must hold this
/// single lock.
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_env() {
        unsafe {
            std::env::remove_var(ENV_REGISTRY_URL);
            std::env::remove_var(ENV_TIMEOUT_SECS);
            std::env::remove_var(ENV_CACHE_MAX_ENTRIES);
        }
    }

    #[test]
    fn from_env_requires_registry_url() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();

        let err = RegistryConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing { ref key } if key == ENV_REGISTRY_URL));
    }

    #[test]
    fn from_env_reads_all_values() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var(ENV_REGISTRY_URL, "http://reg.local:8080");
            std::env::set_var(ENV_TIMEOUT_SECS, "5");
            std::env::set_var(ENV_CACHE_MAX_ENTRIES, "128");
        }

        let config = RegistryConfig::from_env().unwrap();
        assert_eq!(config.registry_url, "http://reg.local:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.cache_max_entries, Some(128));

        clear_env();
    }

    #[test]
    fn from_env_rejects_garbage_timeout() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var(ENV_REGISTRY_URL, "http://reg.local");
            std::env::set_var(ENV_TIMEOUT_SECS, "soon");
        }

        let err = RegistryConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ENV_TIMEOUT_SECS));

        clear_env();
    }

    #[test]
    fn shared_config_replace_takes_effect() {
        let shared = SharedConfig::new(RegistryConfig::new("http://old.local"));
        assert_eq!(shared.registry_url(), "http://old.local");

        shared.replace(RegistryConfig::new("http://new.local"));
        assert_eq!(shared.registry_url(), "http://new.local");
    }

    #[test]
    fn defaults_are_unbounded_with_30s_timeout() {
        let config = RegistryConfig::new("http://reg.local");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.cache_max_entries.is_none());
    }
}
