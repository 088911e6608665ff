//! Memcached launch configuration
//!
//! Provides the configuration value object, its defaults, a builder and
//! loaders for environment variables and JSON files.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use shared::SharedError;

use crate::error::{LauncherError, LauncherResult};

pub const DEFAULT_PATH: &str = "memcached";
pub const DEFAULT_PORT: u16 = 11211;
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_NUM_THREADS: u32 = 4;
pub const DEFAULT_MAX_MEMORY_MB: u32 = 4096;
pub const DEFAULT_NUM_CONNECTIONS: u32 = 2048;
pub const DEFAULT_LISTEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Environment variables read by [`MemcachedConfig::from_env`]
pub mod env_keys {
    pub const PATH: &str = "MEMCACHED_PATH";
    pub const PORT: &str = "MEMCACHED_PORT";
    pub const USER: &str = "MEMCACHED_USER";
    pub const THREADS: &str = "MEMCACHED_THREADS";
    pub const THREADS_AFFINITY: &str = "MEMCACHED_THREADS_AFFINITY";
    pub const CONNECTIONS: &str = "MEMCACHED_CONNECTIONS";
    pub const MAX_MEMORY: &str = "MEMCACHED_MAX_MEMORY";
    pub const LISTEN_TIMEOUT_MS: &str = "MEMCACHED_LISTEN_TIMEOUT_MS";
}

/// Parameters of a single memcached launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemcachedConfig {
    pub path_to_binary: String,
    pub port: u16,
    pub user: String,
    pub num_threads: u32,
    pub max_memory_mb: u32,
    pub num_connections: u32,
    pub threads_affinity: bool,
    #[serde(rename = "listen_timeout_ms", with = "duration_ms")]
    pub listen_timeout: Duration,
}

impl Default for MemcachedConfig {
    fn default() -> Self {
        Self {
            path_to_binary: DEFAULT_PATH.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            num_threads: DEFAULT_NUM_THREADS,
            max_memory_mb: DEFAULT_MAX_MEMORY_MB,
            num_connections: DEFAULT_NUM_CONNECTIONS,
            threads_affinity: false,
            listen_timeout: DEFAULT_LISTEN_TIMEOUT,
        }
    }
}

impl MemcachedConfig {
    pub fn builder() -> MemcachedConfigBuilder {
        MemcachedConfigBuilder::new()
    }

    /// Load configuration from process environment, after reading `.env` if present
    pub fn from_env() -> LauncherResult<Self> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> LauncherResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(env_keys::PATH) {
            config.path_to_binary = path;
        }
        if let Some(user) = lookup(env_keys::USER) {
            config.user = user;
        }
        if let Some(raw) = lookup(env_keys::PORT) {
            config.port = parse_value(env_keys::PORT, &raw)?;
        }
        if let Some(raw) = lookup(env_keys::THREADS) {
            config.num_threads = parse_value(env_keys::THREADS, &raw)?;
        }
        if let Some(raw) = lookup(env_keys::THREADS_AFFINITY) {
            config.threads_affinity = parse_value(env_keys::THREADS_AFFINITY, &raw)?;
        }
        if let Some(raw) = lookup(env_keys::CONNECTIONS) {
            config.num_connections = parse_value(env_keys::CONNECTIONS, &raw)?;
        }
        if let Some(raw) = lookup(env_keys::MAX_MEMORY) {
            config.max_memory_mb = parse_value(env_keys::MAX_MEMORY, &raw)?;
        }
        if let Some(raw) = lookup(env_keys::LISTEN_TIMEOUT_MS) {
            let millis: u64 = parse_value(env_keys::LISTEN_TIMEOUT_MS, &raw)?;
            config.listen_timeout = Duration::from_millis(millis);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file; missing fields take defaults
    pub fn from_file(path: impl AsRef<Path>) -> LauncherResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MemcachedConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants every launch relies on
    pub fn validate(&self) -> LauncherResult<()> {
        if self.path_to_binary.trim().is_empty() {
            return Err(LauncherError::config("path_to_binary", "must not be empty"));
        }
        if self.user.trim().is_empty() {
            return Err(LauncherError::config("user", "must not be empty"));
        }
        if self.port == 0 {
            return Err(LauncherError::config("port", "must be positive"));
        }
        if self.num_threads == 0 {
            return Err(LauncherError::config("num_threads", "must be positive"));
        }
        if self.max_memory_mb == 0 {
            return Err(LauncherError::config("max_memory_mb", "must be positive"));
        }
        if self.num_connections == 0 {
            return Err(LauncherError::config("num_connections", "must be positive"));
        }
        if self.listen_timeout.is_zero() {
            return Err(LauncherError::config("listen_timeout", "must be positive"));
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(field: &str, raw: &str) -> Result<T, SharedError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| SharedError::invalid_config(field, raw))
}

mod duration_ms {
    use serde::ser::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).map_err(|_| {
            S::Error::custom(format!("{value:?} does not fit in u64 milliseconds"))
        })?;
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Builder for [`MemcachedConfig`], starting from the defaults
pub struct MemcachedConfigBuilder {
    config: MemcachedConfig,
}

impl MemcachedConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: MemcachedConfig::default(),
        }
    }

    /// Set path to the memcached binary
    pub fn path_to_binary<S: Into<String>>(mut self, path: S) -> Self {
        self.config.path_to_binary = path.into();
        self
    }

    /// Set listen port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set user the server runs as
    pub fn user<S: Into<String>>(mut self, user: S) -> Self {
        self.config.user = user.into();
        self
    }

    /// Set number of worker threads
    pub fn num_threads(mut self, threads: u32) -> Self {
        self.config.num_threads = threads;
        self
    }

    /// Set memory limit in megabytes
    pub fn max_memory_mb(mut self, megabytes: u32) -> Self {
        self.config.max_memory_mb = megabytes;
        self
    }

    /// Set maximum simultaneous connections
    pub fn num_connections(mut self, connections: u32) -> Self {
        self.config.num_connections = connections;
        self
    }

    /// Enable or disable pinning worker threads to CPUs
    pub fn threads_affinity(mut self, enabled: bool) -> Self {
        self.config.threads_affinity = enabled;
        self
    }

    /// Set how long to wait for the server to accept connections
    pub fn listen_timeout(mut self, timeout: Duration) -> Self {
        self.config.listen_timeout = timeout;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> LauncherResult<MemcachedConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for MemcachedConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
