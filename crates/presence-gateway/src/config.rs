//! Gateway configuration
//!
//! Layered, lowest precedence first: defaults, config file, environment,
//! command line. The binary assembles it once and passes it down.

use presence_core::{StoreBackend, StoreSettings};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::{GatewayError, Result, DEFAULT_HOST, DEFAULT_PORT};

/// Main gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Store selection
    pub store: StoreSettings,

    /// `Access-Control-Max-Age` sent with every response
    pub cors_max_age_secs: u64,

    /// Insert sample records into an empty store at startup
    pub seed_sample_data: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store: StoreSettings::default(),
            cors_max_age_secs: 60 * 60,
            seed_sample_data: false,
        }
    }
}

impl GatewayConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_store_backend(mut self, backend: StoreBackend) -> Self {
        self.store.backend = backend;
        self
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store.database_path = path.into();
        self
    }

    pub fn with_memory_fallback(mut self, allow: bool) -> Self {
        self.store.allow_memory_fallback = allow;
        self
    }

    pub fn with_seed_sample_data(mut self, seed: bool) -> Self {
        self.seed_sample_data = seed;
        self
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| GatewayError::InvalidConfig(format!("bad listen address: {}", e)))
    }

    /// Load configuration from a file. `.toml` files are read as TOML,
    /// anything else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };
        Ok(config)
    }

    /// Overlay values from the process environment
    pub fn apply_env(self) -> Result<Self> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`.
    ///
    /// Reads `PRESENCE_HOST`, `PRESENCE_PORT`, `PRESENCE_DB_PATH`,
    /// `PRESENCE_STORE` and, when no store is named, the `VERCEL` platform flag.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(host) = lookup("PRESENCE_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PRESENCE_PORT") {
            self.port = port
                .parse()
                .map_err(|e| GatewayError::InvalidConfig(format!("PRESENCE_PORT: {}", e)))?;
        }
        if let Some(path) = lookup("PRESENCE_DB_PATH") {
            self.store.database_path = PathBuf::from(path);
        }

        let store = lookup("PRESENCE_STORE");
        let platform = lookup("VERCEL");
        if let Some(backend) =
            StoreBackend::from_environment(store.as_deref(), platform.as_deref())
                .map_err(|e| GatewayError::InvalidConfig(e.to_string()))?
        {
            self.store.backend = backend;
        }

        Ok(self)
    }
}
