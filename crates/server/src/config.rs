//! Server configuration.
//!
//! A [`ServerConfig`] is plain data with builder methods for programmatic
//! setup and TOML loading for deployments. Every field has a sensible
//! default, so `ServerConfig::default()` is a working configuration.
//!
//! # Example
//!
//! ```rust,ignore
//! let config = ServerConfig::new()
//!     .with_application_name("boiler-plant")
//!     .with_namespace("urn:example:boiler");
//! let server = Server::new(config);
//! ```

use std::fmt;
use std::path::Path;

use serde::Deserialize;

/// The namespace URI every server exposes at index 0.
pub const CORE_NAMESPACE_URI: &str = "http://opcfoundation.org/UA/";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Human-readable application name.
    pub application_name: String,
    /// Globally unique application URI.
    pub application_uri: String,
    /// Product URI of the software.
    pub product_uri: String,
    /// Namespace URIs beyond index 0 (which is always the OPC UA core
    /// namespace), in index order starting at 1.
    pub namespaces: Vec<String>,
    /// Advisory worker-thread count for the surrounding scheduler; the
    /// core itself spawns nothing.
    pub worker_threads: usize,
    /// Bucket count for the in-memory node store (rounded up to a power of
    /// two).
    pub store_shards: usize,
    /// Upper bound on items per read/write request; larger batches are
    /// refused before the results array is allocated.
    pub max_operations_per_request: usize,
}

impl Default for ServerConfig {
    fn default() -> ServerConfig {
        ServerConfig {
            application_name: "ua-server".to_string(),
            application_uri: "urn:ua-server".to_string(),
            product_uri: "urn:ua-server:product".to_string(),
            namespaces: Vec::new(),
            worker_threads: 0,
            store_shards: 16,
            max_operations_per_request: 65_535,
        }
    }
}

impl ServerConfig {
    pub fn new() -> ServerConfig {
        ServerConfig::default()
    }

    pub fn with_application_name(mut self, name: impl Into<String>) -> ServerConfig {
        self.application_name = name.into();
        self
    }

    pub fn with_application_uri(mut self, uri: impl Into<String>) -> ServerConfig {
        self.application_uri = uri.into();
        self
    }

    pub fn with_product_uri(mut self, uri: impl Into<String>) -> ServerConfig {
        self.product_uri = uri.into();
        self
    }

    /// Appends an application namespace URI.
    pub fn with_namespace(mut self, uri: impl Into<String>) -> ServerConfig {
        self.namespaces.push(uri.into());
        self
    }

    pub fn with_worker_threads(mut self, count: usize) -> ServerConfig {
        self.worker_threads = count;
        self
    }

    pub fn with_store_shards(mut self, shards: usize) -> ServerConfig {
        self.store_shards = shards;
        self
    }

    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> Result<ServerConfig, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    /// Loads a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<ServerConfig, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        ServerConfig::from_toml_str(&text)
    }
}

/// Why a configuration could not be loaded.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read config file: {err}"),
            ConfigError::Parse(err) => write!(f, "failed to parse config: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
        }
    }
}
