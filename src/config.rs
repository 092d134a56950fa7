//! Server configuration.
//!
//! Defaults are plain constants; [`ServerConfig::from_env`] overrides them
//! from the process environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ManagerError;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 5000;

/// Maximum number of device summaries kept in the cache.
pub const SUMMARY_CACHE_CAPACITY: u64 = 1_000;

/// Cached summaries are evicted after this long without access.
pub const SUMMARY_CACHE_IDLE: Duration = Duration::from_secs(5 * 60);

/// Environment variable holding the bind host.
pub const HOST_ENV: &str = "HOST";

/// Environment variable holding the HTTP port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable naming the JSONL snapshot file.
pub const DATA_FILE_ENV: &str = "RCISCO_DATA_FILE";

/// Runtime configuration for the REST server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Snapshot file for the record store; in-memory only when `None`.
    pub data_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_file: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ManagerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ManagerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                ManagerError::InternalServerError(format!("invalid {PORT_ENV} '{raw}': {e}"))
            })?,
            None => DEFAULT_PORT,
        };
        let data_file = lookup(DATA_FILE_ENV)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            data_file,
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ManagerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ManagerError::InternalServerError(format!("invalid bind address: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(config, ServerConfig::default());
        assert_eq!(
            config.bind_addr().expect("addr"),
            "0.0.0.0:5000".parse::<SocketAddr>().expect("literal addr")
        );
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "8080"),
            (DATA_FILE_ENV, "/tmp/rcisco.jsonl"),
        ]))
        .expect("config");
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_file, Some(PathBuf::from("/tmp/rcisco.jsonl")));
        assert_eq!(config.bind_addr().expect("addr").to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[(PORT_ENV, "http")])).expect_err("should fail");
        assert!(matches!(err, ManagerError::InternalServerError(_)));
    }

    #[test]
    fn blank_data_file_means_memory_only() {
        let config = ServerConfig::from_lookup(lookup(&[(DATA_FILE_ENV, "  ")])).expect("config");
        assert_eq!(config.data_file, None);
    }
}
