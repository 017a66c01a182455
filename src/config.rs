//! Service configuration from the environment (`.env` is loaded by `main`).

use std::path::PathBuf;
use thiserror::Error;
use crate::handoff::DEFAULT_MESSENGER_ENDPOINT;

pub const DEFAULT_PORT: u16 = 8083;
pub const DEFAULT_CATALOG_PATH: &str = "catalog.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub catalog_path: PathBuf,
    pub messenger_endpoint: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            messenger_endpoint: DEFAULT_MESSENGER_ENDPOINT.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(port) = lookup("PORT") {
            config.port = port.trim().parse().map_err(|_| ConfigError::InvalidPort(port))?;
        }
        if let Some(path) = lookup("CATALOG_PATH").filter(|p| !p.trim().is_empty()) {
            config.catalog_path = PathBuf::from(path);
        }
        if let Some(endpoint) = lookup("MESSENGER_ENDPOINT") {
            if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
                return Err(ConfigError::InvalidEndpoint(endpoint));
            }
            config.messenger_endpoint = endpoint;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),
    #[error("MESSENGER_ENDPOINT must be an http(s) URL, got {0:?}")]
    InvalidEndpoint(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Config::from_lookup(lookup(&[])).unwrap(), Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[("PORT", "9000"), ("CATALOG_PATH", "/srv/menu.json"), ("MESSENGER_ENDPOINT", "https://m.me/shop")])).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.catalog_path, PathBuf::from("/srv/menu.json"));
        assert_eq!(config.messenger_endpoint, "https://m.me/shop");
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(Config::from_lookup(lookup(&[("PORT", "http")])), Err(ConfigError::InvalidPort("http".into())));
        assert!(matches!(Config::from_lookup(lookup(&[("MESSENGER_ENDPOINT", "m.me/shop")])), Err(ConfigError::InvalidEndpoint(_))));
    }
}
