//! Runtime configuration from environment variables
//!
//! | variable         | default       |
//! |------------------|---------------|
//! | `DATA_DIR`       | `public`      |
//! | `STATIC_DIR`     | `DATA_DIR`    |
//! | `PORT`           | `3000`        |
//! | `CACHE_TTL_SECS` | `300`         |
//!
//! Unparseable numbers fall back to their defaults.

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DATA_DIR: &str = "public";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Directory holding `constants.json` and `data.json`
    pub data_dir: PathBuf,
    /// Directory served as static files (the form page)
    pub static_dir: PathBuf,
    pub port: u16,
    /// Lifetime of cached calculate responses
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value lookup (the environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup("DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

        let static_dir = lookup("STATIC_DIR").unwrap_or_else(|| data_dir.clone());

        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let cache_ttl_secs = lookup("CACHE_TTL_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CACHE_TTL_SECS);

        Self {
            data_dir: PathBuf::from(data_dir),
            static_dir: PathBuf::from(static_dir),
            port,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
