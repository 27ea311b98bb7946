use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use super::ConfigError;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed by CORS.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3001
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://localhost:5174".to_string(),
    ]
}

/// Upstream catalog API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// API root, e.g. "https://pokeapi.co/api/v2".
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Page size of the single listing request.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Fetch per-item detail records to pick up artwork URLs.
    #[serde(default)]
    pub fetch_details: bool,
    /// Concurrent detail requests per batch.
    #[serde(default = "default_detail_batch_size")]
    pub detail_batch_size: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_limit: default_page_limit(),
            timeout_secs: default_timeout(),
            fetch_details: false,
            detail_batch_size: default_detail_batch_size(),
        }
    }
}

fn default_base_url() -> String {
    "https://pokeapi.co/api/v2".to_string()
}

fn default_page_limit() -> u32 {
    2000
}

fn default_timeout() -> u32 {
    10
}

fn default_detail_batch_size() -> usize {
    10
}

/// Cache store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Store location: `sqlite:<path>`, `sqlite::memory:` or `file:<path>`.
    /// A SQLite path may not start with ':' (catches `sqlite::memory` typos).
    #[serde(default = "default_cache_url")]
    pub url: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: default_cache_url(),
        }
    }
}

fn default_cache_url() -> String {
    "sqlite:dexcache.db".to_string()
}

impl CacheConfig {
    /// Parse the cache URL into a backend selection.
    pub fn backend(&self) -> Result<CacheBackend, ConfigError> {
        CacheBackend::parse(&self.url)
    }
}

/// Cache store backend selected by `cache.url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    Sqlite(PathBuf),
    SqliteMemory,
    File(PathBuf),
}

impl CacheBackend {
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        if url == "sqlite::memory:" {
            return Ok(CacheBackend::SqliteMemory);
        }
        if let Some(path) = url.strip_prefix("sqlite:") {
            if path.starts_with(':') {
                return Err(ConfigError::ValidationError(format!(
                    "cache.url '{}' is not a database path; use 'sqlite::memory:' for an in-memory cache",
                    url
                )));
            }
            return non_empty_path(url, path).map(CacheBackend::Sqlite);
        }
        if let Some(path) = url.strip_prefix("file:") {
            return non_empty_path(url, path).map(CacheBackend::File);
        }
        Err(ConfigError::ValidationError(format!(
            "cache.url must start with 'sqlite:' or 'file:' (got '{}')",
            url
        )))
    }
}

fn non_empty_path(url: &str, path: &str) -> Result<PathBuf, ConfigError> {
    let path = path.strip_prefix("//").unwrap_or(path);
    if path.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "cache.url has no path: '{}'",
            url
        )));
    }
    Ok(PathBuf::from(path))
}

/// Catalog service behavior
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub search_policy: SearchPolicy,
    /// Exit the process when the startup population fails instead of
    /// serving an empty catalog.
    #[serde(default)]
    pub exit_on_populate_failure: bool,
}

/// How `search` matches names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPolicy {
    /// Case-insensitive prefix match, ascending id, at most 20 results.
    #[default]
    Prefix,
    /// Case-insensitive substring match, prefix hits first then by name,
    /// at most 10 results.
    RankedSubstring,
}

impl SearchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchPolicy::Prefix => "prefix",
            SearchPolicy::RankedSubstring => "ranked_substring",
        }
    }
}

/// Logging output
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}
