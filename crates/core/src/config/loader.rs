use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides.
///
/// The file must exist.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(with_env(base().merge(Toml::file(path))))
}

/// Like [`load_config`], but a missing file falls back to built-in defaults
/// (still overridden by the environment).
pub fn load_config_or_default(path: &Path) -> Result<Config, ConfigError> {
    let figment = if path.exists() {
        base().merge(Toml::file(path))
    } else {
        base()
    };

    extract(with_env(figment))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn base() -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
}

/// `DEXCACHE_SECTION__KEY` for any setting, plus the conventional `PORT`
/// and `CACHE_URL` variables.
fn with_env(figment: Figment) -> Figment {
    figment
        .merge(Env::prefixed("DEXCACHE_").split("__"))
        .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
        .merge(Env::raw().only(&["CACHE_URL"]).map(|_| "cache.url".into()))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}
