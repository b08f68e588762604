use std::env;
use crate::fdc::client::{FdcConfig, DEFAULT_BASE_URL};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub export_dir: String,
    pub fdc: FdcConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is not a valid number: {value}")]
    Invalid { name: &'static str, value: String },
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    /// Reads the process environment. Call `dotenv().ok()` first to pick up a
    /// local `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let ttl_raw = var_or("FDC_CACHE_TTL_SECS", "86400");
        let cache_ttl_secs = ttl_raw
            .parse()
            .map_err(|_| ConfigError::Invalid { name: "FDC_CACHE_TTL_SECS", value: ttl_raw.clone() })?;

        Ok(Self {
            database_url,
            bind_address: var_or("BIND_ADDRESS", "127.0.0.1:8080"),
            export_dir: var_or("EXPORT_DIR", "exports"),
            fdc: FdcConfig {
                api_key: var_or("FDC_API_KEY", "DEMO_KEY"),
                base_url: var_or("FDC_BASE_URL", DEFAULT_BASE_URL),
                cache_ttl_secs,
            },
        })
    }
}
