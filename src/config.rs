use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE: &str = "computacion";
const DEFAULT_COLLECTION: &str = "computacion";

/// Process configuration, read once at startup and handed to the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub database: String,
    pub collection: String,
    pub max_pool_size: u32,
    pub server_selection_timeout: Duration,
    pub static_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mongodb_uri = lookup("MONGODB_URLSTRING")
            .filter(|v| !v.trim().is_empty())
            .context("MONGODB_URLSTRING not set")?;

        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let max_pool_size = parse_or(&lookup, "MONGODB_MAX_POOL_SIZE", 20u32)?;
        let selection_timeout_secs =
            parse_or(&lookup, "MONGODB_SERVER_SELECTION_TIMEOUT_SECS", 10u64)?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            mongodb_uri,
            database: lookup("MONGODB_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            collection: lookup("MONGODB_COLLECTION")
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            max_pool_size,
            server_selection_timeout: Duration::from_secs(selection_timeout_secs),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
        })
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
