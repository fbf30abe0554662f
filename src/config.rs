// src/config.rs

use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

const DEFAULT_DATABASE: &str = "busse_sales_data_warehouse";
const DEFAULT_COLLECTION: &str = "sales";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: &str = "8191";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_SUPPORTED_YEARS: &str = "2022,2023";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingEnvVar(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidEnvVar(&'static str, String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub host: IpAddr,
    pub port: u16,
    pub allowed_origin: String,
    pub supported_years: Vec<String>,
}

impl Config {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str, default: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let uri = lookup("MONGODB_URI")
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingEnvVar("MONGODB_URI"))?;

        let host = get("SALES_HOST", DEFAULT_HOST)
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SALES_HOST", e.to_string()))?;

        let port = get("SALES_PORT", DEFAULT_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SALES_PORT", e.to_string()))?;

        let supported_years = parse_years(&get("SALES_SUPPORTED_YEARS", DEFAULT_SUPPORTED_YEARS))?;

        Ok(Self {
            uri,
            database: get("SALES_DATABASE", DEFAULT_DATABASE),
            collection: get("SALES_COLLECTION", DEFAULT_COLLECTION),
            host,
            port,
            allowed_origin: get("SALES_ALLOWED_ORIGIN", DEFAULT_ALLOWED_ORIGIN),
            supported_years,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_years(raw: &str) -> Result<Vec<String>, ConfigError> {
    let years = raw
        .split(',')
        .map(str::trim)
        .filter(|year| !year.is_empty())
        .map(String::from)
        .collect::<Vec<_>>();

    if years.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            "SALES_SUPPORTED_YEARS",
            "no years listed".to_string(),
        ));
    }

    Ok(years)
}
