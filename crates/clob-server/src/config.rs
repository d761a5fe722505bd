//! Gateway configuration.
//!
//! Defaults can be overridden via environment variables:
//!
//! - `CLOB_BIND_ADDR`   (default: "0.0.0.0")
//! - `CLOB_PORT`        (default: "9000")
//! - `CLOB_MAX_CLIENTS` (default: "1024")

use std::env;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind, e.g. "0.0.0.0" or "127.0.0.1".
    pub bind_addr: String,

    /// TCP port to listen on.
    pub port: u16,

    /// Maximum number of simultaneously connected clients.
    pub max_clients: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl Config {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env::var("CLOB_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = read_env_or_default("CLOB_PORT", 9000u16)?;
        let max_clients = read_env_or_default("CLOB_MAX_CLIENTS", 1024usize)?;

        Ok(Config {
            bind_addr,
            port,
            max_clients,
        })
    }

    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn read_env_or_default<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value.parse::<T>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}
