#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::platform::{DEFAULT_BASE_URL, DEFAULT_VERSION};
use crate::utils::error::{ConverterError, Result};
use crate::utils::validation::{self, Validate};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SERVER_ADDRESS: &str = "[::]:9999";
pub const DEFAULT_CLIENT_ADDRESS: &str = "localhost:9999";
pub const DEFAULT_MAX_WORKERS: usize = 1;
pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 10;
pub const DEFAULT_HEARTBEAT_SECS: u64 = 10;
pub const DEFAULT_ITERATIONS: usize = 1000;
pub const DEFAULT_OUTDIR: &str = "./protoc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub version: String,
    pub outdir: PathBuf,
    pub force: bool,
    pub base_url: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            outdir: PathBuf::from(DEFAULT_OUTDIR),
            force: false,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Validate for FetchConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("version", &self.version)?;
        validation::validate_path("outdir", &self.outdir.to_string_lossy())?;
        validation::validate_url("base_url", &self.base_url)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub address: String,
    pub max_workers: usize,
    /// Time in-flight calls get to finish once shutdown starts.
    pub grace_period: Duration,
    /// Interval between "Server listening" log lines.
    pub heartbeat: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_SERVER_ADDRESS.to_string(),
            max_workers: DEFAULT_MAX_WORKERS,
            grace_period: Duration::from_secs(DEFAULT_GRACE_PERIOD_SECS),
            heartbeat: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_socket_address("server.address", &self.address)?;
        validation::validate_positive_number("server.max_workers", self.max_workers, 1)?;
        if self.heartbeat.is_zero() {
            return Err(ConverterError::InvalidConfigValueError {
                field: "server.heartbeat".to_string(),
                value: "0".to_string(),
                reason: "Heartbeat interval must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub address: String,
    pub iterations: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_CLIENT_ADDRESS.to_string(),
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_socket_address("client.address", &self.address)
    }
}
