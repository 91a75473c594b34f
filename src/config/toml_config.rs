use crate::config::{ClientConfig, ServerConfig};
use crate::utils::error::{ConverterError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Optional file configuration for the RPC server and client.
///
/// ```toml
/// [server]
/// address = "[::]:9999"
/// max_workers = 1
/// grace_period_seconds = 10
///
/// [client]
/// address = "localhost:${RPC_PORT}"
/// iterations = 1000
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub server: Option<ServerSection>,
    pub client: Option<ClientSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub address: Option<String>,
    pub max_workers: Option<usize>,
    pub grace_period_seconds: Option<u64>,
    pub heartbeat_seconds: Option<u64>,
    pub log_format: Option<LogFormat>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientSection {
    pub address: Option<String>,
    pub iterations: Option<usize>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ConverterError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ConverterError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RPC_PORT})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConverterError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 以檔案內容覆蓋預設值
    pub fn server_config(&self) -> ServerConfig {
        let mut config = ServerConfig::default();
        if let Some(section) = &self.server {
            if let Some(address) = &section.address {
                config.address = address.clone();
            }
            if let Some(max_workers) = section.max_workers {
                config.max_workers = max_workers;
            }
            if let Some(grace) = section.grace_period_seconds {
                config.grace_period = Duration::from_secs(grace);
            }
            if let Some(heartbeat) = section.heartbeat_seconds {
                config.heartbeat = Duration::from_secs(heartbeat);
            }
        }
        config
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::default();
        if let Some(section) = &self.client {
            if let Some(address) = &section.address {
                config.address = address.clone();
            }
            if let Some(iterations) = section.iterations {
                config.iterations = iterations;
            }
        }
        config
    }

    pub fn log_format(&self) -> Option<LogFormat> {
        self.server.as_ref().and_then(|s| s.log_format)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if self.server.is_some() {
            self.server_config().validate()?;
        }
        if self.client.is_some() {
            self.client_config().validate()?;
        }
        Ok(())
    }
}
