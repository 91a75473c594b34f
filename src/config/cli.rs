use crate::config::toml_config::TomlConfig;
use crate::config::{ClientConfig, FetchConfig, ServerConfig, DEFAULT_OUTDIR};
use crate::core::platform::{DEFAULT_BASE_URL, DEFAULT_VERSION};
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "get-protoc")]
#[command(about = "Download protoc from GitHub releases and extract locally")]
pub struct FetchArgs {
    /// protoc version (e.g. 33.5). Tag used is v<version>
    #[arg(long, default_value = DEFAULT_VERSION)]
    pub version: String,

    /// Output directory to extract into
    #[arg(long, default_value = DEFAULT_OUTDIR)]
    pub outdir: PathBuf,

    /// Re-download and overwrite existing
    #[arg(long)]
    pub force: bool,

    /// Release host the tag and archive name are appended to
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(short = 'v', long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl From<FetchArgs> for FetchConfig {
    fn from(args: FetchArgs) -> Self {
        Self {
            version: args.version,
            outdir: args.outdir,
            force: args.force,
            base_url: args.base_url,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "converter-external")]
#[command(about = "Random number RPC server")]
pub struct ServerArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    pub address: Option<String>,

    /// Number of calls handled at the same time
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// Seconds in-flight calls get to finish after an interrupt
    #[arg(long)]
    pub grace_period: Option<u64>,

    /// Seconds between "Server listening" log lines
    #[arg(long)]
    pub heartbeat: Option<u64>,

    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ServerArgs {
    /// 命令列 > TOML > 預設值
    pub fn resolve(&self) -> Result<(ServerConfig, LogFormat)> {
        let file = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        let mut config = file.server_config();
        if let Some(address) = &self.address {
            config.address = address.clone();
        }
        if let Some(max_workers) = self.max_workers {
            config.max_workers = max_workers;
        }
        if let Some(grace) = self.grace_period {
            config.grace_period = Duration::from_secs(grace);
        }
        if let Some(heartbeat) = self.heartbeat {
            config.heartbeat = Duration::from_secs(heartbeat);
        }

        let log_format = self.log_format.or(file.log_format()).unwrap_or_default();
        Ok((config, log_format))
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "rng-client")]
#[command(about = "Calls GetRandomNumber in a loop and prints each result")]
pub struct ClientArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Server address
    #[arg(long)]
    pub address: Option<String>,

    /// Number of calls to make
    #[arg(short = 'n', long)]
    pub iterations: Option<usize>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ClientArgs {
    pub fn resolve(&self) -> Result<ClientConfig> {
        let file = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        let mut config = file.client_config();
        if let Some(address) = &self.address {
            config.address = address.clone();
        }
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_fetch_defaults() {
        let args = FetchArgs::try_parse_from(["get-protoc"]).unwrap();
        let config = FetchConfig::from(args);

        assert_eq!(config, FetchConfig::default());
    }

    #[test]
    fn test_fetch_flags() {
        let args = FetchArgs::try_parse_from([
            "get-protoc",
            "--version",
            "v29.1",
            "--outdir",
            "/tmp/tools",
            "--force",
        ])
        .unwrap();

        assert_eq!(args.version, "v29.1");
        assert_eq!(args.outdir, PathBuf::from("/tmp/tools"));
        assert!(args.force);
    }

    #[test]
    fn test_server_cli_overrides_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\naddress = \"0.0.0.0:7000\"\nmax_workers = 3\nlog_format = \"json\"\n")
            .unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();

        let args = ServerArgs::try_parse_from([
            "converter-external",
            "--config",
            &path,
            "--max-workers",
            "1",
            "--grace-period",
            "2",
        ])
        .unwrap();
        let (config, log_format) = args.resolve().unwrap();

        assert_eq!(config.address, "0.0.0.0:7000");
        assert_eq!(config.max_workers, 1);
        assert_eq!(config.grace_period, Duration::from_secs(2));
        assert_eq!(log_format, LogFormat::Json);
    }

    #[test]
    fn test_client_defaults() {
        let args = ClientArgs::try_parse_from(["rng-client"]).unwrap();
        assert_eq!(args.resolve().unwrap(), ClientConfig::default());

        let args = ClientArgs::try_parse_from(["rng-client", "-n", "3"]).unwrap();
        assert_eq!(args.resolve().unwrap().iterations, 3);
    }
}
