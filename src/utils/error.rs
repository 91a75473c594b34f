use crate::rpc::status::Status;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConverterError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("RPC call failed: {0}")]
    RpcError(#[from] Status),

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Download failed: {message} (url: {url})")]
    DownloadError { url: String, message: String },

    #[error("Extraction failed: {message}")]
    ExtractionError { message: String },

    #[error("Extraction completed but binary not found at expected location {}", path.display())]
    BinaryNotFound {
        path: PathBuf,
        extracted: Vec<PathBuf>,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },
}

impl ConverterError {
    /// 依錯誤階段決定程序退出碼
    pub fn exit_code(&self) -> i32 {
        match self {
            ConverterError::DownloadError { .. } => 2,
            ConverterError::ExtractionError { .. } => 3,
            ConverterError::BinaryNotFound { .. } => 4,
            _ => 1,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ConverterError::DownloadError { .. } | ConverterError::HttpError(_) => {
                "Check the network connection and that the requested version exists"
            }
            ConverterError::ExtractionError { .. } | ConverterError::ZipError(_) => {
                "The archive may be corrupt; re-run with --force to download it again"
            }
            ConverterError::BinaryNotFound { .. } => {
                "Inspect the extracted files listed above; the archive layout may have changed"
            }
            ConverterError::ConfigError { .. }
            | ConverterError::InvalidConfigValueError { .. }
            | ConverterError::ConfigValidationError { .. } => {
                "Check the command line flags and the configuration file"
            }
            ConverterError::RpcError(_) | ConverterError::ConnectionClosed => {
                "Make sure the server is running and reachable"
            }
            ConverterError::IoError(e) if is_network_error(e.kind()) => {
                "Make sure the server is running and reachable"
            }
            ConverterError::IoError(_) | ConverterError::SerializationError(_) => {
                "Check file permissions and available disk space"
            }
        }
    }
}

fn is_network_error(kind: std::io::ErrorKind) -> bool {
    use std::io::ErrorKind;
    matches!(
        kind,
        ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::AddrNotAvailable
            | ErrorKind::BrokenPipe
            | ErrorKind::TimedOut
    )
}

pub type Result<T> = std::result::Result<T, ConverterError>;
