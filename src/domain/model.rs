use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Request message of `GetRandomNumber`; carries no fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomNumberResponse {
    pub random_number: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsKind {
    Windows,
    Linux,
    MacOs,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchKind {
    X86_64,
    Aarch64,
    Other(String),
}

impl OsKind {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "windows" => OsKind::Windows,
            "linux" => OsKind::Linux,
            "macos" | "darwin" => OsKind::MacOs,
            other => OsKind::Other(other.to_string()),
        }
    }
}

impl ArchKind {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" => ArchKind::X86_64,
            "aarch64" | "arm64" => ArchKind::Aarch64,
            other => ArchKind::Other(other.to_string()),
        }
    }
}

/// Host operating system and CPU architecture used to pick a release asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: OsKind,
    pub arch: ArchKind,
}

impl Platform {
    pub fn new(os: OsKind, arch: ArchKind) -> Self {
        Self { os, arch }
    }

    /// Platform this binary was compiled for.
    pub fn current() -> Self {
        Self {
            os: OsKind::from_name(std::env::consts::OS),
            arch: ArchKind::from_name(std::env::consts::ARCH),
        }
    }

    pub fn is_windows(&self) -> bool {
        self.os == OsKind::Windows
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let os = match &self.os {
            OsKind::Windows => "windows",
            OsKind::Linux => "linux",
            OsKind::MacOs => "macos",
            OsKind::Other(name) => name,
        };
        let arch = match &self.arch {
            ArchKind::X86_64 => "x86_64",
            ArchKind::Aarch64 => "aarch64",
            ArchKind::Other(name) => name,
        };
        write!(f, "{}-{}", os, arch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub tag: String,
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    AlreadyPresent(PathBuf),
    Installed(PathBuf),
}

impl FetchOutcome {
    pub fn binary_path(&self) -> &PathBuf {
        match self {
            FetchOutcome::AlreadyPresent(path) | FetchOutcome::Installed(path) => path,
        }
    }
}
