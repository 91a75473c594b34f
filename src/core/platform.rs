use crate::domain::model::{ArchKind, OsKind, Platform, ReleaseAsset};
use std::path::{Path, PathBuf};

pub const DEFAULT_VERSION: &str = "33.5";
pub const DEFAULT_BASE_URL: &str = "https://github.com/protocolbuffers/protobuf/releases/download";

fn normalize_version(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

/// Release tag for a version, e.g. `33.5` and `v33.5` both give `v33.5`.
pub fn release_tag(version: &str) -> String {
    format!("v{}", normalize_version(version))
}

/// 依平台選擇 release 檔名
pub fn choose_filename(version: &str, platform: &Platform) -> String {
    let ver = normalize_version(version);
    match (&platform.os, &platform.arch) {
        (OsKind::Windows, _) => format!("protoc-{}-win64.zip", ver),
        (OsKind::Linux, _) => format!("protoc-{}-linux-x86_64.zip", ver),
        (OsKind::MacOs, ArchKind::Aarch64) => format!("protoc-{}-osx-aarch_64.zip", ver),
        (OsKind::MacOs, _) => format!("protoc-{}-osx-x86_64.zip", ver),
        // fallback
        (OsKind::Other(_), _) => format!("protoc-{}-linux-x86_64.zip", ver),
    }
}

pub fn resolve_asset(base_url: &str, version: &str, platform: &Platform) -> ReleaseAsset {
    let tag = release_tag(version);
    let filename = choose_filename(&tag, platform);
    let url = format!("{}/{}/{}", base_url.trim_end_matches('/'), tag, filename);
    ReleaseAsset { tag, filename, url }
}

pub fn binary_name(platform: &Platform) -> &'static str {
    if platform.is_windows() {
        "protoc.exe"
    } else {
        "protoc"
    }
}

pub fn binary_path(outdir: &Path, platform: &Platform) -> PathBuf {
    outdir.join("bin").join(binary_name(platform))
}
