use crate::config::FetchConfig;
use crate::core::archive;
use crate::core::platform::{binary_path, resolve_asset};
use crate::domain::model::{FetchOutcome, Platform, ReleaseAsset};
use crate::domain::ports::Downloader;
use crate::utils::error::{ConverterError, Result};
use std::path::{Path, PathBuf};

/// Downloads a protoc release archive and unpacks it under `<outdir>/bin/`.
pub struct ToolchainFetcher<D: Downloader> {
    downloader: D,
    config: FetchConfig,
    platform: Platform,
}

impl<D: Downloader> ToolchainFetcher<D> {
    pub fn new(downloader: D, config: FetchConfig) -> Self {
        Self::with_platform(downloader, config, Platform::current())
    }

    pub fn with_platform(downloader: D, config: FetchConfig, platform: Platform) -> Self {
        Self {
            downloader,
            config,
            platform,
        }
    }

    pub fn asset(&self) -> ReleaseAsset {
        resolve_asset(&self.config.base_url, &self.config.version, &self.platform)
    }

    pub fn outdir(&self) -> Result<PathBuf> {
        Ok(std::path::absolute(&self.config.outdir)?)
    }

    pub fn binary_path(&self) -> Result<PathBuf> {
        Ok(binary_path(&self.outdir()?, &self.platform))
    }

    pub async fn run(&self) -> Result<FetchOutcome> {
        let outdir = self.outdir()?;
        let protoc_path = binary_path(&outdir, &self.platform);
        let asset = self.asset();

        tracing::debug!(
            "Resolved {} for {} (tag {})",
            asset.filename,
            self.platform,
            asset.tag
        );

        if protoc_path.exists() && !self.config.force {
            tracing::info!("✅ protoc already present at {}", protoc_path.display());
            return Ok(FetchOutcome::AlreadyPresent(protoc_path));
        }

        // 下載的壓縮檔放在暫存目錄，結束時自動清除
        let staging = tempfile::TempDir::new()?;
        let archive_path = staging.path().join(&asset.filename);

        self.downloader
            .download(&asset.url, &archive_path)
            .await
            .map_err(|e| match e {
                ConverterError::DownloadError { .. } => e,
                other => ConverterError::DownloadError {
                    url: asset.url.clone(),
                    message: other.to_string(),
                },
            })?;

        let extract_from = archive_path.clone();
        let extract_into = outdir.clone();
        tokio::task::spawn_blocking(move || archive::extract(&extract_from, &extract_into))
            .await
            .map_err(|e| ConverterError::ExtractionError {
                message: e.to_string(),
            })?
            .map_err(|e| match e {
                ConverterError::ExtractionError { .. } => e,
                other => ConverterError::ExtractionError {
                    message: other.to_string(),
                },
            })?;

        drop(staging);

        if protoc_path.exists() {
            make_executable(&protoc_path);
            tracing::info!("✅ protoc available at: {}", protoc_path.display());
            Ok(FetchOutcome::Installed(protoc_path))
        } else {
            let extracted = archive::list_files(&outdir)?;
            tracing::error!(
                "❌ Extraction completed but protoc not found at {} ({} extracted entries)",
                protoc_path.display(),
                extracted.len()
            );
            Err(ConverterError::BinaryNotFound {
                path: protoc_path,
                extracted,
            })
        }
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let result = std::fs::metadata(path).and_then(|metadata| {
        let mut permissions = metadata.permissions();
        permissions.set_mode(permissions.mode() | 0o111);
        std::fs::set_permissions(path, permissions)
    });

    if let Err(e) = result {
        tracing::warn!("Could not mark {} executable: {}", path.display(), e);
    }
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}
