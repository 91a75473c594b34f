use crate::domain::ports::Downloader;
use crate::utils::error::{ConverterError, Result};
use reqwest::Client;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// `Downloader` backed by a `reqwest` client; the body is streamed to disk chunk by chunk.
#[derive(Debug, Clone, Default)]
pub struct ReqwestDownloader {
    client: Client,
}

impl ReqwestDownloader {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Downloader for ReqwestDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tracing::info!("⬇️  Downloading {} -> {}", url, dest.display());
        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        tracing::debug!("Download response status: {}", status);
        if !status.is_success() {
            return Err(ConverterError::DownloadError {
                url: url.to_string(),
                message: format!("HTTP {} when downloading {}", status.as_u16(), url),
            });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!("Downloaded {} bytes", written);
        Ok(written)
    }
}
