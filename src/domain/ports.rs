use crate::utils::error::Result;
use std::path::Path;

/// Fetches a remote resource into a local file.
pub trait Downloader: Send + Sync {
    /// Streams `url` into `dest`, returning the number of bytes written.
    fn download(
        &self,
        url: &str,
        dest: &Path,
    ) -> impl std::future::Future<Output = Result<u64>> + Send;
}
