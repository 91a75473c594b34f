pub mod archive;
pub mod fetcher;
pub mod platform;
pub mod random;

pub use crate::domain::model::{FetchOutcome, Platform, ReleaseAsset};
pub use crate::domain::ports::Downloader;
pub use crate::utils::error::Result;
