//! Asset download.
//!
//! Streams a generated asset (splat, mesh, panorama) from its URL to local
//! storage and reports what was written.

mod downloader;
mod error;

pub use downloader::{infer_extension, AssetDownloader, DownloadedAsset};
pub use error::DownloadError;
