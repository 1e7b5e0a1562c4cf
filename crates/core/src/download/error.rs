//! Error types for the download module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while downloading an asset.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// No URL given.
    #[error("Asset URL is empty")]
    EmptyUrl,

    /// Target file name is unusable (empty, or escapes the destination).
    #[error("Invalid file name: {name}")]
    InvalidFileName { name: String },

    /// The asset host answered with a non-success status.
    #[error("Failed to download asset: {status} - {message}")]
    Status { status: u16, message: String },

    /// Failed to create the destination directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the destination file.
    #[error("Failed to write {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl DownloadError {
    pub(crate) fn write_failed(path: PathBuf, source: std::io::Error) -> Self {
        DownloadError::WriteFailed { path, source }
    }
}
