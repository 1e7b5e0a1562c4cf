//! Streaming asset downloader.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

use super::error::DownloadError;
use crate::metrics;

/// A file written by [`AssetDownloader::download`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadedAsset {
    pub path: PathBuf,
    pub bytes: u64,
    /// Hex-encoded SHA-256 of the written bytes.
    pub sha256: String,
}

/// Downloads assets over HTTP.
#[derive(Debug, Clone, Default)]
pub struct AssetDownloader {
    client: reqwest::Client,
}

impl AssetDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Download `url` into `dest_dir`.
    ///
    /// The extension inferred from the URL is appended to `file_name` unless
    /// the name already ends with it. The body is streamed to a `.part` file
    /// that is renamed into place once complete.
    pub async fn download(
        &self,
        url: &str,
        dest_dir: &Path,
        file_name: &str,
    ) -> Result<DownloadedAsset, DownloadError> {
        let result = self.download_inner(url, dest_dir, file_name).await;
        match &result {
            Ok(asset) => {
                metrics::ASSET_DOWNLOADS_TOTAL
                    .with_label_values(&["success"])
                    .inc();
                metrics::ASSET_DOWNLOAD_BYTES.inc_by(asset.bytes);
            }
            Err(e) => {
                metrics::ASSET_DOWNLOADS_TOTAL
                    .with_label_values(&["failed"])
                    .inc();
                warn!("Asset download failed: {}", e);
            }
        }
        result
    }

    async fn download_inner(
        &self,
        url: &str,
        dest_dir: &Path,
        file_name: &str,
    ) -> Result<DownloadedAsset, DownloadError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DownloadError::EmptyUrl);
        }

        let file_name = resolve_file_name(file_name, infer_extension(url))?;

        fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| DownloadError::DirectoryCreationFailed {
                path: dest_dir.to_path_buf(),
                source: e,
            })?;

        let path = dest_dir.join(&file_name);
        info!("Downloading asset from {} to {}", url, path.display());

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DownloadError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let total_size = response.content_length().filter(|&n| n > 0);
        let part_path = dest_dir.join(format!("{}.part", file_name));

        let written = write_stream(response, &part_path, total_size).await;
        let (bytes, sha256) = match written {
            Ok(done) => done,
            Err(e) => {
                let _ = fs::remove_file(&part_path).await;
                return Err(e);
            }
        };

        fs::rename(&part_path, &path)
            .await
            .map_err(|e| DownloadError::write_failed(path.clone(), e))?;

        info!("Asset downloaded ({} bytes): {}", bytes, path.display());
        Ok(DownloadedAsset {
            path,
            bytes,
            sha256,
        })
    }
}

async fn write_stream(
    response: reqwest::Response,
    path: &Path,
    total_size: Option<u64>,
) -> Result<(u64, String), DownloadError> {
    let file = File::create(path)
        .await
        .map_err(|e| DownloadError::write_failed(path.to_path_buf(), e))?;
    let mut writer = BufWriter::new(file);
    let mut hasher = Sha256::new();
    let mut downloaded = 0u64;
    let mut last_decile = 0u64;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if chunk.is_empty() {
            continue;
        }
        hasher.update(&chunk);
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::write_failed(path.to_path_buf(), e))?;
        downloaded += chunk.len() as u64;

        if let Some(total) = total_size {
            let decile = (downloaded.saturating_mul(10) / total).min(10);
            if decile > last_decile {
                last_decile = decile;
                debug!("Download progress: {}%", decile * 10);
            }
        }
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::write_failed(path.to_path_buf(), e))?;

    Ok((downloaded, format!("{:x}", hasher.finalize())))
}

/// File extension (with dot) for an asset URL.
///
/// Matches on substrings of the lowercased URL so that signed URLs with
/// query strings still resolve.
pub fn infer_extension(url: &str) -> &'static str {
    let lower = url.to_lowercase();
    if lower.contains(".spz") {
        ".spz"
    } else if lower.contains(".ply") {
        ".ply"
    } else if lower.contains(".glb") || lower.contains(".gltf") {
        ".glb"
    } else if lower.contains(".png") {
        ".png"
    } else if lower.contains(".jpg") || lower.contains(".jpeg") {
        ".jpg"
    } else if lower.contains(".webp") {
        ".webp"
    } else {
        ".bin"
    }
}

/// Append `ext` unless present; reject names that would leave the directory.
fn resolve_file_name(file_name: &str, ext: &str) -> Result<String, DownloadError> {
    let name = file_name.trim();
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\');
    if invalid {
        return Err(DownloadError::InvalidFileName {
            name: file_name.to_string(),
        });
    }

    if name.ends_with(ext) {
        Ok(name.to_string())
    } else {
        Ok(format!("{}{}", name, ext))
    }
}
