//! Source image handed to the generator.

use serde::{Deserialize, Serialize};

use crate::orchestrator::GenerationError;

/// Image encodings the prepare-upload endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    /// MIME type sent as the upload `Content-Type`.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Webp => "image/webp",
        }
    }

    /// Extension announced to prepare-upload (no leading dot).
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
        }
    }

    /// Detect the format from magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }
}

/// Raw bytes of a single image. Consumed by the upload step.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl ImageAsset {
    /// Wrap bytes whose format the caller already knows.
    pub fn new(bytes: Vec<u8>, format: ImageFormat) -> Self {
        Self { bytes, format }
    }

    /// Wrap bytes, detecting the format from their header.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, GenerationError> {
        if bytes.is_empty() {
            return Err(GenerationError::Configuration(
                "image is empty".to_string(),
            ));
        }
        let format = ImageFormat::sniff(&bytes).ok_or_else(|| {
            GenerationError::Configuration(
                "unsupported image format (expected JPEG, PNG or WebP)".to_string(),
            )
        })?;
        Ok(Self { bytes, format })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File name announced to prepare-upload.
    pub fn file_name(&self) -> String {
        format!("image.{}", self.format.extension())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl std::fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAsset")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}
