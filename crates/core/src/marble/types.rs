//! Wire types for the Marble control-plane API.
//!
//! Field names match the service byte for byte. Response types keep every
//! field optional so that shape violations surface as protocol errors in the
//! orchestrator instead of opaque parse failures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::orchestrator::{GenerationError, WorldModel};

// ============================================================================
// Prepare upload
// ============================================================================

/// Body of `POST /media-assets:prepare_upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepareUploadRequest {
    pub file_name: String,
    pub kind: String,
    pub extension: String,
}

impl PrepareUploadRequest {
    pub fn image(file_name: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            kind: "image".to_string(),
            extension: extension.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrepareUploadResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_asset: Option<MediaAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_info: Option<UploadInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_asset_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_url: Option<String>,
    /// Extra headers the signed URL expects on the PUT.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_headers: Option<BTreeMap<String, String>>,
}

/// A validated prepare-upload result. Lives only until the upload finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub media_asset_id: String,
    pub upload_url: String,
    pub required_headers: BTreeMap<String, String>,
}

impl TryFrom<PrepareUploadResponse> for UploadTicket {
    type Error = GenerationError;

    /// Both the asset id and the upload URL must be present and non-empty.
    fn try_from(response: PrepareUploadResponse) -> Result<Self, Self::Error> {
        let media_asset_id = response
            .media_asset
            .as_ref()
            .and_then(|m| m.media_asset_id.clone())
            .filter(|id| !id.is_empty());
        let upload_url = response
            .upload_info
            .as_ref()
            .and_then(|u| u.upload_url.clone())
            .filter(|url| !url.is_empty());

        match (media_asset_id, upload_url) {
            (Some(media_asset_id), Some(upload_url)) => Ok(UploadTicket {
                media_asset_id,
                upload_url,
                required_headers: response
                    .upload_info
                    .and_then(|u| u.required_headers)
                    .unwrap_or_default(),
            }),
            (id, url) => Err(GenerationError::Protocol(format!(
                "unexpected prepare_upload response (media_asset_id present: {}, upload_url present: {}): {:?}",
                id.is_some(),
                url.is_some(),
                response
            ))),
        }
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Body of `POST /worlds:generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateWorldRequest {
    pub display_name: String,
    pub model: WorldModel,
    pub world_prompt: WorldPrompt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldPrompt {
    #[serde(rename = "type")]
    pub prompt_type: String,
    pub image_prompt: ImagePrompt,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePrompt {
    pub source: String,
    pub media_asset_id: String,
    pub is_pano: bool,
}

impl GenerateWorldRequest {
    /// Image-prompted generation referencing an uploaded media asset.
    pub fn from_media_asset(
        display_name: impl Into<String>,
        model: WorldModel,
        media_asset_id: impl Into<String>,
        is_pano: bool,
        text_prompt: Option<&str>,
    ) -> Self {
        let text_prompt = text_prompt
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Self {
            display_name: display_name.into(),
            model,
            world_prompt: WorldPrompt {
                prompt_type: "image".to_string(),
                image_prompt: ImagePrompt {
                    source: "media_asset".to_string(),
                    media_asset_id: media_asset_id.into(),
                    is_pano,
                },
                text_prompt,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateWorldResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

/// Opaque id of a submitted generation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(String);

impl OperationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Operation status
// ============================================================================

/// Body of `GET /operations/{id}`. A fresh snapshot per poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationSnapshot {
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

impl OperationSnapshot {
    /// Server-reported percentage, accepting numbers and numeric strings.
    pub fn progress_percent(&self) -> Option<f64> {
        match self.progress.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
            _ => None,
        }
    }
}
