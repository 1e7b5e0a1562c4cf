//! Testing utilities and a scripted mock of the Marble API.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use worldforge_core::testing::{fixtures, MockWorldApi};
//! use worldforge_core::WorldGenerator;
//!
//! let api = Arc::new(MockWorldApi::new());
//! api.push_snapshots([fixtures::pending(Some(40.0)), fixtures::done_ok(fixtures::world_payload("w-1"))]).await;
//! let generator = WorldGenerator::new(api.clone());
//! ```

mod mock_world_api;

pub use mock_world_api::{MockStep, MockWorldApi, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::asset::{ImageAsset, ImageFormat};
    use crate::marble::OperationSnapshot;

    /// A plausible result payload with every asset present.
    pub fn world_payload(world_id: &str) -> Value {
        let base = format!("https://cdn.worldlabs.example/{}", world_id);
        json!({
            "world_id": world_id,
            "display_name": "Test World",
            "world_marble_url": format!("https://marble.worldlabs.ai/world/{}", world_id),
            "thumbnail_url": format!("{}/thumb.jpg", base),
            "assets": {
                "splats": {
                    "spz_urls": {
                        "100k": format!("{}/splat_100k.spz", base),
                        "500k": format!("{}/splat_500k.spz", base),
                        "full_res": format!("{}/splat_full.spz", base)
                    }
                },
                "mesh": {"collider_mesh_url": format!("{}/collider.glb", base)},
                "imagery": {"pano_url": format!("{}/pano.png", base)}
            }
        })
    }

    /// Not done, optionally with a progress figure.
    pub fn pending(progress: Option<f64>) -> OperationSnapshot {
        OperationSnapshot {
            done: false,
            progress: progress.map(|p| json!(p)),
            ..Default::default()
        }
    }

    pub fn done_ok(response: Value) -> OperationSnapshot {
        OperationSnapshot {
            done: true,
            response: Some(response),
            ..Default::default()
        }
    }

    pub fn done_error(error: Value) -> OperationSnapshot {
        OperationSnapshot {
            done: true,
            error: Some(error),
            ..Default::default()
        }
    }

    /// Minimal bytes that sniff as JPEG.
    pub fn sample_jpeg_bytes() -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
        bytes.extend(std::iter::repeat_n(0u8, 64));
        bytes.extend([0xFF, 0xD9]);
        bytes
    }

    /// Minimal bytes that sniff as PNG.
    pub fn sample_png_bytes() -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend(std::iter::repeat_n(0u8, 32));
        bytes
    }

    pub fn sample_jpeg() -> ImageAsset {
        ImageAsset::new(sample_jpeg_bytes(), ImageFormat::Jpeg)
    }
}
