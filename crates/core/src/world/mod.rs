//! Read-only view over a generated world payload.
//!
//! The payload is kept exactly as the service returned it; accessors do
//! plain field lookups and treat anything missing as absent.

mod types;

pub use types::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Display name used when the payload has none.
pub const DEFAULT_WORLD_NAME: &str = "World Labs 3D World";

/// Result payload of a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct World(Value);

impl World {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    /// The untouched payload.
    pub fn payload(&self) -> &Value {
        &self.0
    }

    pub fn into_payload(self) -> Value {
        self.0
    }

    fn str_at(&self, path: &[&str]) -> Option<&str> {
        let mut node = &self.0;
        for key in path {
            node = node.get(key)?;
        }
        node.as_str().filter(|s| !s.is_empty())
    }

    pub fn world_id(&self) -> Option<&str> {
        self.str_at(&["world_id"])
    }

    pub fn display_name(&self) -> Option<&str> {
        self.str_at(&["display_name"])
    }

    /// Display name, falling back to [`DEFAULT_WORLD_NAME`].
    pub fn name_or_default(&self) -> &str {
        self.display_name().unwrap_or(DEFAULT_WORLD_NAME)
    }

    /// Link to the hosted Marble viewer.
    pub fn marble_url(&self) -> Option<&str> {
        self.str_at(&["marble_url"])
            .or_else(|| self.str_at(&["world_marble_url"]))
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.str_at(&["thumbnail_url"])
    }

    pub fn asset_url(&self, kind: AssetKind) -> Option<&str> {
        match kind {
            AssetKind::Splat(quality) => {
                self.str_at(&["assets", "splats", "spz_urls", quality.as_str()])
            }
            AssetKind::Mesh => self.str_at(&["assets", "mesh", "collider_mesh_url"]),
            AssetKind::Panorama => self.str_at(&["assets", "imagery", "pano_url"]),
        }
    }

    pub fn asset_urls(&self) -> AssetUrls {
        let url = |kind| self.asset_url(kind).unwrap_or_default().to_string();
        AssetUrls {
            splat_100k_url: url(AssetKind::Splat(SplatQuality::K100)),
            splat_500k_url: url(AssetKind::Splat(SplatQuality::K500)),
            splat_full_url: url(AssetKind::Splat(SplatQuality::FullRes)),
            mesh_url: url(AssetKind::Mesh),
            pano_url: url(AssetKind::Panorama),
        }
    }

    /// Top-level keys under `assets`, for diagnostics.
    pub fn asset_categories(&self) -> Vec<&str> {
        self.0
            .get("assets")
            .and_then(Value::as_object)
            .map(|assets| assets.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> World {
        World::new(json!({
            "world_id": "w-1234567890",
            "display_name": "Forest",
            "marble_url": "https://marble.example/w-1234567890",
            "thumbnail_url": "https://cdn.example/thumb.png",
            "assets": {
                "splats": {"spz_urls": {
                    "100k": "https://cdn.example/w_100k.spz",
                    "500k": "https://cdn.example/w_500k.spz",
                    "full_res": "https://cdn.example/w_full.spz"
                }},
                "mesh": {"collider_mesh_url": "https://cdn.example/w.glb"},
                "imagery": {"pano_url": "https://cdn.example/pano.png"}
            }
        }))
    }

    #[test]
    fn test_metadata_accessors() {
        let world = sample();
        assert_eq!(world.world_id(), Some("w-1234567890"));
        assert_eq!(world.display_name(), Some("Forest"));
        assert_eq!(world.marble_url(), Some("https://marble.example/w-1234567890"));
        assert_eq!(world.thumbnail_url(), Some("https://cdn.example/thumb.png"));
    }

    #[test]
    fn test_marble_url_falls_back_to_world_marble_url() {
        let world = World::new(json!({"world_marble_url": "https://marble.example/x"}));
        assert_eq!(world.marble_url(), Some("https://marble.example/x"));
    }

    #[test]
    fn test_asset_urls() {
        let urls = sample().asset_urls();
        assert_eq!(urls.splat_100k_url, "https://cdn.example/w_100k.spz");
        assert_eq!(urls.splat_500k_url, "https://cdn.example/w_500k.spz");
        assert_eq!(urls.splat_full_url, "https://cdn.example/w_full.spz");
        assert_eq!(urls.mesh_url, "https://cdn.example/w.glb");
        assert_eq!(urls.pano_url, "https://cdn.example/pano.png");
        assert_eq!(urls.available().len(), 5);
    }

    #[test]
    fn test_missing_assets_are_empty() {
        let world = World::new(json!({"world_id": "w", "assets": {"mesh": {}}}));
        let urls = world.asset_urls();
        assert_eq!(urls, AssetUrls::default());
        assert!(urls.available().is_empty());
        assert_eq!(world.asset_url(AssetKind::Mesh), None);
        assert_eq!(world.asset_categories(), vec!["mesh"]);
    }

    #[test]
    fn test_name_or_default() {
        assert_eq!(World::new(json!({})).name_or_default(), DEFAULT_WORLD_NAME);
        assert_eq!(sample().name_or_default(), "Forest");
    }

    #[test]
    fn test_payload_roundtrip_is_untouched() {
        let payload = json!({"world_id": "w", "extra": {"nested": [1, 2, 3]}});
        let world: World = serde_json::from_value(payload.clone()).unwrap();
        assert_eq!(serde_json::to_value(&world).unwrap(), payload);
    }

    #[test]
    fn test_quality_parse() {
        assert_eq!("500k".parse::<SplatQuality>().unwrap(), SplatQuality::K500);
        assert!("1m".parse::<SplatQuality>().is_err());
        assert_eq!(
            serde_json::to_value(SplatQuality::FullRes).unwrap(),
            json!("full_res")
        );
    }

    #[test]
    fn test_asset_kind_for_viewer() {
        assert_eq!(
            AssetKind::for_viewer(ViewerKind::Splat, SplatQuality::K500),
            AssetKind::Splat(SplatQuality::K500)
        );
        assert_eq!(
            AssetKind::for_viewer(ViewerKind::Mesh, SplatQuality::K500),
            AssetKind::Mesh
        );
    }
}
