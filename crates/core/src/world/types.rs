//! Asset categories found in a generated world.

use serde::{Deserialize, Serialize};

/// Splat resolution tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SplatQuality {
    #[default]
    #[serde(rename = "100k")]
    K100,
    #[serde(rename = "500k")]
    K500,
    #[serde(rename = "full_res")]
    FullRes,
}

impl SplatQuality {
    pub const ALL: [SplatQuality; 3] = [SplatQuality::K100, SplatQuality::K500, SplatQuality::FullRes];

    /// Key under `assets.splats.spz_urls`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SplatQuality::K100 => "100k",
            SplatQuality::K500 => "500k",
            SplatQuality::FullRes => "full_res",
        }
    }
}

impl std::fmt::Display for SplatQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SplatQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SplatQuality::ALL
            .into_iter()
            .find(|q| q.as_str() == s)
            .ok_or_else(|| format!("unknown splat quality: {}", s))
    }
}

/// Which interactive viewer to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerKind {
    #[default]
    Splat,
    Mesh,
    Panorama,
}

impl ViewerKind {
    pub const ALL: [ViewerKind; 3] = [ViewerKind::Splat, ViewerKind::Mesh, ViewerKind::Panorama];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewerKind::Splat => "splat",
            ViewerKind::Mesh => "mesh",
            ViewerKind::Panorama => "panorama",
        }
    }
}

impl std::fmt::Display for ViewerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single downloadable asset of a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Splat(SplatQuality),
    /// Collider mesh (GLB).
    Mesh,
    Panorama,
}

impl AssetKind {
    /// The asset shown by `viewer` at `quality`. Quality only matters for splats.
    pub fn for_viewer(viewer: ViewerKind, quality: SplatQuality) -> Self {
        match viewer {
            ViewerKind::Splat => AssetKind::Splat(quality),
            ViewerKind::Mesh => AssetKind::Mesh,
            ViewerKind::Panorama => AssetKind::Panorama,
        }
    }
}

/// Every asset URL of a world; missing assets are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUrls {
    pub splat_100k_url: String,
    pub splat_500k_url: String,
    pub splat_full_url: String,
    pub mesh_url: String,
    pub pano_url: String,
}

impl AssetUrls {
    /// (label, url) pairs for assets that are present.
    pub fn available(&self) -> Vec<(&'static str, &str)> {
        [
            ("Splat 100k", self.splat_100k_url.as_str()),
            ("Splat 500k", self.splat_500k_url.as_str()),
            ("Splat Full", self.splat_full_url.as_str()),
            ("Mesh (GLB)", self.mesh_url.as_str()),
            ("Panorama", self.pano_url.as_str()),
        ]
        .into_iter()
        .filter(|(_, url)| !url.is_empty())
        .collect()
    }
}
