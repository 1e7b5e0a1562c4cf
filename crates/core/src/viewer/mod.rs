//! Static HTML viewers for generated worlds.
//!
//! Each page embeds an asset URL and loads a browser-side viewer from a CDN:
//! - splat: download / copy-link page (`.spz` has no browser renderer)
//! - mesh: three.js GLTF viewer with orbit controls
//! - panorama: Photo Sphere Viewer
//!
//! When the requested asset is missing, a page pointing to the hosted
//! Marble viewer is produced instead.

mod render;

pub use render::{escape_html, render_viewer, safe_file_stem, write_viewer, ViewerError, ViewerPage};

/// Subdirectory of the output root holding viewer pages.
pub const VIEWER_DIR: &str = "worldlabs_viewers";
