use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

use crate::world::{AssetKind, SplatQuality, ViewerKind, World};

const SPLAT_TEMPLATE: &str = include_str!("templates/splat.html");
const MESH_TEMPLATE: &str = include_str!("templates/mesh.html");
const PANORAMA_TEMPLATE: &str = include_str!("templates/panorama.html");
const UNAVAILABLE_TEMPLATE: &str = include_str!("templates/unavailable.html");

/// Errors writing a viewer page.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write viewer page {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A rendered page, not yet on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewerPage {
    pub file_name: String,
    pub html: String,
    /// `None` when the page is the "asset unavailable" fallback.
    pub asset_url: Option<String>,
}

impl ViewerPage {
    pub fn asset_available(&self) -> bool {
        self.asset_url.is_some()
    }
}

/// Render the viewer page for `world`.
pub fn render_viewer(world: &World, kind: ViewerKind, quality: SplatQuality) -> ViewerPage {
    let world_name = world.name_or_default();
    let file_name = format!(
        "{}_{}_{}_{}.html",
        safe_file_stem(world_name),
        kind,
        quality,
        world.world_id().unwrap_or_default().chars().take(8).collect::<String>()
    );

    let marble_url = world.marble_url();
    let asset_url = world.asset_url(AssetKind::for_viewer(kind, quality));

    let html = match asset_url {
        Some(url) => {
            let template = match kind {
                ViewerKind::Splat => SPLAT_TEMPLATE,
                ViewerKind::Mesh => MESH_TEMPLATE,
                ViewerKind::Panorama => PANORAMA_TEMPLATE,
            };
            fill(
                template,
                &[
                    ("world_name", escape_html(world_name)),
                    ("asset_url", escape_html(url)),
                    ("asset_url_js", js_string(url)),
                    ("marble_button", marble_button(marble_url, kind)),
                ],
            )
        }
        None => {
            warn!(
                "No asset URL for {} at quality {}; available asset categories: {:?}",
                kind,
                quality,
                world.asset_categories()
            );
            fill(
                UNAVAILABLE_TEMPLATE,
                &[
                    ("world_name", escape_html(world_name)),
                    ("viewer_type", kind.to_string()),
                    ("quality", quality.to_string()),
                    ("marble_button", marble_button(marble_url, kind)),
                ],
            )
        }
    };

    ViewerPage {
        file_name,
        html,
        asset_url: asset_url.map(str::to_string),
    }
}

/// Write `page` into `dir`, creating it if needed.
pub async fn write_viewer(dir: &Path, page: &ViewerPage) -> Result<PathBuf, ViewerError> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| ViewerError::DirectoryCreationFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let path = dir.join(&page.file_name);
    fs::write(&path, page.html.as_bytes())
        .await
        .map_err(|e| ViewerError::WriteFailed {
            path: path.clone(),
            source: e,
        })?;

    info!("Viewer page written: {}", path.display());
    Ok(path)
}

/// Keep alphanumerics, space, `-` and `_`; trim; spaces become `_`.
pub fn safe_file_stem(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A JavaScript string literal safe to place inside a `<script>` element.
fn js_string(s: &str) -> String {
    Value::String(s.to_string())
        .to_string()
        .replace("</", "<\\/")
}

fn marble_button(marble_url: Option<&str>, kind: ViewerKind) -> String {
    match (marble_url, kind) {
        (None, _) => String::new(),
        (Some(url), ViewerKind::Splat) => format!(
            r#"<a href="{}" class="btn" target="_blank">View in Marble</a>"#,
            escape_html(url)
        ),
        (Some(url), _) => format!(
            r#"<p><strong>View your world in the Marble web viewer:</strong></p><a href="{}" target="_blank">Open in Marble</a>"#,
            escape_html(url)
        ),
    }
}

/// Single-pass `{{key}}` substitution; substituted values are never rescanned.
fn fill(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match vars.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
