//! Node invocation endpoints.

use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use worldforge_core::{
    nodes::{DEFAULT_DOWNLOAD_FILENAME, DEFAULT_DOWNLOAD_SUBFOLDER},
    render_viewer, write_viewer, ApiKey, AssetUrls, DownloadError, GenerationError,
    GenerationParams, ImageAsset, PollPolicy, SplatQuality, ViewerError, ViewerKind, World,
    WorldModel,
};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Error kind label, e.g. `timeout` or `remote_job`.
    pub kind: String,
    /// Server-supplied error payload, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, kind: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            kind: kind.to_string(),
            detail: None,
        }),
    )
}

#[derive(Debug, Serialize)]
pub struct GenerateWorldResponse {
    pub world_data: World,
    pub world_id: String,
    pub marble_url: String,
    pub thumbnail_url: String,
    pub operation_id: String,
    pub polls: u32,
}

#[derive(Debug, Deserialize)]
pub struct WorldInfoRequest {
    pub world_data: World,
}

#[derive(Debug, Deserialize)]
pub struct DownloadAssetRequest {
    pub asset_url: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub subfolder: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DownloadAssetResponse {
    pub file_path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

#[derive(Debug, Deserialize)]
pub struct ViewerRequest {
    pub world_data: World,
    #[serde(default)]
    pub quality: SplatQuality,
    #[serde(default)]
    pub viewer_type: ViewerKind,
}

#[derive(Debug, Serialize)]
pub struct ViewerResponse {
    pub file_path: PathBuf,
    pub viewer_url: String,
    pub asset_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_url: Option<String>,
}

// ============================================================================
// Error mapping
// ============================================================================

fn generation_error(err: GenerationError) -> ApiError {
    let status = match &err {
        GenerationError::Configuration(_) => StatusCode::BAD_REQUEST,
        GenerationError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        GenerationError::Protocol(_)
        | GenerationError::Transfer { .. }
        | GenerationError::RemoteJob { .. }
        | GenerationError::Api { .. }
        | GenerationError::Http(_) => StatusCode::BAD_GATEWAY,
    };
    let detail = match &err {
        GenerationError::RemoteJob { error } => Some(error.clone()),
        _ => None,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            kind: err.kind().to_string(),
            detail,
        }),
    )
}

fn download_error(err: DownloadError) -> ApiError {
    let (status, kind) = match &err {
        DownloadError::EmptyUrl | DownloadError::InvalidFileName { .. } => {
            (StatusCode::BAD_REQUEST, "configuration")
        }
        DownloadError::Status { .. } | DownloadError::Http(_) => {
            (StatusCode::BAD_GATEWAY, "download")
        }
        DownloadError::DirectoryCreationFailed { .. } | DownloadError::WriteFailed { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "io")
        }
    };
    api_error(status, kind, err.to_string())
}

fn viewer_error(err: ViewerError) -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "io", err.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// Raw multipart fields of a generate-world invocation.
#[derive(Debug, Default)]
struct GenerateForm {
    image: Option<Vec<u8>>,
    display_name: Option<String>,
    model: Option<String>,
    is_panorama: Option<String>,
    poll_interval: Option<String>,
    max_wait_time: Option<String>,
    api_key: Option<String>,
    text_prompt: Option<String>,
}

async fn read_generate_form(mut multipart: Multipart) -> Result<GenerateForm, ApiError> {
    let mut form = GenerateForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(api_error(
                    StatusCode::BAD_REQUEST,
                    "configuration",
                    format!("Invalid multipart body: {}", e),
                ))
            }
        };
        let name = field.name().unwrap_or("").to_string();

        if name == "image" {
            let bytes = field.bytes().await.map_err(|e| {
                api_error(
                    StatusCode::BAD_REQUEST,
                    "configuration",
                    format!("Failed to read image: {}", e),
                )
            })?;
            form.image = Some(bytes.to_vec());
            continue;
        }

        let text = field.text().await.map_err(|e| {
            api_error(
                StatusCode::BAD_REQUEST,
                "configuration",
                format!("Failed to read field {}: {}", name, e),
            )
        })?;
        let slot = match name.as_str() {
            "display_name" => &mut form.display_name,
            "model" => &mut form.model,
            "is_panorama" => &mut form.is_panorama,
            "poll_interval" => &mut form.poll_interval,
            "max_wait_time" => &mut form.max_wait_time,
            "api_key" => &mut form.api_key,
            "text_prompt" => &mut form.text_prompt,
            _ => continue,
        };
        *slot = Some(text);
    }

    Ok(form)
}

fn parse_secs(field: &str, value: Option<&str>, default: u64) -> Result<u64, GenerationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| {
            GenerationError::Configuration(format!("{} must be a whole number of seconds", field))
        }),
    }
}

fn parse_flag(value: Option<&str>) -> Result<bool, GenerationError> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("0") | Some("off") => Ok(false),
        Some("true") | Some("1") | Some("on") => Ok(true),
        Some(other) => Err(GenerationError::Configuration(format!(
            "is_panorama must be a boolean, got {:?}",
            other
        ))),
    }
}

/// Validate the form against node ranges and resolve the API key.
fn build_invocation(
    state: &AppState,
    form: GenerateForm,
) -> Result<(ImageAsset, GenerationParams, ApiKey, PollPolicy), GenerationError> {
    let defaults = &state.config().generation;

    let bytes = form
        .image
        .ok_or_else(|| GenerationError::Configuration("missing image part".to_string()))?;
    let asset = ImageAsset::from_bytes(bytes)?;

    let model = match form.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        Some(m) => WorldModel::from_str(m)?,
        None => defaults.model,
    };

    let policy = PollPolicy::from_node_inputs(
        parse_secs(
            "poll_interval",
            form.poll_interval.as_deref(),
            defaults.poll_interval_secs,
        )?,
        parse_secs(
            "max_wait_time",
            form.max_wait_time.as_deref(),
            defaults.max_wait_secs,
        )?,
    )?;

    let key = ApiKey::resolve(
        form.api_key.as_deref(),
        state.config().marble.api_key.as_deref(),
    )?;

    let mut params = GenerationParams {
        model,
        is_panorama: parse_flag(form.is_panorama.as_deref())?,
        text_prompt: form.text_prompt.filter(|p| !p.trim().is_empty()),
        ..Default::default()
    };
    if let Some(name) = form.display_name.filter(|n| !n.trim().is_empty()) {
        params.display_name = name;
    }

    Ok((asset, params, key, policy))
}

/// POST /nodes/generate-world
pub async fn generate_world(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<GenerateWorldResponse>, ApiError> {
    let form = read_generate_form(multipart).await?;
    let (asset, params, key, policy) =
        build_invocation(&state, form).map_err(generation_error)?;

    let outcome = state
        .generator()
        .run(asset, &params, &key, policy)
        .await
        .map_err(generation_error)?;

    let world = outcome.world;
    Ok(Json(GenerateWorldResponse {
        world_id: world.world_id().unwrap_or_default().to_string(),
        marble_url: world.marble_url().unwrap_or_default().to_string(),
        thumbnail_url: world.thumbnail_url().unwrap_or_default().to_string(),
        operation_id: outcome.operation_id.to_string(),
        polls: outcome.polls,
        world_data: world,
    }))
}

/// POST /nodes/world-info
pub async fn world_info(Json(request): Json<WorldInfoRequest>) -> Json<AssetUrls> {
    let urls = request.world_data.asset_urls();
    for (label, url) in urls.available() {
        info!("{}: {}", label, url);
    }
    Json(urls)
}

/// Resolve a download subfolder under the output root. Only plain relative
/// components are accepted.
fn resolve_subfolder(root: &Path, subfolder: &str) -> Result<PathBuf, ApiError> {
    let sub = Path::new(subfolder.trim());
    if !sub.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "configuration",
            format!("Invalid subfolder: {}", subfolder),
        ));
    }
    Ok(root.join(sub))
}

/// POST /nodes/download-asset
pub async fn download_asset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DownloadAssetRequest>,
) -> Result<Json<DownloadAssetResponse>, ApiError> {
    let subfolder = request
        .subfolder
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_SUBFOLDER.to_string());
    let dest_dir = resolve_subfolder(state.output_dir(), &subfolder)?;
    let filename = request
        .filename
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_FILENAME.to_string());

    let asset = state
        .downloader()
        .download(&request.asset_url, &dest_dir, &filename)
        .await
        .map_err(download_error)?;

    Ok(Json(DownloadAssetResponse {
        file_path: asset.path,
        bytes: asset.bytes,
        sha256: asset.sha256,
    }))
}

/// POST /nodes/viewer
pub async fn viewer(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ViewerRequest>,
) -> Result<Json<ViewerResponse>, ApiError> {
    let page = render_viewer(&request.world_data, request.viewer_type, request.quality);
    let file_path = write_viewer(&state.viewer_dir(), &page)
        .await
        .map_err(viewer_error)?;

    info!(
        "Viewer ready: type={}, quality={}, world='{}'",
        request.viewer_type,
        request.quality,
        request.world_data.name_or_default()
    );

    Ok(Json(ViewerResponse {
        file_path,
        viewer_url: format!("/viewers/{}", page.file_name),
        asset_available: page.asset_available(),
        asset_url: page.asset_url,
    }))
}
