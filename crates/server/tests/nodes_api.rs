//! Node endpoint tests against a scripted Marble API.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, Part, TestFixture};
use worldforge_core::testing::RecordedCall;

// ============================================================================
// Service endpoints
// ============================================================================

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/health").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_hides_api_key() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/config").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["marble"]["api_key_configured"], true);
    assert!(!response.text.contains("test-key"));
}

#[tokio::test]
async fn test_list_nodes() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/nodes").await;

    assert_status!(response, StatusCode::OK);
    let ids: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 4);
    assert!(response
        .body
        .as_array()
        .unwrap()
        .iter()
        .all(|n| n["category"] == "WorldLabs"));
}

#[tokio::test]
async fn test_metrics_exposition() {
    let fixture = TestFixture::new();
    fixture.get("/api/v1/health").await;

    let response = fixture.get("/metrics").await;

    assert_status!(response, StatusCode::OK);
    assert!(response.text.contains("worldforge_http_requests_total"));
}

// ============================================================================
// Generate world
// ============================================================================

#[tokio::test]
async fn test_generate_world_returns_payload_and_links() {
    let fixture = TestFixture::new();
    let payload = fixtures::world_payload("w-gen");
    fixture
        .world_api
        .push_snapshots([fixtures::done_ok(payload.clone())])
        .await;
    let image = fixtures::sample_png_bytes();

    let response = fixture
        .post_multipart(
            "/api/v1/nodes/generate-world",
            &[
                Part::File("image", "input.png", &image),
                Part::Text("display_name", "Harbor"),
                Part::Text("model", "Marble 0.1-mini"),
                Part::Text("is_panorama", "true"),
                Part::Text("text_prompt", "foggy morning"),
            ],
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["world_data"], payload);
    assert_eq!(response.body["world_id"], "w-gen");
    assert_eq!(
        response.body["marble_url"],
        "https://marble.worldlabs.ai/world/w-gen"
    );
    assert_eq!(
        response.body["thumbnail_url"],
        "https://cdn.worldlabs.example/w-gen/thumb.jpg"
    );
    assert_eq!(response.body["polls"], 1);

    let calls = fixture.world_api.recorded_calls().await;
    let prepare = calls
        .iter()
        .find_map(|c| match c {
            RecordedCall::PrepareUpload { api_key, request } => Some((api_key, request)),
            _ => None,
        })
        .unwrap();
    assert_eq!(prepare.0, "test-key");
    assert_eq!(prepare.1.extension, "png");

    let generate = calls
        .iter()
        .find_map(|c| match c {
            RecordedCall::Generate { request, .. } => Some(request),
            _ => None,
        })
        .unwrap();
    let body = serde_json::to_value(generate).unwrap();
    assert_eq!(body["display_name"], "Harbor");
    assert_eq!(body["model"], "Marble 0.1-mini");
    assert_eq!(body["world_prompt"]["image_prompt"]["is_pano"], true);
    assert_eq!(body["world_prompt"]["text_prompt"], "foggy morning");
}

#[tokio::test]
async fn test_generate_world_explicit_key_wins() {
    let fixture = TestFixture::new();
    fixture
        .world_api
        .push_snapshots([fixtures::done_ok(fixtures::world_payload("w-key"))])
        .await;
    let image = fixtures::sample_jpeg_bytes();

    let response = fixture
        .post_multipart(
            "/api/v1/nodes/generate-world",
            &[
                Part::File("image", "input.jpg", &image),
                Part::Text("api_key", "  node-key  "),
            ],
        )
        .await;

    assert_status!(response, StatusCode::OK);
    let calls = fixture.world_api.recorded_calls().await;
    match &calls[0] {
        RecordedCall::PrepareUpload { api_key, .. } => assert_eq!(api_key, "node-key"),
        other => panic!("expected prepare call first, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_world_without_key_is_bad_request() {
    let fixture = TestFixture::with_api_key(None);
    let image = fixtures::sample_jpeg_bytes();

    let response = fixture
        .post_multipart(
            "/api/v1/nodes/generate-world",
            &[Part::File("image", "input.jpg", &image)],
        )
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["kind"], "configuration");
    assert!(fixture.world_api.recorded_calls().await.is_empty());
}

#[tokio::test]
async fn test_generate_world_missing_image() {
    let fixture = TestFixture::new();

    let response = fixture
        .post_multipart(
            "/api/v1/nodes/generate-world",
            &[Part::Text("display_name", "No Image")],
        )
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["kind"], "configuration");
}

#[tokio::test]
async fn test_generate_world_unknown_model() {
    let fixture = TestFixture::new();
    let image = fixtures::sample_jpeg_bytes();

    let response = fixture
        .post_multipart(
            "/api/v1/nodes/generate-world",
            &[
                Part::File("image", "input.jpg", &image),
                Part::Text("model", "Marble 9"),
            ],
        )
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(fixture.world_api.recorded_calls().await.is_empty());
}

#[tokio::test]
async fn test_generate_world_poll_interval_out_of_range() {
    let fixture = TestFixture::new();
    let image = fixtures::sample_jpeg_bytes();

    let response = fixture
        .post_multipart(
            "/api/v1/nodes/generate-world",
            &[
                Part::File("image", "input.jpg", &image),
                Part::Text("poll_interval", "1"),
            ],
        )
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("poll_interval"));
}

#[tokio::test]
async fn test_generate_world_remote_failure_carries_detail() {
    let fixture = TestFixture::new();
    fixture
        .world_api
        .push_snapshots([fixtures::done_error(
            json!({"code": "CONTENT_POLICY", "message": "rejected"}),
        )])
        .await;
    let image = fixtures::sample_jpeg_bytes();

    let response = fixture
        .post_multipart(
            "/api/v1/nodes/generate-world",
            &[Part::File("image", "input.jpg", &image)],
        )
        .await;

    assert_status!(response, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["kind"], "remote_job");
    assert_eq!(response.body["detail"]["code"], "CONTENT_POLICY");
}

// ============================================================================
// World info
// ============================================================================

#[tokio::test]
async fn test_world_info_extracts_urls() {
    let fixture = TestFixture::new();

    let response = fixture
        .post(
            "/api/v1/nodes/world-info",
            json!({"world_data": fixtures::world_payload("w-info")}),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    let base = "https://cdn.worldlabs.example/w-info";
    assert_eq!(
        response.body["splat_100k_url"],
        format!("{}/splat_100k.spz", base)
    );
    assert_eq!(
        response.body["splat_full_url"],
        format!("{}/splat_full.spz", base)
    );
    assert_eq!(response.body["mesh_url"], format!("{}/collider.glb", base));
    assert_eq!(response.body["pano_url"], format!("{}/pano.png", base));
}

#[tokio::test]
async fn test_world_info_missing_assets_are_empty() {
    let fixture = TestFixture::new();

    let response = fixture
        .post(
            "/api/v1/nodes/world-info",
            json!({"world_data": {"world_id": "w-bare"}}),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    for field in [
        "splat_100k_url",
        "splat_500k_url",
        "splat_full_url",
        "mesh_url",
        "pano_url",
    ] {
        assert_eq!(response.body[field], "", "field {}", field);
    }
}

// ============================================================================
// Viewer
// ============================================================================

#[tokio::test]
async fn test_viewer_written_and_served() {
    let fixture = TestFixture::new();

    let response = fixture
        .post(
            "/api/v1/nodes/viewer",
            json!({
                "world_data": fixtures::world_payload("w-view"),
                "quality": "500k",
                "viewer_type": "splat"
            }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["asset_available"], true);
    assert_eq!(
        response.body["asset_url"],
        "https://cdn.worldlabs.example/w-view/splat_500k.spz"
    );
    let file_path = std::path::PathBuf::from(response.body["file_path"].as_str().unwrap());
    assert!(file_path.starts_with(fixture.output_dir()));
    assert!(file_path.exists());

    let viewer_url = response.body["viewer_url"].as_str().unwrap().to_string();
    assert!(viewer_url.starts_with("/viewers/"));
    let page = fixture.get(&viewer_url).await;
    assert_status!(page, StatusCode::OK);
    assert!(page.text.contains("splat_500k.spz"));
    assert!(page.text.contains("Test World"));
}

#[tokio::test]
async fn test_viewer_without_asset_renders_notice() {
    let fixture = TestFixture::new();

    let response = fixture
        .post(
            "/api/v1/nodes/viewer",
            json!({
                "world_data": {"world_id": "w-nomesh", "display_name": "Empty"},
                "viewer_type": "mesh"
            }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["asset_available"], false);
    assert!(response.body.get("asset_url").is_none());
    let file_path = std::path::PathBuf::from(response.body["file_path"].as_str().unwrap());
    assert!(file_path.exists());
}

// ============================================================================
// Download asset
// ============================================================================

#[tokio::test]
async fn test_download_asset_empty_url() {
    let fixture = TestFixture::new();

    let response = fixture
        .post("/api/v1/nodes/download-asset", json!({"asset_url": "  "}))
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_asset_rejects_escaping_subfolder() {
    let fixture = TestFixture::new();

    let response = fixture
        .post(
            "/api/v1/nodes/download-asset",
            json!({
                "asset_url": "https://cdn.worldlabs.example/w/splat_100k.spz",
                "subfolder": "../outside"
            }),
        )
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_asset_saves_under_output_dir() {
    let fixture = TestFixture::new();
    let host = start_file_host().await;

    let response = fixture
        .post(
            "/api/v1/nodes/download-asset",
            json!({"asset_url": format!("{}/w/collider.glb", host)}),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    let expected = fixture
        .output_dir()
        .join("worldlabs")
        .join("world_asset.glb");
    assert_eq!(response.body["file_path"], expected.display().to_string());
    assert_eq!(response.body["bytes"], MESH_BYTES.len());
    assert_eq!(std::fs::read(expected).unwrap(), MESH_BYTES);
}

const MESH_BYTES: &[u8] = b"glTF\x02\x00\x00\x00mesh";

async fn start_file_host() -> String {
    use axum::{routing::get, Router};

    let app = Router::new().route("/w/collider.glb", get(|| async { MESH_BYTES }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
