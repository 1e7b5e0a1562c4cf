use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, nodes};
use crate::state::AppState;

/// Upper bound for uploaded input images.
const MAX_IMAGE_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    let viewer_dir = state.viewer_dir();

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Node registry and invocation
        .route("/nodes", get(handlers::list_nodes))
        .route(
            "/nodes/generate-world",
            post(nodes::generate_world).layer(DefaultBodyLimit::max(MAX_IMAGE_UPLOAD_BYTES)),
        )
        .route("/nodes/world-info", post(nodes::world_info))
        .route("/nodes/download-asset", post(nodes::download_asset))
        .route("/nodes/viewer", post(nodes::viewer))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        // Generated viewer pages
        .nest_service("/viewers", ServeDir::new(viewer_dir))
        .route_layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
