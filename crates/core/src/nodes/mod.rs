//! Node registry.
//!
//! Describes the operations a visual host can invoke, with their inputs,
//! defaults and ranges. The server exposes each node as an endpoint.

mod types;

pub use types::*;

use crate::orchestrator::{WorldModel, MAX_WAIT_RANGE_SECS, POLL_INTERVAL_RANGE_SECS};
use crate::world::{SplatQuality, ViewerKind};

pub const GENERATE_WORLD: &str = "WorldLabsGenerateWorld";
pub const WORLD_INFO: &str = "WorldLabsWorldInfo";
pub const DOWNLOAD_ASSET: &str = "WorldLabsDownloadAsset";
pub const VIEWER: &str = "WorldLabsViewer";

pub const DEFAULT_DOWNLOAD_FILENAME: &str = "world_asset";
pub const DEFAULT_DOWNLOAD_SUBFOLDER: &str = "worldlabs";

/// All registered nodes.
pub fn registry() -> Vec<NodeDescriptor> {
    vec![
        generate_world(),
        world_info(),
        download_asset(),
        viewer(),
    ]
}

/// Look up a node by id.
pub fn find(id: &str) -> Option<NodeDescriptor> {
    registry().into_iter().find(|n| n.id == id)
}

fn generate_world() -> NodeDescriptor {
    NodeDescriptor {
        id: GENERATE_WORLD,
        display_name: "Generate World (World Labs)",
        category: NODE_CATEGORY,
        inputs: vec![
            NodeInput::new("image", ValueKind::Image),
            NodeInput::new("display_name", ValueKind::String).default_value("My World"),
            NodeInput::new("model", ValueKind::Choice)
                .choices(WorldModel::ALL.iter().map(WorldModel::as_str))
                .default_value(WorldModel::default().as_str()),
            NodeInput::new("is_panorama", ValueKind::Boolean).default_value(false),
            NodeInput::new("poll_interval", ValueKind::Int)
                .default_value(15)
                .range(
                    *POLL_INTERVAL_RANGE_SECS.start() as i64,
                    *POLL_INTERVAL_RANGE_SECS.end() as i64,
                    1,
                ),
            NodeInput::new("max_wait_time", ValueKind::Int)
                .default_value(600)
                .range(
                    *MAX_WAIT_RANGE_SECS.start() as i64,
                    *MAX_WAIT_RANGE_SECS.end() as i64,
                    10,
                ),
            NodeInput::new("api_key", ValueKind::String)
                .default_value("")
                .optional(),
            NodeInput::new("text_prompt", ValueKind::String)
                .default_value("")
                .multiline()
                .optional(),
        ],
        outputs: vec![
            NodeOutput::new("world_data", ValueKind::WorldlabsWorld),
            NodeOutput::new("world_id", ValueKind::String),
            NodeOutput::new("marble_url", ValueKind::String),
            NodeOutput::new("thumbnail_url", ValueKind::String),
        ],
        output_node: false,
    }
}

fn world_info() -> NodeDescriptor {
    NodeDescriptor {
        id: WORLD_INFO,
        display_name: "World Info (World Labs)",
        category: NODE_CATEGORY,
        inputs: vec![NodeInput::new("world_data", ValueKind::WorldlabsWorld)],
        outputs: ["splat_100k_url", "splat_500k_url", "splat_full_url", "mesh_url", "pano_url"]
            .into_iter()
            .map(|name| NodeOutput::new(name, ValueKind::String))
            .collect(),
        output_node: false,
    }
}

fn download_asset() -> NodeDescriptor {
    NodeDescriptor {
        id: DOWNLOAD_ASSET,
        display_name: "Download Asset (World Labs)",
        category: NODE_CATEGORY,
        inputs: vec![
            NodeInput::new("asset_url", ValueKind::String).default_value(""),
            NodeInput::new("filename", ValueKind::String)
                .default_value(DEFAULT_DOWNLOAD_FILENAME)
                .optional(),
            NodeInput::new("subfolder", ValueKind::String)
                .default_value(DEFAULT_DOWNLOAD_SUBFOLDER)
                .optional(),
        ],
        outputs: vec![NodeOutput::new("file_path", ValueKind::String)],
        output_node: true,
    }
}

fn viewer() -> NodeDescriptor {
    NodeDescriptor {
        id: VIEWER,
        display_name: "3D Viewer (World Labs)",
        category: NODE_CATEGORY,
        inputs: vec![
            NodeInput::new("world_data", ValueKind::WorldlabsWorld),
            NodeInput::new("quality", ValueKind::Choice)
                .choices(SplatQuality::ALL.iter().map(SplatQuality::as_str))
                .default_value(SplatQuality::default().as_str()),
            NodeInput::new("viewer_type", ValueKind::Choice)
                .choices(ViewerKind::ALL.iter().map(ViewerKind::as_str))
                .default_value(ViewerKind::default().as_str()),
        ],
        outputs: vec![],
        output_node: true,
    }
}
