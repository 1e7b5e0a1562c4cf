pub mod asset;
pub mod config;
pub mod credentials;
pub mod download;
pub mod marble;
pub mod metrics;
pub mod nodes;
pub mod orchestrator;
pub mod testing;
pub mod viewer;
pub mod world;

pub use asset::{ImageAsset, ImageFormat};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use credentials::ApiKey;
pub use download::{AssetDownloader, DownloadError, DownloadedAsset};
pub use marble::{MarbleClient, OperationId, WorldApi};
pub use nodes::{registry, NodeDescriptor};
pub use orchestrator::{
    GenerationError, GenerationEvent, GenerationObserver, GenerationOutcome, GenerationParams,
    OperationState, PollPolicy, WorldGenerator, WorldModel,
};
pub use viewer::{render_viewer, write_viewer, ViewerError, ViewerPage};
pub use world::{AssetKind, AssetUrls, SplatQuality, ViewerKind, World};
