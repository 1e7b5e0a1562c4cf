use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use worldforge_core::{
    viewer::VIEWER_DIR, AssetDownloader, Config, GenerationEvent, SanitizedConfig, WorldApi,
    WorldGenerator,
};

/// Shared application state
pub struct AppState {
    config: Config,
    world_api: Arc<dyn WorldApi>,
    downloader: AssetDownloader,
}

impl AppState {
    pub fn new(config: Config, world_api: Arc<dyn WorldApi>, downloader: AssetDownloader) -> Self {
        Self {
            config,
            world_api,
            downloader,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// A fresh generator for one invocation, logging its progress.
    pub fn generator(&self) -> WorldGenerator {
        WorldGenerator::new(Arc::clone(&self.world_api)).with_observer(Arc::new(
            |event: &GenerationEvent| match event {
                GenerationEvent::Progress { percent } => info!("Generation progress: {}%", percent),
                GenerationEvent::Waiting { elapsed_secs } => {
                    info!("Waiting for generation ({}s elapsed)", elapsed_secs)
                }
                _ => {}
            },
        ))
    }

    pub fn downloader(&self) -> &AssetDownloader {
        &self.downloader
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output.dir
    }

    /// Directory holding generated viewer pages, served under `/viewers`.
    pub fn viewer_dir(&self) -> PathBuf {
        self.config.output.dir.join(VIEWER_DIR)
    }
}
