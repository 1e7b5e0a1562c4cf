//! World generation runner.
//!
//! Drives one generation job through its lifecycle:
//! prepare upload -> upload -> submit -> poll until a terminal state.
//! Each step waits for the previous one. Nothing is retried; the first
//! failure ends the run.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::asset::ImageAsset;
use crate::credentials::ApiKey;
use crate::marble::{GenerateWorldRequest, OperationId, PrepareUploadRequest, UploadTicket, WorldApi};
use crate::metrics;
use crate::world::World;

use super::config::{GenerationParams, PollPolicy};
use super::types::{
    GenerationError, GenerationEvent, GenerationObserver, GenerationOutcome, OperationState,
};

/// Runs world generation jobs against a [`WorldApi`].
///
/// Holds no per-run state: every call to [`run`](Self::run) is independent.
pub struct WorldGenerator {
    api: Arc<dyn WorldApi>,
    observer: Option<GenerationObserver>,
}

impl WorldGenerator {
    pub fn new(api: Arc<dyn WorldApi>) -> Self {
        Self {
            api,
            observer: None,
        }
    }

    /// Attach an observer for progress notifications.
    pub fn with_observer(mut self, observer: GenerationObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Generate a world and return only its payload.
    pub async fn generate(
        &self,
        asset: ImageAsset,
        params: &GenerationParams,
        key: &ApiKey,
        policy: PollPolicy,
    ) -> Result<World, GenerationError> {
        self.run(asset, params, key, policy)
            .await
            .map(|outcome| outcome.world)
    }

    /// Generate a world.
    pub async fn run(
        &self,
        asset: ImageAsset,
        params: &GenerationParams,
        key: &ApiKey,
        policy: PollPolicy,
    ) -> Result<GenerationOutcome, GenerationError> {
        let started = Instant::now();
        let result = self.run_steps(asset, params, key, policy).await;

        let label = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        metrics::GENERATIONS_TOTAL.with_label_values(&[label]).inc();
        metrics::GENERATION_DURATION
            .with_label_values(&[label])
            .observe(started.elapsed().as_secs_f64());

        if let Err(e) = &result {
            warn!("World generation failed ({}): {}", label, e);
        }
        result
    }

    async fn run_steps(
        &self,
        asset: ImageAsset,
        params: &GenerationParams,
        key: &ApiKey,
        policy: PollPolicy,
    ) -> Result<GenerationOutcome, GenerationError> {
        let ticket = self.prepare_upload(key, &asset).await?;
        let media_asset_id = ticket.media_asset_id.clone();

        self.upload(ticket, asset).await?;

        let operation_id = self.submit(key, &media_asset_id, params).await?;

        let (world, polls, elapsed) = self.poll_until_done(key, &operation_id, policy).await?;

        info!(
            "World generation complete: operation={}, world_id={}, polls={}",
            operation_id,
            world.world_id().unwrap_or("<none>"),
            polls
        );
        self.notify(GenerationEvent::Completed {
            operation_id: operation_id.to_string(),
            polls,
        });

        Ok(GenerationOutcome {
            operation_id,
            world,
            polls,
            elapsed,
            completed_at: Utc::now(),
        })
    }

    async fn prepare_upload(
        &self,
        key: &ApiKey,
        asset: &ImageAsset,
    ) -> Result<UploadTicket, GenerationError> {
        let request = PrepareUploadRequest::image(asset.file_name(), asset.format().extension());
        info!("Preparing upload for {}", request.file_name);

        let response = self.api.prepare_upload(key, &request).await?;
        let ticket = UploadTicket::try_from(response)?;

        info!("Media asset id: {}", ticket.media_asset_id);
        self.notify(GenerationEvent::UploadPrepared {
            media_asset_id: ticket.media_asset_id.clone(),
        });
        Ok(ticket)
    }

    /// Consumes both the ticket and the image bytes.
    async fn upload(&self, ticket: UploadTicket, asset: ImageAsset) -> Result<(), GenerationError> {
        let bytes = asset.len();
        info!("Uploading image ({} bytes)", bytes);

        self.api.upload(&ticket, asset).await?;

        info!("Image uploaded");
        self.notify(GenerationEvent::Uploaded { bytes });
        Ok(())
    }

    async fn submit(
        &self,
        key: &ApiKey,
        media_asset_id: &str,
        params: &GenerationParams,
    ) -> Result<OperationId, GenerationError> {
        let request = GenerateWorldRequest::from_media_asset(
            params.display_name.clone(),
            params.model,
            media_asset_id,
            params.is_panorama,
            params.text_prompt.as_deref(),
        );
        info!(
            "Starting world generation: model={}, display_name='{}', panorama={}",
            params.model, params.display_name, params.is_panorama
        );
        if let Some(prompt) = &request.world_prompt.text_prompt {
            debug!("Text prompt: {}", prompt);
        }

        let response = self.api.generate(key, &request).await?;
        let operation_id = response
            .operation_id
            .filter(|id| !id.is_empty())
            .map(OperationId::new)
            .ok_or_else(|| {
                GenerationError::Protocol("generate response missing operation_id".to_string())
            })?;

        info!("Generation started: operation={}", operation_id);
        self.notify(GenerationEvent::Submitted {
            operation_id: operation_id.to_string(),
        });
        Ok(operation_id)
    }

    /// Poll until the job reaches a terminal state or the deadline passes.
    ///
    /// The deadline is checked before each status request, never mid-flight.
    async fn poll_until_done(
        &self,
        key: &ApiKey,
        operation_id: &OperationId,
        policy: PollPolicy,
    ) -> Result<(World, u32, std::time::Duration), GenerationError> {
        let started = Instant::now();
        let mut polls: u32 = 0;
        let mut last_progress: Option<f64> = None;

        loop {
            let elapsed = started.elapsed();
            if elapsed > policy.max_wait {
                return Err(GenerationError::Timeout {
                    operation_id: operation_id.to_string(),
                    max_wait: policy.max_wait,
                });
            }

            let snapshot = self.api.get_operation(key, operation_id).await?;
            polls += 1;
            metrics::OPERATION_POLLS_TOTAL.inc();

            match OperationState::from_snapshot(snapshot)? {
                OperationState::Pending { progress } => {
                    if let Some(percent) = progress {
                        if last_progress.is_none_or(|last| percent > last) {
                            last_progress = Some(percent);
                            info!("Progress: {}%", percent);
                            self.notify(GenerationEvent::Progress { percent });
                        }
                    }

                    debug!(
                        "Operation {} pending ({}s elapsed)",
                        operation_id,
                        elapsed.as_secs()
                    );
                    self.notify(GenerationEvent::Waiting {
                        elapsed_secs: elapsed.as_secs(),
                    });
                    sleep(policy.poll_interval).await;
                }
                OperationState::DoneError(error) => {
                    return Err(GenerationError::RemoteJob { error });
                }
                OperationState::DoneOk(world) => {
                    return Ok((world, polls, started.elapsed()));
                }
            }
        }
    }

    fn notify(&self, event: GenerationEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }
}
