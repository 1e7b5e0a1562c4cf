//! Mock Marble API for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use crate::asset::ImageAsset;
use crate::credentials::ApiKey;
use crate::marble::{
    GenerateWorldRequest, GenerateWorldResponse, MediaAsset, OperationId, OperationSnapshot,
    PrepareUploadRequest, PrepareUploadResponse, UploadInfo, UploadTicket, WorldApi,
};
use crate::orchestrator::GenerationError;

/// Protocol step, for error injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockStep {
    PrepareUpload,
    Upload,
    Generate,
    GetOperation,
}

/// A recorded call for test assertions.
#[derive(Debug, Clone)]
pub enum RecordedCall {
    PrepareUpload {
        api_key: String,
        request: PrepareUploadRequest,
    },
    Upload {
        media_asset_id: String,
        upload_url: String,
        bytes: usize,
        content_type: &'static str,
    },
    Generate {
        api_key: String,
        request: GenerateWorldRequest,
    },
    GetOperation {
        operation_id: String,
        /// Clock reading when the request arrived.
        at: Instant,
    },
}

/// Mock implementation of the [`WorldApi`] trait.
///
/// Provides controllable behavior for testing:
/// - Valid prepare/generate responses with fresh ids by default
/// - A queue of scripted status snapshots
/// - Recorded calls for assertions
/// - One-shot error injection per step
///
/// # Example
///
/// ```rust,ignore
/// use worldforge_core::testing::{fixtures, MockWorldApi};
///
/// let api = MockWorldApi::new();
/// api.push_snapshots([fixtures::pending(Some(50.0)), fixtures::done_ok(fixtures::world_payload("w-1"))]).await;
/// ```
#[derive(Debug)]
pub struct MockWorldApi {
    prepare_response: Arc<RwLock<Option<PrepareUploadResponse>>>,
    generate_response: Arc<RwLock<Option<GenerateWorldResponse>>>,
    required_headers: Arc<RwLock<Vec<(String, String)>>>,
    snapshots: Arc<RwLock<VecDeque<OperationSnapshot>>>,
    /// Returned once the queue is exhausted.
    fallback_snapshot: Arc<RwLock<OperationSnapshot>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    issued_ids: Arc<RwLock<Vec<String>>>,
    failures: Arc<RwLock<HashMap<MockStep, GenerationError>>>,
}

impl Default for MockWorldApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWorldApi {
    pub fn new() -> Self {
        Self {
            prepare_response: Arc::new(RwLock::new(None)),
            generate_response: Arc::new(RwLock::new(None)),
            required_headers: Arc::new(RwLock::new(Vec::new())),
            snapshots: Arc::new(RwLock::new(VecDeque::new())),
            fallback_snapshot: Arc::new(RwLock::new(OperationSnapshot::default())),
            calls: Arc::new(RwLock::new(Vec::new())),
            issued_ids: Arc::new(RwLock::new(Vec::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // =========================================================================
    // Response Configuration
    // =========================================================================

    /// Override the prepare-upload response (e.g. to drop fields).
    pub async fn set_prepare_response(&self, response: PrepareUploadResponse) {
        *self.prepare_response.write().await = Some(response);
    }

    /// Headers included in the default prepare-upload response.
    pub async fn set_required_headers(&self, headers: Vec<(String, String)>) {
        *self.required_headers.write().await = headers;
    }

    /// Override the generate response (e.g. to omit the operation id).
    pub async fn set_generate_response(&self, response: GenerateWorldResponse) {
        *self.generate_response.write().await = Some(response);
    }

    /// Append snapshots to the status queue.
    pub async fn push_snapshots(&self, snapshots: impl IntoIterator<Item = OperationSnapshot>) {
        self.snapshots.write().await.extend(snapshots);
    }

    /// Snapshot returned when the queue is empty. Defaults to pending.
    pub async fn set_fallback_snapshot(&self, snapshot: OperationSnapshot) {
        *self.fallback_snapshot.write().await = snapshot;
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    /// Number of status requests received.
    pub async fn poll_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, RecordedCall::GetOperation { .. }))
            .count()
    }

    /// Operation ids handed out by `generate`, in order.
    pub async fn issued_operation_ids(&self) -> Vec<String> {
        self.issued_ids.read().await.clone()
    }

    /// Clock readings of each status request.
    pub async fn poll_instants(&self) -> Vec<Instant> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                RecordedCall::GetOperation { at, .. } => Some(*at),
                _ => None,
            })
            .collect()
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Make the next call of `step` fail with `error`.
    pub async fn fail_at(&self, step: MockStep, error: GenerationError) {
        self.failures.write().await.insert(step, error);
    }

    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    async fn take_failure(&self, step: MockStep) -> Result<(), GenerationError> {
        match self.failures.write().await.remove(&step) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn record(&self, call: RecordedCall) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl WorldApi for MockWorldApi {
    async fn prepare_upload(
        &self,
        key: &ApiKey,
        request: &PrepareUploadRequest,
    ) -> Result<PrepareUploadResponse, GenerationError> {
        self.record(RecordedCall::PrepareUpload {
            api_key: key.expose().to_string(),
            request: request.clone(),
        })
        .await;
        self.take_failure(MockStep::PrepareUpload).await?;

        if let Some(response) = self.prepare_response.read().await.clone() {
            return Ok(response);
        }

        let media_asset_id = format!("ma-{}", Uuid::new_v4());
        let headers = self.required_headers.read().await.clone();
        Ok(PrepareUploadResponse {
            media_asset: Some(MediaAsset {
                media_asset_id: Some(media_asset_id.clone()),
            }),
            upload_info: Some(UploadInfo {
                upload_url: Some(format!("https://storage.mock/upload/{}", media_asset_id)),
                required_headers: (!headers.is_empty()).then(|| headers.into_iter().collect()),
            }),
        })
    }

    async fn upload(
        &self,
        ticket: &UploadTicket,
        asset: ImageAsset,
    ) -> Result<(), GenerationError> {
        self.record(RecordedCall::Upload {
            media_asset_id: ticket.media_asset_id.clone(),
            upload_url: ticket.upload_url.clone(),
            bytes: asset.len(),
            content_type: asset.format().mime_type(),
        })
        .await;
        self.take_failure(MockStep::Upload).await
    }

    async fn generate(
        &self,
        key: &ApiKey,
        request: &GenerateWorldRequest,
    ) -> Result<GenerateWorldResponse, GenerationError> {
        self.record(RecordedCall::Generate {
            api_key: key.expose().to_string(),
            request: request.clone(),
        })
        .await;
        self.take_failure(MockStep::Generate).await?;

        if let Some(response) = self.generate_response.read().await.clone() {
            return Ok(response);
        }
        let operation_id = format!("op-{}", Uuid::new_v4());
        self.issued_ids.write().await.push(operation_id.clone());
        Ok(GenerateWorldResponse {
            operation_id: Some(operation_id),
        })
    }

    async fn get_operation(
        &self,
        _key: &ApiKey,
        operation_id: &OperationId,
    ) -> Result<OperationSnapshot, GenerationError> {
        self.record(RecordedCall::GetOperation {
            operation_id: operation_id.to_string(),
            at: Instant::now(),
        })
        .await;
        self.take_failure(MockStep::GetOperation).await?;

        let next = self.snapshots.write().await.pop_front();
        match next {
            Some(snapshot) => Ok(snapshot),
            None => Ok(self.fallback_snapshot.read().await.clone()),
        }
    }
}
