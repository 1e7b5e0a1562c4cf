//! Marble world-generation API.
//!
//! The [`WorldApi`] trait is the seam between the orchestrator and the
//! network: [`MarbleClient`] talks to the real service, and
//! `testing::MockWorldApi` scripts responses in tests.

mod client;
mod types;

pub use client::MarbleClient;
pub use types::*;

use async_trait::async_trait;

use crate::asset::ImageAsset;
use crate::credentials::ApiKey;
use crate::orchestrator::GenerationError;

/// The four calls of the generation protocol.
///
/// Responses are returned as parsed from the wire; checking that required
/// fields are present is the orchestrator's job.
#[async_trait]
pub trait WorldApi: Send + Sync {
    /// Ask for a signed upload destination.
    async fn prepare_upload(
        &self,
        key: &ApiKey,
        request: &PrepareUploadRequest,
    ) -> Result<PrepareUploadResponse, GenerationError>;

    /// PUT the image bytes to the signed URL. Single attempt.
    async fn upload(&self, ticket: &UploadTicket, asset: ImageAsset)
        -> Result<(), GenerationError>;

    /// Submit a generation job.
    async fn generate(
        &self,
        key: &ApiKey,
        request: &GenerateWorldRequest,
    ) -> Result<GenerateWorldResponse, GenerationError>;

    /// Fetch a status snapshot for a submitted job.
    async fn get_operation(
        &self,
        key: &ApiKey,
        operation_id: &OperationId,
    ) -> Result<OperationSnapshot, GenerationError>;
}
