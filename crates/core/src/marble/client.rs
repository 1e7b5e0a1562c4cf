//! HTTP client for the Marble API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{
    GenerateWorldRequest, GenerateWorldResponse, OperationId, OperationSnapshot,
    PrepareUploadRequest, PrepareUploadResponse, UploadTicket,
};
use super::WorldApi;
use crate::asset::ImageAsset;
use crate::config::MarbleConfig;
use crate::credentials::ApiKey;
use crate::orchestrator::GenerationError;

/// Header carrying the API key on control-plane requests.
pub const API_KEY_HEADER: &str = "WLT-Api-Key";

/// Marble API client.
pub struct MarbleClient {
    client: Client,
    base_url: String,
}

impl MarbleClient {
    /// Create a new client from config.
    pub fn new(config: &MarbleConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, T>(
        &self,
        endpoint: &'static str,
        key: &ApiKey,
        body: &B,
    ) -> Result<T, GenerationError>
    where
        B: serde::Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, key.expose())
            .json(body)
            .send()
            .await?;

        parse_json(endpoint, ensure_success(endpoint, response).await?).await
    }
}

/// Turn a non-success control-plane response into [`GenerationError::Api`].
async fn ensure_success(
    endpoint: &'static str,
    response: Response,
) -> Result<Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(GenerationError::Api {
        endpoint,
        status: status.as_u16(),
        message,
    })
}

async fn parse_json<T: DeserializeOwned>(
    endpoint: &'static str,
    response: Response,
) -> Result<T, GenerationError> {
    response.json().await.map_err(|e| {
        GenerationError::Protocol(format!("failed to parse {} response: {}", endpoint, e))
    })
}

fn upload_headers(
    ticket: &UploadTicket,
    content_type: &'static str,
) -> Result<HeaderMap, GenerationError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));

    // Required headers come last so they may override the content type.
    for (name, value) in &ticket.required_headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            GenerationError::Protocol(format!("invalid required header name {:?}: {}", name, e))
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            GenerationError::Protocol(format!("invalid value for required header {}: {}", name, e))
        })?;
        headers.insert(name, value);
    }

    Ok(headers)
}

#[async_trait]
impl WorldApi for MarbleClient {
    async fn prepare_upload(
        &self,
        key: &ApiKey,
        request: &PrepareUploadRequest,
    ) -> Result<PrepareUploadResponse, GenerationError> {
        debug!("Marble prepare upload: file_name='{}'", request.file_name);
        self.post_json("media-assets:prepare_upload", key, request)
            .await
    }

    async fn upload(
        &self,
        ticket: &UploadTicket,
        asset: ImageAsset,
    ) -> Result<(), GenerationError> {
        let headers = upload_headers(ticket, asset.format().mime_type())?;
        debug!(
            "Marble upload: {} bytes for media asset {}",
            asset.len(),
            ticket.media_asset_id
        );

        let response = self
            .client
            .put(&ticket.upload_url)
            .headers(headers)
            .body(asset.into_bytes())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Transfer {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    async fn generate(
        &self,
        key: &ApiKey,
        request: &GenerateWorldRequest,
    ) -> Result<GenerateWorldResponse, GenerationError> {
        debug!(
            "Marble generate: display_name='{}', model={}",
            request.display_name, request.model
        );
        self.post_json("worlds:generate", key, request).await
    }

    async fn get_operation(
        &self,
        key: &ApiKey,
        operation_id: &OperationId,
    ) -> Result<OperationSnapshot, GenerationError> {
        let url = format!(
            "{}/operations/{}",
            self.base_url,
            urlencoding::encode(operation_id.as_str())
        );

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, key.expose())
            .send()
            .await?;

        parse_json("operations", ensure_success("operations", response).await?).await
    }
}
