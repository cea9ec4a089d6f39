//! Server access for the chat client.
//!
//! [`ChatBackend`] is the seam between the controller and the network; the
//! production implementation is [`HttpBackend`], tests substitute scripted
//! doubles.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use tracing::debug;

use crate::api::{
    ChatRequest, ImagineRequest, ImagineResponse, PingResponse, CHAT_ENDPOINT, FORGET_ENDPOINT,
    IMAGINE_ENDPOINT, PINGS_ENDPOINT,
};
use crate::core::error::ClientError;
use crate::utils::url::construct_api_url;

/// Raw body chunks of a streamed chat reply.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, ClientError>> + Send>>;

pub enum ChatReply {
    /// 2xx: the body will be read incrementally.
    Streaming(ChunkStream),
    /// Non-2xx: the turn is over; `status_text` is the HTTP reason phrase.
    Rejected { status_text: String },
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, message: &str) -> Result<ChatReply, ClientError>;

    /// Request a single generated image. The reply is decoded whatever the
    /// HTTP status, since failures are reported as `{"error": ...}`.
    async fn imagine(&self, prompt: &str) -> Result<ImagineResponse, ClientError>;

    async fn pings(&self) -> Result<PingResponse, ClientError>;

    /// Ask the server to forget everything. `Ok(false)` means the server
    /// answered with a non-success status.
    async fn forget(&self) -> Result<bool, ClientError>;
}

fn status_text(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_owned)
        .unwrap_or_else(|| status.as_str().to_owned())
}

#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        construct_api_url(&self.base_url, path)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn chat(&self, message: &str) -> Result<ChatReply, ClientError> {
        let url = self.endpoint(CHAT_ENDPOINT);
        debug!(%url, "opening chat stream");
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&ChatRequest {
                message: message.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "chat request rejected");
            return Ok(ChatReply::Rejected {
                status_text: status_text(status),
            });
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ClientError::from));
        Ok(ChatReply::Streaming(Box::pin(body)))
    }

    async fn imagine(&self, prompt: &str) -> Result<ImagineResponse, ClientError> {
        let url = self.endpoint(IMAGINE_ENDPOINT);
        debug!(%url, "requesting image");
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&ImagineRequest {
                prompt: prompt.to_string(),
            })
            .send()
            .await?;
        debug!(status = %response.status(), "image reply received");
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn pings(&self) -> Result<PingResponse, ClientError> {
        let response = self.client.get(self.endpoint(PINGS_ENDPOINT)).send().await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn forget(&self) -> Result<bool, ClientError> {
        let url = self.endpoint(FORGET_ENDPOINT);
        debug!(%url, "requesting memory wipe");
        let response = self.client.post(url).send().await?;
        Ok(response.status().is_success())
    }
}
