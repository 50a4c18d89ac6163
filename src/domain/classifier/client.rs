use std::sync::Arc;

use reqwest::Client;
use tracing::debug;

use super::dto::{ChatRequest, HttpReply};
use crate::config::ClassifierSettings;
use crate::utils::AppError;

/// HTTP seam of the classifier
///
/// Any HTTP response, whatever its status, comes back as `Ok(HttpReply)`.
/// Only transport failures (connect, timeout, body read) are `Err`, always as
/// `AppError::ClassifyTransient`. Status interpretation is left to the retry policy.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post_chat(&self, request: &ChatRequest) -> Result<HttpReply, AppError>;
}

pub type SharedChatTransport = Arc<dyn ChatTransport>;

/// DeepSeek / OpenAI-compatible chat-completions endpoint
#[derive(Clone)]
pub struct DeepSeekClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl DeepSeekClient {
    pub fn new(settings: &ClassifierSettings) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AppError::internal_error(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: settings.api_url.clone(),
            api_key: settings.api_key.clone(),
        })
    }
}

#[async_trait::async_trait]
impl ChatTransport for DeepSeekClient {
    async fn post_chat(&self, request: &ChatRequest) -> Result<HttpReply, AppError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::transient(format!("request timed out: {}", e))
                } else {
                    AppError::transient(format!("request failed: {}", e))
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::transient(format!("failed to read response body: {}", e)))?;

        debug!(status, body_len = body.len(), "Classifier responded");
        Ok(HttpReply { status, body })
    }
}
