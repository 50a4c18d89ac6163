//! Feishu alert service
//!
//! Pushes reports to a Feishu (Lark) group through a custom-bot webhook as an
//! interactive card: a plain-text header and lark_md sections.

use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::config::FeishuSettings;
use crate::utils::AppError;

/// Report sink
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, title: &str, body: &str) -> Result<(), AppError>;
}

pub type SharedNotifier = Arc<dyn Notifier>;

/// Webhook message payload
#[derive(Debug, Serialize)]
pub struct FeishuMessage {
    pub msg_type: &'static str,
    pub card: FeishuCard,
}

#[derive(Debug, Serialize)]
pub struct FeishuCard {
    pub header: CardHeader,
    pub elements: Vec<CardElement>,
}

#[derive(Debug, Serialize)]
pub struct CardHeader {
    pub title: CardText,
}

/// `div` block holding one text
#[derive(Debug, Serialize)]
pub struct CardElement {
    pub tag: &'static str,
    pub text: CardText,
}

#[derive(Debug, Serialize)]
pub struct CardText {
    /// `plain_text` or `lark_md`
    pub tag: &'static str,
    pub content: String,
}

impl CardText {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            tag: "plain_text",
            content: content.into(),
        }
    }

    pub fn markdown(content: impl Into<String>) -> Self {
        Self {
            tag: "lark_md",
            content: content.into(),
        }
    }
}

impl FeishuMessage {
    /// Card with `card_title` as header and one markdown section per entry of `sections`
    pub fn card<I, S>(card_title: &str, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            msg_type: "interactive",
            card: FeishuCard {
                header: CardHeader {
                    title: CardText::plain(card_title),
                },
                elements: sections
                    .into_iter()
                    .map(|content| CardElement {
                        tag: "div",
                        text: CardText::markdown(content),
                    })
                    .collect(),
            },
        }
    }
}

/// Feishu alert service
#[derive(Debug, Clone)]
pub struct FeishuAlert {
    webhook_url: String,
    card_title: String,
    client: Client,
}

impl FeishuAlert {
    pub fn new(webhook_url: impl Into<String>, card_title: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            card_title: card_title.into(),
            client: Client::new(),
        }
    }

    pub fn from_settings(settings: &FeishuSettings) -> Self {
        Self::new(&settings.webhook_url, &settings.card_title)
    }

    /// An empty webhook URL disables delivery
    pub fn is_enabled(&self) -> bool {
        !self.webhook_url.is_empty()
    }

    /// Payload for a report: summary line, then the full analysis
    pub fn build_message(&self, title: &str, body: &str) -> FeishuMessage {
        FeishuMessage::card(
            &self.card_title,
            [
                format!("**Summary**:\n{}", title),
                format!("**Analysis**:\n{}", body),
            ],
        )
    }

    async fn send_payload(&self, payload: &FeishuMessage) -> Result<(), AppError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send Feishu webhook");
                AppError::delivery_failed(format!("Failed to send Feishu webhook: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Feishu webhook returned error");
            return Err(AppError::delivery_failed(format!(
                "Feishu webhook error: {} - {}",
                status, body
            )));
        }

        info!("Message delivered to Feishu");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Notifier for FeishuAlert {
    #[instrument(skip(self, body), fields(body_len = body.len()))]
    async fn send(&self, title: &str, body: &str) -> Result<(), AppError> {
        if !self.is_enabled() {
            debug!("Feishu delivery disabled, skipping");
            return Ok(());
        }

        let payload = self.build_message(title, body);
        self.send_payload(&payload).await
    }
}
