use tracing::{error, info, instrument, warn};

use super::client::SharedChatTransport;
use super::dto::{ChatRequest, ChatResponse};
use super::prompt::build_classify_content;
use super::retry::{decide_status, with_retry, RetryDecision, RetryPolicy};
use crate::domain::logs::LogBatch;
use crate::utils::{AppError, FatalReason};

/// Sends a batch to the remote analysis service and returns its narrative
pub struct Classifier {
    transport: SharedChatTransport,
    model: String,
    policy: RetryPolicy,
}

impl Classifier {
    pub fn new(transport: SharedChatTransport, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Classify every line of `batch` in one request.
    ///
    /// Transport failures and non-fatal statuses are retried per the policy.
    /// 401, 400 and a non-JSON body abort at once. A JSON body without
    /// `choices[0].message.content` is an `ExtractionError`, also never retried.
    #[instrument(skip(self, batch), fields(lines = batch.len(), model = %self.model))]
    pub async fn classify(&self, batch: &LogBatch) -> Result<String, AppError> {
        let request =
            ChatRequest::single_user_message(&self.model, build_classify_content(&batch.joined()));

        let body = with_retry(&self.policy, |attempt| {
            let transport = self.transport.clone();
            let request = request.clone();
            async move {
                let reply = transport.post_chat(&request).await?;
                if reply.is_success() {
                    return serde_json::from_str::<serde_json::Value>(&reply.body).map_err(|e| {
                        error!(attempt, error = %e, "Classifier returned malformed JSON");
                        AppError::ClassifyFatal(FatalReason::MalformedResponse)
                    });
                }
                match decide_status(reply.status) {
                    RetryDecision::Abort(reason) => {
                        error!(attempt, status = reply.status, body = %reply.body, %reason, "Classifier rejected request");
                        Err(AppError::ClassifyFatal(reason))
                    }
                    RetryDecision::Retry => {
                        warn!(attempt, status = reply.status, body = %reply.body, "Classifier returned error status");
                        Err(AppError::transient(format!(
                            "HTTP {} - {}",
                            reply.status, reply.body
                        )))
                    }
                }
            }
        })
        .await?;

        let narrative = extract_narrative(body)?;
        info!(chars = narrative.chars().count(), "Classification received");
        Ok(narrative)
    }
}

/// `choices[0].message.content` of a chat-completions body
pub fn extract_narrative(body: serde_json::Value) -> Result<String, AppError> {
    let response: ChatResponse = serde_json::from_value(body).map_err(|e| {
        error!(error = %e, "Classifier response is missing required keys");
        AppError::extraction(e.to_string())
    })?;

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| {
            error!("Classifier response has no choices");
            AppError::extraction("choices is empty")
        })
}
