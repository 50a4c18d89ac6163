use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, error, info, instrument};

use super::dto::{SearchRequest, SearchResponse};
use crate::config::ElasticsearchSettings;
use crate::utils::AppError;

/// Recent log lines for one run, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogBatch {
    entries: Vec<String>,
}

impl LogBatch {
    /// Build a batch, keeping at most `limit` entries
    pub fn new(mut entries: Vec<String>, limit: usize) -> Self {
        entries.truncate(limit);
        Self { entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All lines joined by `\n`, as sent to the classifier
    pub fn joined(&self) -> String {
        self.entries.join("\n")
    }
}

impl<S: Into<String>> FromIterator<S> for LogBatch {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Log store interface
///
/// An empty batch means nothing was logged in the window; a failed retrieval
/// is reported as `AppError::SourceUnavailable` so the caller can tell them apart.
#[async_trait::async_trait]
pub trait LogSource: Send + Sync {
    async fn fetch(&self, index: &str, limit: usize) -> Result<LogBatch, AppError>;
}

pub type SharedLogSource = Arc<dyn LogSource>;

/// Elasticsearch `_search` backed log source
#[derive(Debug, Clone)]
pub struct ElasticsearchSource {
    client: Client,
    base_url: String,
    username: String,
    password: String,
    window_hours: u32,
}

impl ElasticsearchSource {
    pub fn new(settings: &ElasticsearchSettings, window_hours: u32) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.base_url(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            window_hours,
        }
    }

    fn search_url(&self, index: &str) -> String {
        format!("{}/{}/_search", self.base_url.trim_end_matches('/'), index)
    }
}

#[async_trait::async_trait]
impl LogSource for ElasticsearchSource {
    #[instrument(skip(self), fields(window_hours = self.window_hours))]
    async fn fetch(&self, index: &str, limit: usize) -> Result<LogBatch, AppError> {
        let body = SearchRequest::recent(self.window_hours, limit);

        let mut request = self.client.post(self.search_url(index)).json(&body);
        if !self.username.is_empty() {
            request = request.basic_auth(&self.username, Some(&self.password));
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Failed to query Elasticsearch");
            AppError::source_unavailable(format!("request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(status = %status, body = %text, "Elasticsearch returned error");
            return Err(AppError::source_unavailable(format!(
                "HTTP {} - {}",
                status, text
            )));
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to decode Elasticsearch response");
            AppError::source_unavailable(format!("undecodable response: {}", e))
        })?;

        let batch = LogBatch::new(parsed.into_messages(), limit);
        if batch.is_empty() {
            debug!("No log entries in window");
        } else {
            info!(count = batch.len(), "Fetched log entries");
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;
    use std::net::SocketAddr;

    fn settings() -> ElasticsearchSettings {
        ElasticsearchSettings {
            scheme: "http".to_string(),
            host: "127.0.0.1".to_string(),
            port: 9,
            username: "elastic".to_string(),
            password: "changeme".to_string(),
            index: "app-logs".to_string(),
        }
    }

    fn source_at(addr: SocketAddr) -> ElasticsearchSource {
        let settings = ElasticsearchSettings {
            port: addr.port(),
            ..settings()
        };
        ElasticsearchSource::new(&settings, 5)
    }

    #[test]
    fn should_truncate_batch_to_limit() {
        // Arrange
        let entries = (0..15).map(|i| format!("line {}", i)).collect();

        // Act
        let batch = LogBatch::new(entries, 10);

        // Assert
        assert_eq!(batch.len(), 10);
        assert_eq!(batch.entries()[0], "line 0");
        assert_eq!(batch.entries()[9], "line 9");
    }

    #[test]
    fn should_join_entries_with_newlines() {
        let batch: LogBatch = ["first", "second"].into_iter().collect();

        assert_eq!(batch.joined(), "first\nsecond");
    }

    #[test]
    fn should_build_search_url_for_index() {
        let source = ElasticsearchSource::new(&settings(), 5);

        assert_eq!(source.search_url("app-logs"), "http://127.0.0.1:9/app-logs/_search");
    }

    #[tokio::test]
    async fn should_report_unreachable_backend_as_source_unavailable() {
        // Arrange: port 9 (discard) is not an Elasticsearch node
        let source = ElasticsearchSource::new(&settings(), 5);

        // Act
        let result = source.fetch("app-logs", 10).await;

        // Assert
        assert!(matches!(result, Err(AppError::SourceUnavailable(_))));
    }

    #[tokio::test]
    async fn should_report_error_status_as_source_unavailable() {
        // Arrange
        let addr = serve_once(500, r#"{"error":"search_phase_execution_exception"}"#).await;

        // Act
        let result = source_at(addr).fetch("app-logs", 10).await;

        // Assert
        match result {
            Err(AppError::SourceUnavailable(msg)) => {
                assert!(msg.contains("HTTP 500"));
                assert!(msg.contains("search_phase_execution_exception"));
            }
            other => panic!("Expected SourceUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn should_report_undecodable_body_as_source_unavailable() {
        let addr = serve_once(200, "not json").await;

        let result = source_at(addr).fetch("app-logs", 10).await;

        match result {
            Err(AppError::SourceUnavailable(msg)) => assert!(msg.contains("undecodable")),
            other => panic!("Expected SourceUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn should_read_messages_from_hits() {
        // Arrange
        let addr = serve_once(
            200,
            r#"{"hits":{"hits":[{"_source":{"message":"db connect timed out"}},{"_source":{"message":"GET /health 200"}}]}}"#,
        )
        .await;

        // Act
        let batch = source_at(addr).fetch("app-logs", 10).await.unwrap();

        // Assert
        assert_eq!(batch.entries(), ["db connect timed out", "GET /health 200"]);
    }
}
