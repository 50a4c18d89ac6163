use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// `_search` request body: trailing time window, newest first, capped size
#[derive(Debug, Serialize)]
pub struct SearchRequest {
    pub query: Value,
    pub sort: Vec<Value>,
    pub size: usize,
}

impl SearchRequest {
    pub fn recent(window_hours: u32, size: usize) -> Self {
        Self {
            query: json!({
                "range": {
                    "@timestamp": {
                        "gte": format!("now-{}h", window_hours),
                        "lt": "now"
                    }
                }
            }),
            sort: vec![json!({ "@timestamp": { "order": "desc" } })],
            size,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_source", default)]
    pub source: Value,
}

impl SearchResponse {
    /// `_source.message` of every hit, in response order; hits without one are skipped
    pub fn into_messages(self) -> Vec<String> {
        self.hits
            .hits
            .into_iter()
            .filter_map(|hit| {
                hit.source
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .collect()
    }
}
