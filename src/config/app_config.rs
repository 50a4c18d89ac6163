use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_WINDOW_HOURS: u32 = 5;
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_DEEPSEEK_API_URL: &str = "https://api.deepseek.com/chat/completions";
pub const DEFAULT_DEEPSEEK_MODEL: &str = "deepseek-chat";
pub const DEFAULT_CARD_TITLE: &str = "DeepSeek log analysis alert";
const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 60;

/// Elasticsearch connection settings
#[derive(Debug, Clone)]
pub struct ElasticsearchSettings {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub index: String,
}

impl ElasticsearchSettings {
    /// Base URL without trailing slash, e.g. `http://localhost:9200`
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Remote classifier settings
#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

/// Feishu webhook settings
#[derive(Debug, Clone)]
pub struct FeishuSettings {
    /// Empty means delivery is disabled
    pub webhook_url: String,
    pub card_title: String,
}

/// Retrieval window and batch cap
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub window_hours: u32,
    pub batch_size: usize,
    /// Optional JSON file overriding the built-in signature table
    pub signature_table_path: Option<PathBuf>,
}

/// Fully resolved application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub elasticsearch: ElasticsearchSettings,
    pub classifier: ClassifierSettings,
    pub feishu: FeishuSettings,
    pub pipeline: PipelineSettings,
}

impl AppConfig {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let elasticsearch = ElasticsearchSettings {
            scheme: get("ES_SCHEME").unwrap_or_else(|| "http".to_string()),
            host: get("ES_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_or("ES_PORT", get("ES_PORT"), 9200)?,
            username: get("ES_USERNAME").unwrap_or_default(),
            password: get("ES_PASSWORD").unwrap_or_default(),
            index: get("ES_INDEX").ok_or(ConfigError::Missing("ES_INDEX"))?,
        };

        let timeout_secs = parse_or(
            "CLASSIFIER_TIMEOUT_SECS",
            get("CLASSIFIER_TIMEOUT_SECS"),
            DEFAULT_CLASSIFIER_TIMEOUT_SECS,
        )?;
        let classifier = ClassifierSettings {
            api_url: get("DEEPSEEK_API_URL").unwrap_or_else(|| DEFAULT_DEEPSEEK_API_URL.to_string()),
            api_key: get("DEEPSEEK_API_KEY").ok_or(ConfigError::Missing("DEEPSEEK_API_KEY"))?,
            model: get("DEEPSEEK_MODEL").unwrap_or_else(|| DEFAULT_DEEPSEEK_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        let webhook_url = get("FEISHU_WEBHOOK_URL").unwrap_or_else(|| {
            tracing::warn!("FEISHU_WEBHOOK_URL is not set, reports will not be delivered");
            String::new()
        });
        let feishu = FeishuSettings {
            webhook_url,
            card_title: get("FEISHU_CARD_TITLE").unwrap_or_else(|| DEFAULT_CARD_TITLE.to_string()),
        };

        let window_hours = parse_or("LOG_WINDOW_HOURS", get("LOG_WINDOW_HOURS"), DEFAULT_WINDOW_HOURS)?;
        if window_hours == 0 {
            return Err(ConfigError::NotPositive("LOG_WINDOW_HOURS"));
        }
        let batch_size = parse_or("LOG_BATCH_SIZE", get("LOG_BATCH_SIZE"), DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            return Err(ConfigError::NotPositive("LOG_BATCH_SIZE"));
        }
        let pipeline = PipelineSettings {
            window_hours,
            batch_size,
            signature_table_path: get("SIGNATURE_TABLE_PATH").map(PathBuf::from),
        };

        Ok(Self {
            elasticsearch,
            classifier,
            feishu,
            pipeline,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        None => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("{key} is not a valid number: {value}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
}
