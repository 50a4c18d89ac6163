pub mod app_config;

pub use app_config::{
    AppConfig, ClassifierSettings, ConfigError, ElasticsearchSettings, FeishuSettings,
    PipelineSettings,
};
