pub mod config;
pub mod domain;
pub mod monitoring;
pub mod pipeline;
pub mod utils;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

pub use config::AppConfig;
pub use pipeline::{Pipeline, PipelineState, RunOutcome};
pub use utils::AppError;

use domain::classifier::{Classifier, DeepSeekClient};
use domain::logs::ElasticsearchSource;
use domain::signature::SignatureTable;
use monitoring::FeishuAlert;

/// Wire the production collaborators from resolved settings
pub fn build_pipeline(config: &AppConfig) -> Result<Pipeline, AppError> {
    let signatures = SignatureTable::load(config.pipeline.signature_table_path.as_deref())?;

    let source = ElasticsearchSource::new(&config.elasticsearch, config.pipeline.window_hours);
    let transport = DeepSeekClient::new(&config.classifier)?;
    let classifier = Classifier::new(Arc::new(transport), &config.classifier.model);
    let notifier = FeishuAlert::from_settings(&config.feishu);

    Ok(Pipeline::new(
        Arc::new(source),
        classifier,
        Arc::new(signatures),
        Arc::new(notifier),
        &config.elasticsearch.index,
        config.pipeline.batch_size,
    ))
}
