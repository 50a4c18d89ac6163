use std::process::ExitCode;

use log_triage::{build_pipeline, utils::init_logging, AppConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // 1. 환경변수 로드
    dotenvy::dotenv().ok();

    // 2. 로깅 초기화
    let _guard = init_logging();

    // 3. 설정 및 파이프라인 구성
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let pipeline = match build_pipeline(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "Failed to initialize pipeline");
            return ExitCode::FAILURE;
        }
    };

    // 4. 1회 실행
    let outcome = pipeline.run().await;
    tracing::info!(state = %outcome.state(), "Log triage run complete");

    ExitCode::SUCCESS
}
