//! Logging initialization
//!
//! JSON lines on stdout, plus a daily-rolling JSON file when the log
//! directory is usable.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,log_triage=debug";
const LOG_FILE_PREFIX: &str = "log-triage.log";

/// Daily appender writing `<log_dir>/log-triage.log.YYYY-MM-DD`
pub fn file_appender(log_dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(log_dir)
}

/// Install the global subscriber, logging to `$LOG_DIR` (default `logs/`).
///
/// Level comes from `RUST_LOG`, defaulting to `info,log_triage=debug`.
/// Hold the returned guard in `main` so buffered file lines are flushed on exit.
pub fn init_logging() -> Option<WorkerGuard> {
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    init_logging_in(Path::new(&log_dir))
}

/// Same as [`init_logging`] with an explicit directory.
///
/// When the directory cannot be created the file layer is skipped, a warning
/// is logged and `None` is returned; stdout logging still works.
pub fn init_logging_in(log_dir: &Path) -> Option<WorkerGuard> {
    let (file_writer, file_error) = match file_appender(log_dir) {
        Ok(appender) => (Some(tracing_appender::non_blocking(appender)), None),
        Err(e) => (None, Some(e)),
    };
    let (writer, guard) = match file_writer {
        Some((writer, guard)) => (Some(writer), Some(guard)),
        None => (None, None),
    };

    let file_layer = writer.map(|writer| {
        fmt::layer()
            .json()
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_current_span(true)
            .with_ansi(false)
            .with_writer(writer)
    });
    let stdout_layer = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_current_span(true);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Failed to initialize tracing: {}", e);
    }

    if let Some(e) = file_error {
        tracing::warn!(
            log_dir = %log_dir.display(),
            error = %e,
            "Cannot open log directory, logging to stdout only"
        );
    }

    guard
}
