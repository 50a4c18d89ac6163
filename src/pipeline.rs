//! One log-triage run: fetch, classify, match, report, deliver

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::domain::classifier::Classifier;
use crate::domain::logs::SharedLogSource;
use crate::domain::report::{build_report, Report};
use crate::domain::signature::{SignatureMatcher, SignatureTable};
use crate::monitoring::SharedNotifier;
use crate::utils::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Fetching,
    Classifying,
    Matching,
    Reporting,
    Delivering,
    Done,
    EmptyLogs,
    SourceUnavailable,
    ClassifyFailed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Fetching => "fetching",
            PipelineState::Classifying => "classifying",
            PipelineState::Matching => "matching",
            PipelineState::Reporting => "reporting",
            PipelineState::Delivering => "delivering",
            PipelineState::Done => "done",
            PipelineState::EmptyLogs => "empty_logs",
            PipelineState::SourceUnavailable => "source_unavailable",
            PipelineState::ClassifyFailed => "classify_failed",
        };
        f.write_str(name)
    }
}

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// Nothing logged in the window
    EmptyLogs,
    /// The log store could not be queried
    SourceUnavailable(AppError),
    /// Classification failed; no report was built
    ClassifyFailed(AppError),
    /// Report built; `delivered` is false when the notifier failed
    Done { report: Report, delivered: bool },
}

impl RunOutcome {
    pub fn state(&self) -> PipelineState {
        match self {
            RunOutcome::EmptyLogs => PipelineState::EmptyLogs,
            RunOutcome::SourceUnavailable(_) => PipelineState::SourceUnavailable,
            RunOutcome::ClassifyFailed(_) => PipelineState::ClassifyFailed,
            RunOutcome::Done { .. } => PipelineState::Done,
        }
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            RunOutcome::Done { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// Sequences the collaborators of one run
pub struct Pipeline {
    source: SharedLogSource,
    classifier: Classifier,
    signatures: Arc<SignatureTable>,
    notifier: SharedNotifier,
    index: String,
    batch_size: usize,
}

impl Pipeline {
    pub fn new(
        source: SharedLogSource,
        classifier: Classifier,
        signatures: Arc<SignatureTable>,
        notifier: SharedNotifier,
        index: impl Into<String>,
        batch_size: usize,
    ) -> Self {
        Self {
            source,
            classifier,
            signatures,
            notifier,
            index: index.into(),
            batch_size,
        }
    }

    /// Execute one run. Never fails: every path ends in a logged `RunOutcome`.
    pub async fn run(&self) -> RunOutcome {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("triage_run", %run_id, index = %self.index);
        self.run_inner().instrument(span).await
    }

    async fn run_inner(&self) -> RunOutcome {
        enter(PipelineState::Fetching);
        let batch = match self.source.fetch(&self.index, self.batch_size).await {
            Ok(batch) if batch.is_empty() => {
                warn!(state = %PipelineState::EmptyLogs, "No logs retrieved, nothing to analyze");
                return RunOutcome::EmptyLogs;
            }
            Ok(batch) => batch,
            Err(e) => {
                error!(state = %PipelineState::SourceUnavailable, code = e.error_code(), error = %e, "Log retrieval failed, run skipped");
                return RunOutcome::SourceUnavailable(e);
            }
        };

        enter(PipelineState::Classifying);
        let narrative = match self.classifier.classify(&batch).await {
            Ok(narrative) => narrative,
            Err(e) => {
                error!(state = %PipelineState::ClassifyFailed, code = e.error_code(), error = %e, "Log analysis failed");
                return RunOutcome::ClassifyFailed(e);
            }
        };
        info!(narrative = %narrative, "Consolidated log analysis");

        enter(PipelineState::Matching);
        let matches = SignatureMatcher::new(&self.signatures).match_batch(&batch);
        info!(matches = matches.len(), "Historical fault matching complete");

        enter(PipelineState::Reporting);
        let report = build_report(&narrative, &matches);

        enter(PipelineState::Delivering);
        let delivered = match self.notifier.send(&report.title, &report.body).await {
            Ok(()) => true,
            Err(e) => {
                error!(code = e.error_code(), error = %e, "Report delivery failed, run still complete");
                false
            }
        };

        info!(state = %PipelineState::Done, delivered, lines = batch.len(), "Run finished");
        RunOutcome::Done { report, delivered }
    }
}

fn enter(state: PipelineState) {
    debug!(state = %state, "Entering state");
}
