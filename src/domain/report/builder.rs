use chrono::{DateTime, Utc};

use crate::domain::signature::MatchRecord;

pub const REPORT_TITLE: &str = "Consolidated log analysis";
pub const NO_MATCH_NOTICE: &str = "No log matched the historical fault table.";
const MATCH_HEADER: &str = "<font color='red'>**Historical fault matches:**</font>";
const GENERATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Text handed to the notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub title: String,
    pub body: String,
    pub generated_at: DateTime<Utc>,
}

/// Matches rendered as lark_md, or the no-match sentence
pub fn render_matches(matches: &[MatchRecord]) -> String {
    if matches.is_empty() {
        return NO_MATCH_NOTICE.to_string();
    }

    let mut out = String::from(MATCH_HEADER);
    out.push('\n');
    for record in matches {
        out.push_str(&format!(
            "Log: {}\n → Matched fault: <font color='red'>**{}**</font>\n",
            record.line, record.label
        ));
    }
    out
}

/// Narrative verbatim, then the match section; input order is kept
pub fn build_report(narrative: &str, matches: &[MatchRecord]) -> Report {
    build_report_at(narrative, matches, Utc::now())
}

/// [`build_report`] with a fixed timestamp, rendered as the last body line
pub fn build_report_at(
    narrative: &str,
    matches: &[MatchRecord],
    generated_at: DateTime<Utc>,
) -> Report {
    Report {
        title: REPORT_TITLE.to_string(),
        body: format!(
            "Log classification:\n{}\n\n{}\n\nGenerated at: {}",
            narrative,
            render_matches(matches),
            generated_at.format(GENERATED_AT_FORMAT)
        ),
        generated_at,
    }
}
