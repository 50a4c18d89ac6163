pub mod builder;

pub use builder::{build_report, build_report_at, render_matches, Report, NO_MATCH_NOTICE, REPORT_TITLE};
