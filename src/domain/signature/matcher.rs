use super::table::SignatureTable;
use crate::domain::logs::LogBatch;

/// One log line that hit one known fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub line: String,
    pub label: String,
}

/// Scans log lines against a signature table
#[derive(Debug, Clone, Copy)]
pub struct SignatureMatcher<'a> {
    table: &'a SignatureTable,
}

impl<'a> SignatureMatcher<'a> {
    pub fn new(table: &'a SignatureTable) -> Self {
        Self { table }
    }

    /// Every (line, signature) pair where any keyword occurs case-insensitively.
    ///
    /// Output follows batch order, then table order. A signature yields at most
    /// one record per line.
    pub fn match_batch(&self, batch: &LogBatch) -> Vec<MatchRecord> {
        let mut matches = Vec::new();
        for line in batch.entries() {
            let lowered = line.to_lowercase();
            for signature in self.table.iter() {
                if signature
                    .keywords
                    .iter()
                    .any(|keyword| lowered.contains(keyword.as_str()))
                {
                    matches.push(MatchRecord {
                        line: line.clone(),
                        label: signature.label.clone(),
                    });
                }
            }
        }
        matches
    }
}
