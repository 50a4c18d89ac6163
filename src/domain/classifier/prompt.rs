/// Instruction prepended to the log lines
pub const CLASSIFY_PROMPT: &str = "As a senior operations engineer with 20 years of experience, \
group the following logs by fault type ('database anomaly', 'program anomaly', \
'network anomaly', 'redis anomaly', 'mq anomaly', etc.), assess the overall impact \
scope (P0-P3) and give recommendations:";

/// Prompt followed by the newline-joined log lines
pub fn build_classify_content(joined_logs: &str) -> String {
    format!("{}\n{}", CLASSIFY_PROMPT, joined_logs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_name_every_fault_category_and_severity_scale() {
        for needle in ["database", "program", "network", "redis", "mq", "P0-P3"] {
            assert!(CLASSIFY_PROMPT.contains(needle), "missing {}", needle);
        }
    }

    #[test]
    fn should_append_logs_after_prompt() {
        let content = build_classify_content("a\nb");

        assert!(content.starts_with(CLASSIFY_PROMPT));
        assert!(content.ends_with("\na\nb"));
    }
}
