use crate::types::BatchReport;

/// Format a batch report as a plain-text summary list.
pub fn format_batch_summary(report: &BatchReport) -> String {
    let mut output = String::new();

    let successful = report.successes().count();
    let failed = report.failures().count();
    output.push_str(&format!("Successful: {}\n", successful));
    output.push_str(&format!("Failed: {}\n", failed));

    for summary in report.successes() {
        output.push_str(&format!(
            "  • {}: {} frames, {} segments, {} pairs\n",
            summary.video_name, summary.frames, summary.segments, summary.pairs
        ));
    }

    for (video_name, message) in report.failures() {
        output.push_str(&format!("  • {}: ERROR - {}\n", video_name, message));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RunOutcome, RunSummary};

    #[test]
    fn summary_lists_successes_then_failures() {
        let report = BatchReport {
            outcomes: vec![
                RunOutcome::Success(RunSummary {
                    video_name: "a".to_string(),
                    frames: 3,
                    segments: 2,
                    pairs: 3,
                }),
                RunOutcome::Error {
                    video_name: "b".to_string(),
                    message: "boom".to_string(),
                },
            ],
        };
        let text = format_batch_summary(&report);
        assert!(text.contains("Successful: 1"));
        assert!(text.contains("Failed: 1"));
        assert!(text.contains("a: 3 frames, 2 segments, 3 pairs"));
        assert!(text.contains("b: ERROR - boom"));
    }
}
