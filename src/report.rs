use std::time::Duration;

use crate::engine::VerificationSummary;
use crate::verify::RecordOutcome;

/// A workflow-command line that CI runners turn into an error annotation.
#[must_use]
pub fn annotation(title: &str, message: &str) -> String {
    format!("::error title={title}::{}", escape_message(message))
}

// Newlines would end the workflow command early.
fn escape_message(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

pub fn failure_lines(outcome: &RecordOutcome) -> Vec<String> {
    outcome
        .failures()
        .map(|failure| annotation(failure.title(), &failure.to_string()))
        .collect()
}

pub fn emit_failures(outcome: &RecordOutcome) {
    for line in failure_lines(outcome) {
        println!("{line}");
    }
}

#[must_use]
pub fn summary_line(checked: usize, elapsed: Duration) -> String {
    format!("Checked {checked} manifests in {}ms.", elapsed.as_millis())
}

pub fn emit_summary(summary: &VerificationSummary) {
    println!("{}", summary_line(summary.checked, summary.elapsed));
}
