use std::time::Duration;

use crate::verify::RecordOutcome;

/// Aggregate of one verification batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerificationSummary {
    /// Records whose verification ran to completion (or whose task died).
    pub checked: usize,
    pub failed_records: usize,
    pub mismatches: usize,
    pub transfer_failures: usize,
    pub elapsed: Duration,
}

impl VerificationSummary {
    pub fn success(&self) -> bool {
        self.failed_records == 0
    }

    pub(crate) fn record(&mut self, outcome: &RecordOutcome) {
        self.checked += 1;
        if !outcome.passed() {
            self.failed_records += 1;
        }
        for failure in outcome.failures() {
            if failure.is_transfer() {
                self.transfer_failures += 1;
            } else {
                self.mismatches += 1;
            }
        }
    }

    pub(crate) fn record_lost_task(&mut self) {
        self.checked += 1;
        self.failed_records += 1;
    }
}
