use std::time::Instant;

use log::{error, info, warn};
use tokio::task::JoinSet;

use crate::manifest::ManifestRecord;
use crate::networking::Transport;
use crate::verify::{RecordOutcome, verify_record};

pub mod models;

pub use models::VerificationSummary;

/// Verify every record concurrently and wait for all of them.
///
/// A failing record never cancels its siblings. `on_outcome` is called as each
/// record finishes, in completion order.
pub async fn verify_all<F>(
    transport: &Transport,
    records: Vec<ManifestRecord>,
    mut on_outcome: F,
) -> VerificationSummary
where
    F: FnMut(&RecordOutcome),
{
    let started = Instant::now();
    let total = records.len();
    let mut join_set = JoinSet::new();
    for record in records {
        let transport = transport.clone();
        join_set.spawn(async move { verify_record(&transport, &record).await });
    }
    info!("engine: {total} manifests queued for verification");

    let mut summary = VerificationSummary::default();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(outcome) => {
                if outcome.passed() {
                    info!("engine: '{}' verified", outcome.name);
                } else {
                    warn!("engine: '{}' failed verification", outcome.name);
                }
                summary.record(&outcome);
                on_outcome(&outcome);
            }
            Err(err) => {
                error!("engine: verification task failed: {err}");
                summary.record_lost_task();
            }
        }
    }
    summary.elapsed = started.elapsed();

    info!(
        "engine: {} checked, {} failed ({} mismatches, {} transfer failures)",
        summary.checked, summary.failed_records, summary.mismatches, summary.transfer_failures
    );
    summary
}
