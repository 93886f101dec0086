use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use env_logger::{Env, Target};
use log::info;

mod diff;
mod engine;
mod error;
mod manifest;
mod networking;
mod report;
mod util;
mod verify;

use crate::diff::ChangeReason;
use crate::engine::VerificationSummary;
use crate::error::RunError;
use crate::networking::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_CONNECTIONS, DEFAULT_TIMEOUT, Transport, TransportConfig,
};

#[derive(Parser, Debug)]
#[command(
    name = "modlinks-verifier",
    author,
    version,
    about = "Verify SHA256 digests of new or changed ModLinks download links"
)]
struct Cli {
    /// Current ModLinks/ApiLinks document used as the baseline.
    baseline: PathBuf,

    /// Incoming document whose new or changed links are verified.
    incoming: PathBuf,

    /// Maximum number of downloads in flight at once.
    #[arg(long, env = "MODLINKS_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    max_connections: usize,

    /// Per-download timeout in seconds, covering the whole transfer.
    #[arg(long, env = "MODLINKS_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    #[arg(
        long,
        env = "MODLINKS_CONNECT_TIMEOUT_SECS",
        default_value_t = DEFAULT_CONNECT_TIMEOUT.as_secs()
    )]
    connect_timeout_secs: u64,
}

impl Cli {
    fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            max_connections: self.max_connections,
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stdout)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = err.print();
            return code;
        }
    };

    match run(&cli).await {
        Ok(summary) => {
            report::emit_summary(&summary);
            if summary.success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err @ (RunError::Usage(_) | RunError::Read { .. })) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
        Err(err @ RunError::Malformed { .. }) => {
            println!("{}", report::annotation("Parse", &err.to_string()));
            ExitCode::FAILURE
        }
    }
}

/// Load both documents, select what changed, and verify it.
async fn run(cli: &Cli) -> Result<VerificationSummary, RunError> {
    ensure_readable(&cli.baseline, "current")?;
    ensure_readable(&cli.incoming, "incoming")?;

    let baseline = manifest::load_file(&cli.baseline).await?;
    let incoming = manifest::load_file(&cli.incoming).await?;

    let changes = diff::select_changed(&baseline, &incoming);
    let added = changes
        .iter()
        .filter(|change| change.reason == ChangeReason::Added)
        .count();
    info!(
        "diff: {} of {} manifests are new or changed ({added} new)",
        changes.len(),
        incoming.len()
    );
    let records = changes
        .into_iter()
        .map(|change| change.record.clone())
        .collect();

    let transport = Transport::new(&cli.transport_config());
    Ok(engine::verify_all(&transport, records, report::emit_failures).await)
}

fn ensure_readable(path: &Path, label: &str) -> Result<(), RunError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(RunError::Usage(format!(
            "Unable to access {label} XML file {}! Does it exist?",
            path.display()
        )))
    }
}
