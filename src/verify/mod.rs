use std::fmt;

use futures_util::future::join_all;
use log::{debug, info};

use crate::manifest::{Link, ManifestRecord, Platform};
use crate::networking::Transport;

/// A link that did not verify. Recorded, never propagated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkFailure {
    Transfer {
        manifest: String,
        platform: Platform,
        locator: String,
        reason: String,
    },
    DigestMismatch {
        manifest: String,
        platform: Platform,
        locator: String,
        expected: String,
        actual: String,
    },
}

impl LinkFailure {
    /// Annotation title used when reporting the failure.
    pub fn title(&self) -> &'static str {
        match self {
            LinkFailure::Transfer { .. } => "Download",
            LinkFailure::DigestMismatch { .. } => "Check",
        }
    }

    #[allow(dead_code)]
    pub fn manifest(&self) -> &str {
        match self {
            LinkFailure::Transfer { manifest, .. } | LinkFailure::DigestMismatch { manifest, .. } => {
                manifest
            }
        }
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, LinkFailure::Transfer { .. })
    }
}

impl fmt::Display for LinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkFailure::Transfer {
                manifest,
                platform,
                locator,
                reason,
            } => write!(
                f,
                "Request failed for {manifest} ({platform}) - {locator}: {reason}"
            ),
            LinkFailure::DigestMismatch {
                manifest,
                platform,
                locator,
                expected,
                actual,
            } => write!(
                f,
                "Hash mismatch of {manifest} ({platform}) in link {locator}. Expected value from modlinks: {expected}, Actual value: {actual}"
            ),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LinkOutcome {
    pub platform: Platform,
    pub locator: String,
    pub failure: Option<LinkFailure>,
}

impl LinkOutcome {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct RecordOutcome {
    pub name: String,
    pub links: Vec<LinkOutcome>,
}

impl RecordOutcome {
    /// True only when every link of the record verified.
    pub fn passed(&self) -> bool {
        self.links.iter().all(LinkOutcome::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &LinkFailure> + '_ {
        self.links.iter().filter_map(|link| link.failure.as_ref())
    }
}

/// Fetch and hash every link of `record` concurrently.
pub async fn verify_record(transport: &Transport, record: &ManifestRecord) -> RecordOutcome {
    info!(
        "verify: checking '{}' ({} links)",
        record.name,
        record.links.count()
    );
    let checks = record
        .links
        .iter()
        .map(|(platform, link)| verify_link(transport, &record.name, platform, link));
    let links = join_all(checks).await;
    for link in &links {
        let status = if link.passed() { "ok" } else { "failed" };
        debug!(
            "verify: '{}' ({}) {} {status}",
            record.name, link.platform, link.locator
        );
    }
    RecordOutcome {
        name: record.name.clone(),
        links,
    }
}

async fn verify_link(
    transport: &Transport,
    manifest: &str,
    platform: Platform,
    link: &Link,
) -> LinkOutcome {
    let failure = match transport.sha256_of(link.locator()).await {
        Ok(digested) if link.matches_digest(&digested.sha256) => None,
        Ok(digested) => Some(LinkFailure::DigestMismatch {
            manifest: manifest.to_owned(),
            platform,
            locator: link.locator().to_owned(),
            expected: link.digest().to_owned(),
            actual: digested.sha256,
        }),
        Err(err) => Some(LinkFailure::Transfer {
            manifest: manifest.to_owned(),
            platform,
            locator: link.locator().to_owned(),
            reason: err.to_string(),
        }),
    };
    LinkOutcome {
        platform,
        locator: link.locator().to_owned(),
        failure,
    }
}
