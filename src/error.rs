use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that abort the whole run before or instead of verification.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    Usage(String),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest document {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: ManifestError,
    },
}

/// A document that cannot be turned into a manifest set.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("unexpected document structure: {0}")]
    Parse(#[from] quick_xml::de::DeError),

    #[error("document has no root element")]
    MissingRoot,

    #[error("manifest '{name}' has no Link or Links element")]
    MissingLinks { name: String },

    #[error("manifest '{name}' declares both Link and Links")]
    AmbiguousLinks { name: String },

    #[error("manifest '{name}' has a Links group without a Windows link")]
    MissingPrimaryLink { name: String },

    #[error("manifest '{name}' has a link without a SHA256 attribute")]
    MissingDigest { name: String },

    #[error("manifest '{name}' has a link without a URL")]
    MissingLocator { name: String },

    #[error("manifest '{name}' appears more than once")]
    DuplicateName { name: String },

    #[error("API document must contain exactly one Manifest, found {count}")]
    ApiManifestCount { count: usize },
}

/// Why a single link could not be fetched.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("server responded with {0}")]
    Status(reqwest::StatusCode),

    #[error("stream error after {received} bytes: {source}")]
    Body {
        received: u64,
        #[source]
        source: reqwest::Error,
    },

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("connection pool closed")]
    PoolClosed,
}
