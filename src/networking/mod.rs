use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use log::{debug, warn};
use reqwest::Client;
use sha2::{Digest, Sha256};
use tokio::sync::Semaphore;

use crate::error::TransferError;
use crate::util::throughput;

const USER_AGENT: &str = concat!("modlinks-verifier/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_MAX_CONNECTIONS: usize = 16;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Transfers allowed in flight at once.
    pub max_connections: usize,
    /// Upper bound for a whole transfer, from request to last byte.
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Result of hashing one remote payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Digested {
    /// Lowercase hex SHA256.
    pub sha256: String,
    pub bytes: u64,
}

/// Shared HTTP client with a cap on simultaneous transfers. Clones share the
/// connection pool and the permits.
#[derive(Clone)]
pub struct Transport {
    client: Client,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl Transport {
    pub fn new(config: &TransportConfig) -> Self {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|err| {
                warn!("transport: falling back to default HTTP client configuration ({err})");
                Client::new()
            });
        Self {
            client,
            permits: Arc::new(Semaphore::new(config.max_connections.max(1))),
            timeout: config.timeout,
        }
    }

    /// Stream the body at `url` through SHA256 without buffering it.
    pub async fn sha256_of(&self, url: &str) -> Result<Digested, TransferError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| TransferError::PoolClosed)?;

        let started = Instant::now();
        let digested = tokio::time::timeout(self.timeout, self.stream_digest(url))
            .await
            .map_err(|_| TransferError::TimedOut(self.timeout))??;
        let elapsed = started.elapsed();
        debug!(
            "transport: hashed {} bytes from {url} in {}ms ({})",
            digested.bytes,
            elapsed.as_millis(),
            throughput(digested.bytes, elapsed)
        );
        Ok(digested)
    }

    async fn stream_digest(&self, url: &str) -> Result<Digested, TransferError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(TransferError::Request)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Status(status));
        }

        let mut hasher = Sha256::new();
        let mut received: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| TransferError::Body { received, source })?;
            hasher.update(&chunk);
            received += chunk.len() as u64;
        }

        Ok(Digested {
            sha256: format!("{:x}", hasher.finalize()),
            bytes: received,
        })
    }
}
