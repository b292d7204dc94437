// # Marker Lock
//
// Cross-process mutual exclusion for mutating DNS operations.
//
// ## Purpose
//
// The remote server tolerates only one mutating operation at a time. Every
// operation attempt, in this process or any other configured with the same
// marker path, claims the marker file before executing and removes it
// afterwards.
//
// ## Protocol
//
// - A random 0–100 ms jitter desynchronizes callers that started together.
// - The marker is claimed with atomic create-if-absent semantics, so two
//   waiters can never both believe they created it.
// - While another holder exists, the path is polled at 100 ms.
// - Release removes the marker and is idempotent; a missing marker is not
//   an error.
//
// The marker content is a small lease payload (holder pid, acquisition
// time) used for diagnostics and optional stale-lease takeover; only the
// file's existence carries meaning for exclusion.

use chrono::{DateTime, Utc};
use rand::RngExt;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::config::ConnectionConfig;
use crate::error::{Error, Result};

/// Poll interval while another holder has the marker
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound of the random desynchronization delay, in milliseconds
const MAX_JITTER_MS: u64 = 100;

/// Lease payload written into the marker
#[derive(Debug, Serialize, Deserialize)]
struct Lease {
    pid: u32,
    acquired_at: DateTime<Utc>,
}

impl Lease {
    fn new() -> Self {
        Self {
            pid: std::process::id(),
            acquired_at: Utc::now(),
        }
    }

    fn is_stale(&self, max_age: chrono::Duration) -> bool {
        Utc::now().signed_duration_since(self.acquired_at) > max_age
    }
}

/// Advisory cross-process lock backed by a marker file
///
/// One `MarkerLock` per [`ConnectionConfig`]; all operations against the
/// same remote server share the configured path.
#[derive(Debug, Clone)]
pub struct MarkerLock {
    path: PathBuf,
    timeout: Option<Duration>,
    stale_after: Option<chrono::Duration>,
}

impl MarkerLock {
    /// Create a lock over the given marker path, waiting indefinitely
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: None,
            stale_after: None,
        }
    }

    /// Build the lock a configuration describes
    pub fn from_config(config: &ConnectionConfig) -> Self {
        let mut lock = Self::new(&config.lock_path);
        if config.lock_timeout_secs > 0 {
            lock.timeout = Some(Duration::from_secs(config.lock_timeout_secs));
        }
        if config.lock_stale_secs > 0 {
            lock.stale_after = Some(chrono::Duration::seconds(config.lock_stale_secs as i64));
        }
        lock
    }

    /// Set the acquisition deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the lease age after which a waiter may reclaim the marker
    pub fn with_stale_after(mut self, max_age: Duration) -> Self {
        self.stale_after = chrono::Duration::from_std(max_age).ok();
        self
    }

    /// The marker path this lock coordinates on
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until this caller holds the marker.
    ///
    /// Filesystem errors other than "already exists" surface as
    /// [`Error::Lock`]; they mean the lock substrate is unusable, not that
    /// the lock is contended. With a configured deadline, expiry surfaces
    /// as [`Error::Timeout`].
    pub async fn acquire(&self) -> Result<MarkerGuard> {
        let jitter_ms = rand::rng().random_range(0..=MAX_JITTER_MS);
        tokio::time::sleep(Duration::from_millis(jitter_ms)).await;

        let deadline = self.timeout.map(|t| tokio::time::Instant::now() + t);
        loop {
            if let Some(guard) = self.try_claim().await? {
                debug!(path = %self.path.display(), "lock marker claimed");
                return Ok(guard);
            }

            if self.reclaim_if_stale().await? {
                continue;
            }

            if let Some(deadline) = deadline
                && tokio::time::Instant::now() >= deadline
            {
                return Err(Error::timeout(
                    "lock acquisition",
                    self.timeout.unwrap_or_default().as_secs(),
                ));
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// One atomic create-if-absent attempt. `Ok(None)` means another holder
    /// has the marker.
    async fn try_claim(&self) -> Result<Option<MarkerGuard>> {
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await
        {
            Ok(mut file) => {
                // Creation alone grants the claim; the lease payload is advisory
                let payload = serde_json::to_vec(&Lease::new()).unwrap_or_default();
                if let Err(e) = file.write_all(&payload).await {
                    warn!(path = %self.path.display(), "failed to write lease payload: {e}");
                }
                Ok(Some(MarkerGuard {
                    path: self.path.clone(),
                    released: false,
                }))
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(Error::Lock(e)),
        }
    }

    /// Remove the marker if its lease is older than the configured age.
    /// Returns true when a takeover happened.
    async fn reclaim_if_stale(&self) -> Result<bool> {
        let Some(max_age) = self.stale_after else {
            return Ok(false);
        };

        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            // The holder released between our claim attempt and this read
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(Error::Lock(e)),
        };

        // An unreadable lease (empty or foreign content) is never reclaimed
        let Ok(lease) = serde_json::from_slice::<Lease>(&content) else {
            return Ok(false);
        };

        if !lease.is_stale(max_age) {
            return Ok(false);
        }

        warn!(
            path = %self.path.display(),
            holder_pid = lease.pid,
            acquired_at = %lease.acquired_at,
            "reclaiming stale lock marker"
        );
        remove_marker(&self.path).await?;
        Ok(true)
    }

    /// Remove the marker regardless of holder.
    ///
    /// Removal is idempotent: releasing an already-absent marker is not an
    /// error.
    pub async fn release(&self) -> Result<()> {
        remove_marker(&self.path).await
    }
}

/// Claim over the marker, returned by [`MarkerLock::acquire`]
///
/// Call [`release`](MarkerGuard::release) once the remote command has
/// completed, successfully or not. Dropping the guard removes the marker
/// best-effort.
#[must_use = "the marker stays on disk until released"]
#[derive(Debug)]
pub struct MarkerGuard {
    path: PathBuf,
    released: bool,
}

impl MarkerGuard {
    /// Remove the marker. Idempotent; a missing marker is not an error.
    pub async fn release(mut self) -> Result<()> {
        self.released = true;
        remove_marker(&self.path).await
    }
}

impl Drop for MarkerGuard {
    fn drop(&mut self) {
        if !self.released {
            debug!(path = %self.path.display(), "guard dropped without release, removing marker");
            if let Err(e) = std::fs::remove_file(&self.path)
                && e.kind() != ErrorKind::NotFound
            {
                warn!(path = %self.path.display(), "failed to remove marker on drop: {e}");
            }
        }
    }
}

async fn remove_marker(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Lock(e)),
    }
}
