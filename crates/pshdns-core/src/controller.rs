//! Record lifecycle orchestration
//!
//! [`RecordManager`] ties the pieces together: it validates and translates
//! a record descriptor into a command, serializes mutations through the
//! marker lock, hands the command to the executor, and interprets the
//! outcome into the record identifier the caller stores.
//!
//! ## Flow
//!
//! ```text
//! create/delete:  translate ──▶ acquire marker ──▶ execute ──▶ release marker
//! read:           translate ──▶ execute (no lock) ──▶ classify output
//! ```
//!
//! Mutations release the marker on the path that reached execution whether
//! the command succeeded or not; a failed command is a completed operation.
//! Reads take no lock and treat an absent record as a normal outcome, not
//! an error.

use std::sync::Arc;
use tracing::{debug, info};

use crate::command;
use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::executor::RemoteExecutor;
use crate::lock::MarkerLock;
use crate::record::RecordConfig;

/// Orchestrates create, read, and delete for managed records
///
/// Holds no per-record state: the record identifier returned by each
/// operation is the caller's to store. Cheap to clone-per-operation via the
/// shared executor.
pub struct RecordManager {
    config: ConnectionConfig,
    executor: Arc<dyn RemoteExecutor>,
    lock: MarkerLock,
}

impl RecordManager {
    /// Create a manager over a validated connection configuration
    pub fn new(config: ConnectionConfig, executor: Arc<dyn RemoteExecutor>) -> Self {
        let lock = MarkerLock::from_config(&config);
        Self {
            config,
            executor,
            lock,
        }
    }

    /// Create the record and return its identifier.
    ///
    /// Validation happens before the lock is taken; a descriptor missing
    /// its type-specific value never touches the lock or the server. The
    /// marker is released on the path that reached execution regardless of
    /// the command's outcome, and there is no automatic retry.
    pub async fn create(&self, record: &RecordConfig) -> Result<String> {
        let cmd = command::build_create_command(record, self.config.dns_server())?;

        let guard = self.lock.acquire().await?;
        debug!(record = %record.record_id(), "executing create");
        let run_result = self.executor.run(&cmd).await;
        let release_result = guard.release().await;
        run_result?;
        release_result?;

        let id = record.record_id();
        info!(record = %id, "record created");
        Ok(id)
    }

    /// Check whether the record exists.
    ///
    /// Takes no lock. Returns `Ok(Some(identifier))` when the server
    /// confirms the record, `Ok(None)` when the record is absent, whether
    /// the probe exited cleanly without the marker or failed with a
    /// not-found classification. Any other failure surfaces.
    pub async fn read(&self, record: &RecordConfig) -> Result<Option<String>> {
        let cmd = command::build_exists_command(record, self.config.dns_server())?;

        match self.executor.run(&cmd).await {
            Ok(output) if output.contains(command::FOUND_MARKER) => {
                let id = record.record_id();
                debug!(record = %id, "record confirmed");
                Ok(Some(id))
            }
            Ok(_) => {
                debug!(record = %record.record_id(), "record not present");
                Ok(None)
            }
            Err(e) if e.is_not_found() => {
                debug!(record = %record.record_id(), "record not present");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete the record.
    ///
    /// `Ok(())` means the identifier is cleared on the caller's side. The
    /// marker is released whether or not the command succeeded.
    pub async fn delete(&self, record: &RecordConfig) -> Result<()> {
        let cmd = command::build_delete_command(record, self.config.dns_server())?;

        let guard = self.lock.acquire().await?;
        debug!(record = %record.record_id(), "executing delete");
        let run_result = self.executor.run(&cmd).await;
        let release_result = guard.release().await;
        run_result?;
        release_result?;

        info!(record = %record.record_id(), "record deleted");
        Ok(())
    }
}
