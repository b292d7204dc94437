// # Remote Executor Trait
//
// Defines the interface for running one administrative command on the
// remote server.
//
// ## Implementations
//
// - SSH: `pshdns-exec-ssh` crate
// - Test doubles: `tests/common/mod.rs`
//
// ## Responsibilities
//
// An executor opens a fresh authenticated session per call, runs exactly
// one command string, captures combined output, and tears the session down
// on every exit path. It performs no quoting, validation, retrying, or
// locking; command construction belongs to the translator, coordination
// to the lifecycle controller.

use async_trait::async_trait;
use std::borrow::Cow;

use crate::error::Result;

/// Captured result of one remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Combined output captured from the remote process
    pub output: Vec<u8>,
}

impl CommandOutput {
    /// Wrap raw captured output
    pub fn new(output: impl Into<Vec<u8>>) -> Self {
        Self {
            output: output.into(),
        }
    }

    /// Lossy UTF-8 view of the captured output
    pub fn as_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.output)
    }

    /// Whether the captured output contains the given marker token
    pub fn contains(&self, marker: &str) -> bool {
        self.as_text().contains(marker)
    }
}

/// Trait for remote command execution implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Failure classes
///
/// Callers rely on the distinction between the error kinds:
///
/// - `Error::Connection`: transport, authentication, or session setup
///   failed; the command never ran. Returned, never process-fatal.
/// - `Error::Command`: the remote process ran and reported failure. The
///   original command text and any partial output are preserved for
///   diagnostics; only this class is consulted for the not-found sub-case.
/// - `Error::Timeout`: the configured command deadline expired.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Execute exactly one command string on the remote host
    ///
    /// # Returns
    ///
    /// - `Ok(CommandOutput)`: the raw output the remote process produced
    /// - `Err(Error)`: a classified failure, see the trait-level docs
    async fn run(&self, command: &str) -> Result<CommandOutput>;
}
