//! Error types for the pshdns system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for pshdns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Token the remote side includes in its diagnostics when a lookup failed
/// because the requested object does not exist.
const OBJECT_NOT_FOUND: &str = "ObjectNotFound";

/// Core error type for the pshdns system
#[derive(Error, Debug)]
pub enum Error {
    /// Required connection parameter absent
    #[error("missing mandatory parameter '{0}'")]
    MissingConfiguration(String),

    /// Required type-specific value missing or malformed for the record type
    #[error("invalid record configuration for '{record_name}': {reason}")]
    InvalidRecordConfiguration {
        /// The record the configuration belongs to
        record_name: String,
        /// What is missing or malformed
        reason: String,
    },

    /// Record type outside the supported set
    #[error("unsupported record type '{0}': only 'A', 'CNAME', and 'PTR' records are supported")]
    UnsupportedRecordType(String),

    /// Transport, authentication, or session setup failed before the command ran
    #[error("remote connection failed: {0}")]
    Connection(String),

    /// The remote process ran and reported an error
    #[error("failed to execute command '{command}' on server: {message}")]
    Command {
        /// The command text, kept for diagnostic context
        command: String,
        /// The failure reported by the remote side
        message: String,
        /// Partial output captured before the failure
        output: Vec<u8>,
    },

    /// Filesystem error manipulating the lock marker
    #[error("lock marker error: {0}")]
    Lock(#[from] std::io::Error),

    /// A configured deadline expired
    #[error("{what} timed out after {secs}s")]
    Timeout {
        /// What was being waited on
        what: &'static str,
        /// The configured limit
        secs: u64,
    },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a missing-parameter error
    pub fn missing_configuration(param: impl Into<String>) -> Self {
        Self::MissingConfiguration(param.into())
    }

    /// Create an invalid-record-configuration error
    pub fn invalid_record(record_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecordConfiguration {
            record_name: record_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a command-failure error
    pub fn command(
        command: impl Into<String>,
        message: impl Into<String>,
        output: Vec<u8>,
    ) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
            output,
        }
    }

    /// Create a timeout error
    pub fn timeout(what: &'static str, secs: u64) -> Self {
        Self::Timeout { what, secs }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this is a command failure caused by the record not existing.
    ///
    /// Only [`Error::Command`] is consulted; a connection failure never
    /// classifies as not-found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Command {
                message, output, ..
            } => {
                message.contains(OBJECT_NOT_FOUND)
                    || String::from_utf8_lossy(output).contains(OBJECT_NOT_FOUND)
            }
            _ => false,
        }
    }

    /// Whether this error arose before the command could run
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
