//! Configuration types for the pshdns system
//!
//! This module defines the per-instance connection configuration. One
//! [`ConnectionConfig`] describes the SSH endpoint, the credentials, the
//! optional DNS-server override, and the lock-marker path that every
//! operation issued through that instance shares.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Default SSH port when none is configured
pub const DEFAULT_SSH_PORT: &str = "22";

/// Default remote-command deadline, in seconds
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 60;

/// Per-instance connection configuration
///
/// Immutable after construction. All operations sharing a configuration
/// (and any other process configured with the same `lock_path`) coordinate
/// through the same lock marker.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Username to authenticate the remote session with
    pub username: String,

    /// Password to authenticate the remote session with
    /// ⚠️ NEVER log this value
    pub password: String,

    /// The SSH server to connect to
    pub ssh_server: String,

    /// The SSH server port to connect to
    #[serde(default = "default_ssh_port")]
    pub ssh_port: String,

    /// DNS server hosting the zone, when it is not the SSH target itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_server: Option<String>,

    /// Path of the mutual-exclusion marker shared by mutating operations
    #[serde(default = "default_lock_path")]
    pub lock_path: PathBuf,

    /// Deadline for one remote command, in seconds (0 disables)
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    /// Deadline for acquiring the lock, in seconds (0 waits indefinitely)
    #[serde(default)]
    pub lock_timeout_secs: u64,

    /// Lease age after which a waiter may reclaim an abandoned marker,
    /// in seconds (0 disables takeover)
    #[serde(default)]
    pub lock_stale_secs: u64,
}

// Custom Debug implementation that hides the password
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("ssh_server", &self.ssh_server)
            .field("ssh_port", &self.ssh_port)
            .field("dns_server", &self.dns_server)
            .field("lock_path", &self.lock_path)
            .field("command_timeout_secs", &self.command_timeout_secs)
            .field("lock_timeout_secs", &self.lock_timeout_secs)
            .field("lock_stale_secs", &self.lock_stale_secs)
            .finish()
    }
}

impl ConnectionConfig {
    /// Create a configuration with defaults for everything optional
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        ssh_server: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ssh_server: ssh_server.into(),
            ssh_port: default_ssh_port(),
            dns_server: None,
            lock_path: default_lock_path(),
            command_timeout_secs: default_command_timeout_secs(),
            lock_timeout_secs: 0,
            lock_stale_secs: 0,
        }
    }

    /// Set the SSH port
    pub fn with_ssh_port(mut self, port: impl Into<String>) -> Self {
        self.ssh_port = port.into();
        self
    }

    /// Set the DNS-server override
    pub fn with_dns_server(mut self, server: impl Into<String>) -> Self {
        self.dns_server = Some(server.into());
        self
    }

    /// Set the lock-marker path
    pub fn with_lock_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lock_path = path.into();
        self
    }

    /// Set the remote-command deadline in seconds (0 disables)
    pub fn with_command_timeout_secs(mut self, secs: u64) -> Self {
        self.command_timeout_secs = secs;
        self
    }

    /// Set the lock-acquisition deadline in seconds (0 waits indefinitely)
    pub fn with_lock_timeout_secs(mut self, secs: u64) -> Self {
        self.lock_timeout_secs = secs;
        self
    }

    /// Set the stale-lease takeover age in seconds (0 disables)
    pub fn with_lock_stale_secs(mut self, secs: u64) -> Self {
        self.lock_stale_secs = secs;
        self
    }

    /// Load configuration from environment variables
    ///
    /// Reads `PSHDNS_USERNAME`, `PSHDNS_PASSWORD`, `PSHDNS_SSH_SERVER`,
    /// `PSHDNS_SSH_SERVER_PORT`, `PSHDNS_DNS_SERVER`, `PSHDNS_LOCK_PATH`,
    /// `PSHDNS_COMMAND_TIMEOUT_SECS`, and `PSHDNS_LOCK_TIMEOUT_SECS`.
    /// Missing required variables surface from [`validate`](Self::validate),
    /// not here.
    pub fn from_env() -> Self {
        let mut config = Self::new(
            env::var("PSHDNS_USERNAME").unwrap_or_default(),
            env::var("PSHDNS_PASSWORD").unwrap_or_default(),
            env::var("PSHDNS_SSH_SERVER").unwrap_or_default(),
        );
        if let Ok(port) = env::var("PSHDNS_SSH_SERVER_PORT") {
            config.ssh_port = port;
        }
        config.dns_server = env::var("PSHDNS_DNS_SERVER").ok().filter(|s| !s.is_empty());
        if let Ok(path) = env::var("PSHDNS_LOCK_PATH") {
            config.lock_path = PathBuf::from(path);
        }
        if let Some(secs) = parse_env_u64("PSHDNS_COMMAND_TIMEOUT_SECS") {
            config.command_timeout_secs = secs;
        }
        if let Some(secs) = parse_env_u64("PSHDNS_LOCK_TIMEOUT_SECS") {
            config.lock_timeout_secs = secs;
        }
        if let Some(secs) = parse_env_u64("PSHDNS_LOCK_STALE_SECS") {
            config.lock_stale_secs = secs;
        }
        config
    }

    /// Validate the configuration
    ///
    /// Required parameters must be present before any remote call is
    /// attempted; the first absent one is named in the error.
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(Error::missing_configuration("username"));
        }
        if self.password.is_empty() {
            return Err(Error::missing_configuration("password"));
        }
        if self.ssh_server.is_empty() {
            return Err(Error::missing_configuration("ssh_server"));
        }
        self.port()?;
        if self.lock_path.as_os_str().is_empty() {
            return Err(Error::config("lock_path cannot be empty"));
        }
        Ok(())
    }

    /// The SSH port as a number
    pub fn port(&self) -> Result<u16> {
        let port: u16 = self
            .ssh_port
            .parse()
            .map_err(|_| Error::config(format!("invalid ssh_port '{}'", self.ssh_port)))?;
        if port == 0 {
            return Err(Error::config("ssh_port cannot be 0"));
        }
        Ok(port)
    }

    /// The DNS-server override, if configured
    pub fn dns_server(&self) -> Option<&str> {
        self.dns_server.as_deref()
    }
}

fn parse_env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

fn default_ssh_port() -> String {
    DEFAULT_SSH_PORT.to_string()
}

fn default_lock_path() -> PathBuf {
    env::temp_dir().join("pshdns.lock")
}

fn default_command_timeout_secs() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}
