// # SSH Remote Executor
//
// This crate provides the SSH-backed implementation of the
// `RemoteExecutor` trait for the pshdns system.
//
// ## Session lifecycle
//
// Every call opens a fresh connection (dial, password authentication,
// session channel, PTY request, exec) and tears it down before returning,
// on success and on failure alike. There is no pooling or
// reuse across calls; the remote side sees one short-lived session per
// administrative command.
//
// ## Failure classification
//
// - Dial, authentication, channel, and PTY failures are `Error::Connection`:
//   the command never ran, and the caller decides what to do about it.
// - A nonzero remote exit status is `Error::Command`, carrying the command
//   text and whatever output was captured before the failure.
// - The configured command deadline turns into `Error::Timeout`.
//
// ## PTY
//
// The remote shell is asked for an `xterm` PTY (80x40, echo off); the
// DNS-server cmdlets refuse to run non-interactively on some hosts.

use async_trait::async_trait;
use russh::client;
use russh::keys::key;
use russh::{ChannelMsg, Disconnect, Pty};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

use pshdns_core::config::ConnectionConfig;
use pshdns_core::error::{Error, Result};
use pshdns_core::executor::{CommandOutput, RemoteExecutor};

const TERM: &str = "xterm";
const TERM_COLS: u32 = 80;
const TERM_ROWS: u32 = 40;

/// Terminal modes requested with the PTY: echo off, 14.4k line speed
const TERM_MODES: &[(Pty, u32)] = &[
    (Pty::ECHO, 0),
    (Pty::TTY_OP_ISPEED, 14400),
    (Pty::TTY_OP_OSPEED, 14400),
];

/// SSH implementation of [`RemoteExecutor`]
///
/// Holds only the connection configuration; all session state is
/// per-call.
#[derive(Debug, Clone)]
pub struct SshExecutor {
    config: ConnectionConfig,
}

/// Accepts any server host key; sessions are password-authenticated.
struct AcceptingClient;

#[async_trait]
impl client::Handler for AcceptingClient {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        Ok(true)
    }
}

impl SshExecutor {
    /// Create an executor over a validated connection configuration
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    async fn execute(&self, command: &str) -> Result<CommandOutput> {
        let addr = format!("{}:{}", self.config.ssh_server, self.config.ssh_port);
        trace!(%addr, "opening ssh connection");

        let ssh_config = Arc::new(client::Config::default());
        let mut session = client::connect(ssh_config, addr.as_str(), AcceptingClient)
            .await
            .map_err(|e| Error::connection(format!("failed to connect to {addr}: {e}")))?;

        let authenticated = session
            .authenticate_password(self.config.username.as_str(), self.config.password.as_str())
            .await
            .map_err(|e| Error::connection(format!("authentication error: {e}")))?;
        if !authenticated {
            return Err(Error::connection(format!(
                "authentication rejected for user '{}'",
                self.config.username
            )));
        }

        let result = self.run_on_session(&mut session, command).await;

        if let Err(e) = session
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
        {
            debug!("error during disconnect: {e}");
        }

        result
    }

    async fn run_on_session(
        &self,
        session: &mut client::Handle<AcceptingClient>,
        command: &str,
    ) -> Result<CommandOutput> {
        let mut channel = session
            .channel_open_session()
            .await
            .map_err(|e| Error::connection(format!("failed to open session channel: {e}")))?;

        channel
            .request_pty(false, TERM, TERM_COLS, TERM_ROWS, 0, 0, TERM_MODES)
            .await
            .map_err(|e| Error::connection(format!("failed to request pty: {e}")))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| Error::connection(format!("failed to start command: {e}")))?;

        let mut output: Vec<u8> = Vec::new();
        let mut exit_status: Option<u32> = None;
        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => output.extend_from_slice(data),
                ChannelMsg::ExtendedData { ref data, .. } => output.extend_from_slice(data),
                ChannelMsg::ExitStatus { exit_status: code } => exit_status = Some(code),
                _ => {}
            }
        }

        match exit_status {
            // A channel closed without an exit status is treated as clean;
            // some Windows SSH servers omit it for PTY sessions.
            Some(0) | None => Ok(CommandOutput::new(output)),
            Some(code) => {
                warn!(%code, "remote command reported failure");
                Err(Error::command(
                    command,
                    format!("remote process exited with status {code}"),
                    output,
                ))
            }
        }
    }
}

#[async_trait]
impl RemoteExecutor for SshExecutor {
    async fn run(&self, command: &str) -> Result<CommandOutput> {
        debug!(server = %self.config.ssh_server, "running remote command");

        let secs = self.config.command_timeout_secs;
        if secs == 0 {
            return self.execute(command).await;
        }
        match tokio::time::timeout(Duration::from_secs(secs), self.execute(command)).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout("remote command", secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_host_is_a_connection_failure() {
        // Reserved TEST-NET-1 address; nothing listens there
        let config = ConnectionConfig::new("admin", "secret", "192.0.2.1")
            .with_ssh_port("22")
            .with_command_timeout_secs(1);
        let executor = SshExecutor::new(config);

        let err = executor.run("Get-DnsServerResourceRecord").await.unwrap_err();
        match err {
            Error::Connection(_) | Error::Timeout { .. } => {}
            other => panic!("expected connection failure or timeout, got {other:?}"),
        }
    }
}
