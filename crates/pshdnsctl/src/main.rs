// # pshdnsctl - one-shot record operation CLI
//
// Thin integration layer over pshdns-core: read configuration from
// environment variables, wire the SSH executor into the record manager,
// run a single operation, print the resulting identifier. All record and
// DNS logic lives in pshdns-core.
//
// ## Usage
//
// ```bash
// pshdnsctl <create|read|delete>
// ```
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Connection
// - `PSHDNS_USERNAME`: Username to connect with (required)
// - `PSHDNS_PASSWORD`: Password to connect with (required)
// - `PSHDNS_SSH_SERVER`: The SSH server to connect to (required)
// - `PSHDNS_SSH_SERVER_PORT`: The SSH server port (default 22)
// - `PSHDNS_DNS_SERVER`: DNS server hosting the zone, when not the SSH
//   target itself
// - `PSHDNS_LOCK_PATH`: Path of the mutual-exclusion marker
// - `PSHDNS_COMMAND_TIMEOUT_SECS`: Remote command deadline (0 disables)
// - `PSHDNS_LOCK_TIMEOUT_SECS`: Lock acquisition deadline (0 waits)
// - `PSHDNS_LOCK_STALE_SECS`: Stale-lease takeover age (0 disables)
//
// ### Record
// - `PSHDNS_ZONE_NAME`: Zone the record lives in (required)
// - `PSHDNS_RECORD_NAME`: Record name within the zone (required)
// - `PSHDNS_RECORD_TYPE`: A, CNAME, or PTR (required)
// - `PSHDNS_IPV4_ADDRESS`: Address, for A records
// - `PSHDNS_HOSTNAME_ALIAS`: Alias target, for CNAME records
// - `PSHDNS_PTR_DOMAINNAME`: Pointer target, for PTR records
//
// ### Logging
// - `PSHDNS_LOG_LEVEL`: trace, debug, info, warn, or error (default info)
//
// ## Example
//
// ```bash
// export PSHDNS_USERNAME=admin
// export PSHDNS_PASSWORD=secret
// export PSHDNS_SSH_SERVER=dc01.corp.local
// export PSHDNS_ZONE_NAME=corp.local
// export PSHDNS_RECORD_NAME=host1
// export PSHDNS_RECORD_TYPE=A
// export PSHDNS_IPV4_ADDRESS=10.0.0.5
//
// pshdnsctl create
// ```

use anyhow::Result;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use pshdns_core::{ConnectionConfig, RecordConfig, RecordManager, RecordType};
use pshdns_exec_ssh::SshExecutor;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Operation succeeded
/// - 1: Configuration or usage error
/// - 2: Runtime error (operation failed)
#[derive(Debug, Clone, Copy)]
enum PshdnsExitCode {
    /// Operation succeeded
    Success = 0,
    /// Configuration or usage error
    ConfigError = 1,
    /// Operation failed at runtime
    RuntimeError = 2,
}

impl From<PshdnsExitCode> for ExitCode {
    fn from(code: PshdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// The operation named on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Create,
    Read,
    Delete,
}

impl Operation {
    fn parse(arg: &str) -> Option<Self> {
        match arg {
            "create" => Some(Self::Create),
            "read" => Some(Self::Read),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Load the record definition from environment variables
fn record_from_env() -> Result<RecordConfig> {
    let zone_name = env::var("PSHDNS_ZONE_NAME")
        .map_err(|_| anyhow::anyhow!("PSHDNS_ZONE_NAME is required"))?;
    let record_name = env::var("PSHDNS_RECORD_NAME")
        .map_err(|_| anyhow::anyhow!("PSHDNS_RECORD_NAME is required"))?;
    let record_type: RecordType = env::var("PSHDNS_RECORD_TYPE")
        .map_err(|_| anyhow::anyhow!("PSHDNS_RECORD_TYPE is required"))?
        .parse()?;

    let mut record = RecordConfig::new(zone_name, record_name, record_type);
    if let Ok(address) = env::var("PSHDNS_IPV4_ADDRESS") {
        record = record.with_ipv4_address(address);
    }
    if let Ok(alias) = env::var("PSHDNS_HOSTNAME_ALIAS") {
        record = record.with_hostname_alias(alias);
    }
    if let Ok(domainname) = env::var("PSHDNS_PTR_DOMAINNAME") {
        record = record.with_ptr_domainname(domainname);
    }
    Ok(record)
}

fn main() -> ExitCode {
    let Some(operation) = env::args().nth(1).as_deref().and_then(Operation::parse) else {
        eprintln!("usage: pshdnsctl <create|read|delete>");
        return PshdnsExitCode::ConfigError.into();
    };

    // Initialize tracing
    let log_level = match env::var("PSHDNS_LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return PshdnsExitCode::ConfigError.into();
    }

    // Load and validate configuration from environment
    let connection = ConnectionConfig::from_env();
    if let Err(e) = connection.validate() {
        error!("Configuration error: {e}");
        return PshdnsExitCode::ConfigError.into();
    }
    let record = match record_from_env() {
        Ok(record) => record,
        Err(e) => {
            error!("Configuration error: {e}");
            return PshdnsExitCode::ConfigError.into();
        }
    };

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            return PshdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_operation(operation, connection, record).await {
            Ok(()) => PshdnsExitCode::Success,
            Err(e) => {
                error!("Operation failed: {e}");
                PshdnsExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Run a single record operation
async fn run_operation(
    operation: Operation,
    connection: ConnectionConfig,
    record: RecordConfig,
) -> Result<()> {
    info!(
        server = %connection.ssh_server,
        record = %record.record_id(),
        ?operation,
        "starting operation"
    );

    let executor = Arc::new(SshExecutor::new(connection.clone()));
    let manager = RecordManager::new(connection, executor);

    match operation {
        Operation::Create => {
            let id = manager.create(&record).await?;
            println!("{id}");
        }
        Operation::Read => {
            // An empty line signals "record absent" to the orchestrator
            match manager.read(&record).await? {
                Some(id) => println!("{id}"),
                None => println!(),
            }
        }
        Operation::Delete => {
            manager.delete(&record).await?;
        }
    }

    Ok(())
}
