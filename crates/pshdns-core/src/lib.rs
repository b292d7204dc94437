// # pshdns-core
//
// Core library for managing DNS resource records (A, CNAME, PTR) on a
// remote Windows DNS server that only exposes a remote shell.
//
// ## Architecture Overview
//
// Declarative record definitions are translated into PowerShell
// DNS-server cmdlet invocations and executed over an authenticated remote
// session, with a cross-process marker lock serializing mutations:
//
// - **MarkerLock**: file-presence mutual exclusion shared by every process
//   configured with the same marker path
// - **RemoteExecutor**: trait for running one administrative command per
//   authenticated session (implemented by `pshdns-exec-ssh`)
// - **command**: translation of record descriptors into create / probe /
//   delete commands, with validation and quoting
// - **RecordManager**: create/read/delete orchestration and record
//   identifier handling
//
// ## Design Principles
//
// 1. **Separation of Concerns**: translation, transport, and coordination
//    are separate seams
// 2. **Classified failures**: connection setup errors, command failures,
//    and "record absent" are distinct outcomes
// 3. **Library-First**: all functionality is usable without the CLI

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod executor;
pub mod lock;
pub mod record;

// Re-export core types for convenience
pub use config::ConnectionConfig;
pub use controller::RecordManager;
pub use error::{Error, Result};
pub use executor::{CommandOutput, RemoteExecutor};
pub use lock::{MarkerGuard, MarkerLock};
pub use record::{RecordConfig, RecordType};
