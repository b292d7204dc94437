//! Test doubles and common utilities for contract tests
//!
//! This module provides a scripted executor double that records every
//! command it is handed, so tests can assert both what ran and that
//! nothing ran at all.

use async_trait::async_trait;
use pshdns_core::config::ConnectionConfig;
use pshdns_core::error::{Error, Result};
use pshdns_core::executor::{CommandOutput, RemoteExecutor};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted reply for the mock executor
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum MockResponse {
    /// Command succeeds with the given output
    Output(&'static str),
    /// Command fails with a not-found classification
    NotFound,
    /// Command fails with some other remote error
    CommandFailure(&'static str),
    /// Session setup fails before the command runs
    ConnectionFailure(&'static str),
}

/// A `RemoteExecutor` double that records commands and replays scripted
/// responses in order. When the script runs dry it keeps succeeding with
/// empty output.
pub struct MockExecutor {
    run_call_count: AtomicUsize,
    commands: Mutex<Vec<String>>,
    responses: Mutex<VecDeque<MockResponse>>,
}

#[allow(dead_code)]
impl MockExecutor {
    pub fn new() -> Arc<Self> {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<MockResponse>) -> Arc<Self> {
        Arc::new(Self {
            run_call_count: AtomicUsize::new(0),
            commands: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into()),
        })
    }

    /// How many times run() was invoked
    pub fn run_call_count(&self) -> usize {
        self.run_call_count.load(Ordering::SeqCst)
    }

    /// Every command handed to run(), in order
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteExecutor for MockExecutor {
    async fn run(&self, command: &str) -> Result<CommandOutput> {
        self.run_call_count.fetch_add(1, Ordering::SeqCst);
        self.commands.lock().unwrap().push(command.to_string());

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(MockResponse::Output(text)) => Ok(CommandOutput::new(text)),
            Some(MockResponse::NotFound) => Err(Error::command(
                command,
                "ObjectNotFound: Cannot find the requested object",
                vec![],
            )),
            Some(MockResponse::CommandFailure(message)) => {
                Err(Error::command(command, message, vec![]))
            }
            Some(MockResponse::ConnectionFailure(message)) => Err(Error::connection(message)),
            None => Ok(CommandOutput::default()),
        }
    }
}

/// Connection configuration with the lock marker under a test directory
#[allow(dead_code)]
pub fn test_connection_config(dir: &Path) -> ConnectionConfig {
    ConnectionConfig::new("admin", "secret", "dc01.corp.local")
        .with_lock_path(dir.join("pshdns.lock"))
}
