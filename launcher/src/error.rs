//! Launcher-specific error types

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use shared::SharedError;
use thiserror::Error;

/// Errors raised by executors and task handles
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("{0}")]
    Failed(String),

    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to prepare output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Task {pid} is still running")]
    TaskRunning { pid: u32 },

    #[error("Signal delivery failed: {message}")]
    Signal { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExecutorError {
    pub fn failed(message: impl Into<String>) -> Self {
        ExecutorError::Failed(message.into())
    }
}

/// Step of the teardown sequence run after a failed readiness check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupStep {
    Stop,
    Clean,
    EraseOutput,
}

impl fmt::Display for CleanupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupStep::Stop => write!(f, "stop"),
            CleanupStep::Clean => write!(f, "clean"),
            CleanupStep::EraseOutput => write!(f, "erase output"),
        }
    }
}

/// Failures collected while tearing down a task, in the order they happened
#[derive(Debug, Default)]
pub struct CleanupErrors {
    errors: Vec<(CleanupStep, ExecutorError)>,
}

impl CleanupErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a cleanup step, keeping it only if it failed
    pub fn record(&mut self, step: CleanupStep, result: Result<(), ExecutorError>) {
        if let Err(e) = result {
            self.errors.push((step, e));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn failed_steps(&self) -> Vec<CleanupStep> {
        self.errors.iter().map(|(step, _)| *step).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(CleanupStep, ExecutorError)> {
        self.errors.iter()
    }
}

impl fmt::Display for CleanupErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return Ok(());
        }
        write!(f, "; cleanup failed: ")?;
        for (i, (step, error)) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{step}: {error}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error(transparent)]
    Execution(#[from] ExecutorError),

    #[error("{workload} did not become reachable at {address} within {timeout:?}{cleanup}")]
    NotReady {
        workload: String,
        address: String,
        timeout: Duration,
        cleanup: CleanupErrors,
    },

    #[error("Shutdown of {workload} incomplete{cleanup}")]
    Shutdown {
        workload: String,
        cleanup: CleanupErrors,
    },

    #[error("Configuration error: {field}: {reason}")]
    Configuration { field: String, reason: String },

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LauncherError {
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LauncherError::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Cleanup failures attached to the error, if any
    pub fn cleanup_errors(&self) -> Option<&CleanupErrors> {
        match self {
            LauncherError::NotReady { cleanup, .. } | LauncherError::Shutdown { cleanup, .. } => {
                Some(cleanup)
            }
            _ => None,
        }
    }
}

pub type LauncherResult<T> = Result<T, LauncherError>;
