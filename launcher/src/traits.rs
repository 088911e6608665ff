//! Trait definitions with mockall annotations for testing
//!
//! These are the seams of the launcher: process execution, the handle of a
//! running task, command-line isolation and readiness probing. The launcher
//! only talks to its collaborators through them, so every one can be swapped
//! for a mock or an alternate backend.

use std::time::Duration;

use crate::error::{ExecutorError, LauncherResult};

/// Live reference to a spawned process
#[mockall::automock]
#[async_trait::async_trait]
pub trait TaskHandle: Send + Sync {
    /// Host the task can be reached on
    fn address(&self) -> String;

    /// Terminate the task
    async fn stop(&self) -> Result<(), ExecutorError>;

    /// Release resources held for the task (file descriptors, reaped state)
    async fn clean(&self) -> Result<(), ExecutorError>;

    /// Remove output captured for the task
    async fn erase_output(&self) -> Result<(), ExecutorError>;
}

/// Process execution abstraction
///
/// Turns a command line into a running task.
#[mockall::automock]
#[async_trait::async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, command: &str) -> Result<Box<dyn TaskHandle>, ExecutorError>;
}

/// Isolation decorator wrapping a command line with sandboxing prefixes
#[mockall::automock]
pub trait Decorator: Send + Sync {
    fn decorate(&self, command: &str) -> String;
}

/// Bounded readiness check for a started service
///
/// Implementations must return within `timeout`.
#[mockall::automock]
#[async_trait::async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn is_ready(&self, address: &str, timeout: Duration) -> bool;
}

/// Workload launcher
#[async_trait::async_trait]
pub trait Launcher: Send + Sync {
    /// Start the workload and return its handle once it is reachable
    async fn launch(&self) -> LauncherResult<Box<dyn TaskHandle>>;

    /// Human readable workload name
    fn name(&self) -> &str;
}
