//! Launcher library for starting memcached under a benchmarking harness
//!
//! A [`MemcachedLauncher`] builds the server command line from a typed
//! configuration, hands it to an injected [`Executor`], waits for the server
//! to accept connections and hands back the running task. When the server
//! never comes up, the task is torn down and every failure is reported in a
//! single error.

pub mod command;
pub mod config;
pub mod error;
pub mod launcher;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::{MemcachedConfig, MemcachedConfigBuilder};
pub use error::{CleanupErrors, CleanupStep, ExecutorError, LauncherError, LauncherResult};
pub use launcher::MemcachedLauncher;
pub use traits::{Decorator, Executor, Launcher, ReadinessProbe, TaskHandle};

// Mocks generated for the collaborator traits
pub use traits::{MockDecorator, MockExecutor, MockReadinessProbe, MockTaskHandle};
