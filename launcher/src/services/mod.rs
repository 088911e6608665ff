//! Service implementations
//!
//! This module contains real implementations of the launcher's collaborator
//! traits. These are the implementations that handle actual I/O operations.

pub mod isolation;
pub mod local_executor;
pub mod probe;

#[cfg(test)]
mod tests;

// Re-export all service implementations
#[cfg(target_os = "linux")]
pub use isolation::Namespace;
pub use isolation::Taskset;
pub use local_executor::{LocalExecutor, LocalTaskHandle};
pub use probe::{FnProbe, TcpReadinessProbe};
