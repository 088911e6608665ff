//! Shared types for the memcached launcher workspace
//!
//! Contains the pieces used by more than one crate: the shared error type,
//! process-aware logging and the endpoint type used to address services.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
