//! Service-specific tests
//!
//! Each service has its own test file; these run against the real
//! implementations (local processes, sockets, the filesystem).


// Common test utilities for services
pub mod common {
    use std::time::Duration;

    /// Deadline used by probe tests
    pub const PROBE_TIMEOUT: Duration = Duration::from_millis(300);

    /// Upper bound for anything expected to finish "about" on a deadline
    pub const SLACK: Duration = Duration::from_millis(500);
}
