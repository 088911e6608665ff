//! Test fixtures for launcher tests

use std::time::Duration;

use launcher::MemcachedConfig;

pub struct TestFixtures;

impl TestFixtures {
    pub const EXPECTED_COMMAND: &'static str = "test -p 11211 -u root -t 4 -m 4096 -c 2048 -T";
    pub const EXPECTED_HOST: &'static str = "127.0.0.1";
    pub const EXPECTED_ADDRESS: &'static str = "127.0.0.1:11211";

    /// Default configuration pointing at a fake binary with thread affinity on
    pub fn config() -> MemcachedConfig {
        MemcachedConfig {
            path_to_binary: "test".to_string(),
            threads_affinity: true,
            ..MemcachedConfig::default()
        }
    }

    pub fn config_on_port(port: u16) -> MemcachedConfig {
        MemcachedConfig {
            port,
            ..Self::config()
        }
    }

    pub fn listen_timeout() -> Duration {
        Self::config().listen_timeout
    }
}
