//! Readiness probes
//!
//! `TcpReadinessProbe` polls the service with TCP connects until one
//! succeeds or the deadline passes. `FnProbe` adapts a plain closure, which
//! is what tests and non-TCP services plug in.

use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout as with_timeout};

use crate::traits::ReadinessProbe;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Probe that considers a service ready once it accepts a TCP connection
#[derive(Debug, Clone)]
pub struct TcpReadinessProbe {
    poll_interval: Duration,
}

impl TcpReadinessProbe {
    pub fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Configure delay between connection attempts (fluent API)
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Connect until one attempt succeeds, with no deadline of its own
    async fn poll(&self, address: &str) -> bool {
        loop {
            if TcpStream::connect(address).await.is_ok() {
                return true;
            }
            sleep(self.poll_interval).await;
        }
    }
}

impl Default for TcpReadinessProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadinessProbe for TcpReadinessProbe {
    async fn is_ready(&self, address: &str, timeout: Duration) -> bool {
        // Dropping the poll future also abandons a connect still in flight
        with_timeout(timeout, self.poll(address)).await.unwrap_or(false)
    }
}

/// Probe backed by a closure
pub struct FnProbe<F> {
    check: F,
}

impl<F> FnProbe<F>
where
    F: Fn(&str, Duration) -> bool + Send + Sync,
{
    pub fn new(check: F) -> Self {
        Self { check }
    }
}

#[async_trait]
impl<F> ReadinessProbe for FnProbe<F>
where
    F: Fn(&str, Duration) -> bool + Send + Sync,
{
    async fn is_ready(&self, address: &str, timeout: Duration) -> bool {
        (self.check)(address, timeout)
    }
}
