//! Memcached launcher
//!
//! Launching runs a fixed sequence: build the command, execute it, probe the
//! server until it accepts connections, and return its handle. When the probe
//! gives up, the task is stopped, cleaned and its output erased (every step
//! attempted even if an earlier one failed) and the launch fails with all the
//! errors collected along the way.

use std::fmt;

use shared::{process_debug, process_info, process_warn, Endpoint};

use crate::{
    command,
    config::MemcachedConfig,
    error::{CleanupErrors, CleanupStep, LauncherError, LauncherResult},
    services::TcpReadinessProbe,
    traits::{Decorator, Executor, Launcher, ReadinessProbe, TaskHandle},
};

const NAME: &str = "Memcached";

/// Launcher for a memcached server
pub struct MemcachedLauncher<E, P = TcpReadinessProbe>
where
    E: Executor,
    P: ReadinessProbe,
{
    executor: E,
    config: MemcachedConfig,
    decorators: Vec<Box<dyn Decorator>>,
    probe: P,
}

impl<E: Executor> MemcachedLauncher<E> {
    /// Create a launcher probing readiness over TCP
    pub fn new(executor: E, config: MemcachedConfig) -> Self {
        Self {
            executor,
            config,
            decorators: Vec::new(),
            probe: TcpReadinessProbe::new(),
        }
    }
}

impl<E, P> MemcachedLauncher<E, P>
where
    E: Executor,
    P: ReadinessProbe,
{
    /// Replace the readiness probe (fluent API)
    pub fn with_probe<Q: ReadinessProbe>(self, probe: Q) -> MemcachedLauncher<E, Q> {
        MemcachedLauncher {
            executor: self.executor,
            config: self.config,
            decorators: self.decorators,
            probe,
        }
    }

    /// Wrap the command with isolation decorators, applied in the given order (fluent API)
    pub fn with_decorators(mut self, decorators: Vec<Box<dyn Decorator>>) -> Self {
        self.decorators = decorators;
        self
    }

    pub fn config(&self) -> &MemcachedConfig {
        &self.config
    }

    /// Full command line handed to the executor
    pub fn build_command(&self) -> String {
        command::decorate(&command::build_command(&self.config), &self.decorators)
    }

    async fn launch_task(&self) -> LauncherResult<Box<dyn TaskHandle>> {
        let command = self.build_command();
        process_debug!(NAME, "Launching: {}", command);

        let task = self.executor.execute(&command).await?;

        let address = Endpoint::new(task.address(), self.config.port).to_string();
        let timeout = self.config.listen_timeout;
        process_debug!(NAME, "Waiting up to {:?} for {}", timeout, address);

        if self.probe.is_ready(&address, timeout).await {
            process_info!(NAME, "✅ Listening on {}", address);
            return Ok(task);
        }

        process_warn!(NAME, "⏰ No connection to {} within {:?}, tearing down", address, timeout);
        let cleanup = teardown(task.as_ref()).await;

        Err(LauncherError::NotReady {
            workload: NAME.to_string(),
            address,
            timeout,
            cleanup,
        })
    }
}

/// Stop, clean and erase the output of a task, attempting every step
pub async fn teardown(task: &dyn TaskHandle) -> CleanupErrors {
    let mut errors = CleanupErrors::new();

    errors.record(CleanupStep::Stop, task.stop().await);
    errors.record(CleanupStep::Clean, task.clean().await);
    errors.record(CleanupStep::EraseOutput, task.erase_output().await);

    for (step, error) in errors.iter() {
        process_warn!(NAME, "Cleanup step '{}' failed: {}", step, error);
    }
    errors
}

#[async_trait::async_trait]
impl<E, P> Launcher for MemcachedLauncher<E, P>
where
    E: Executor,
    P: ReadinessProbe,
{
    async fn launch(&self) -> LauncherResult<Box<dyn TaskHandle>> {
        self.launch_task().await
    }

    fn name(&self) -> &str {
        NAME
    }
}

impl<E, P> fmt::Display for MemcachedLauncher<E, P>
where
    E: Executor,
    P: ReadinessProbe,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", NAME, self.build_command())
    }
}
