//! Main entry point for the launcher binary
//!
//! Launches a memcached server on the local host with the real service
//! implementations, keeps it running until Ctrl+C and then tears it down.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;

use launcher::{
    launcher::teardown,
    services::{LocalExecutor, Taskset},
    Decorator, Launcher, LauncherError, LauncherResult, MemcachedConfig, MemcachedLauncher,
    TaskHandle,
};
use shared::{logging, process_debug, process_error, process_info};

/// Launch memcached and keep it running until interrupted
#[derive(Parser)]
#[command(name = "launcher")]
#[command(about = "Launches a memcached server and waits until it accepts connections")]
pub struct Args {
    /// JSON configuration file (defaults to MEMCACHED_* environment variables)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the memcached binary
    #[arg(long)]
    pub path: Option<String>,

    /// Listen port
    #[arg(long)]
    pub port: Option<u16>,

    /// User to run memcached as
    #[arg(long)]
    pub user: Option<String>,

    /// Number of worker threads
    #[arg(long)]
    pub threads: Option<u32>,

    /// Pin worker threads to CPUs
    #[arg(long)]
    pub threads_affinity: bool,

    /// Memory limit in megabytes
    #[arg(long)]
    pub max_memory: Option<u32>,

    /// Maximum simultaneous connections
    #[arg(long)]
    pub connections: Option<u32>,

    /// How long to wait for memcached to accept connections, in milliseconds
    #[arg(long)]
    pub listen_timeout_ms: Option<u64>,

    /// Run memcached in a new PID namespace
    #[arg(long)]
    pub isolate_pid: bool,

    /// Comma separated CPUs to pin memcached to
    #[arg(long, value_delimiter = ',')]
    pub cpus: Vec<usize>,

    /// Directory task output is written under (defaults to the temp directory)
    #[arg(long)]
    pub output_root: Option<PathBuf>,

    /// Keep captured output after shutdown
    #[arg(long)]
    pub keep_output: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Resolve configuration: file or environment first, then flag overrides
    fn resolve_config(&self) -> LauncherResult<MemcachedConfig> {
        let base = match &self.config {
            Some(path) => MemcachedConfig::from_file(path)?,
            None => MemcachedConfig::from_env()?,
        };

        let mut builder = MemcachedConfig::builder()
            .path_to_binary(self.path.clone().unwrap_or(base.path_to_binary))
            .port(self.port.unwrap_or(base.port))
            .user(self.user.clone().unwrap_or(base.user))
            .num_threads(self.threads.unwrap_or(base.num_threads))
            .max_memory_mb(self.max_memory.unwrap_or(base.max_memory_mb))
            .num_connections(self.connections.unwrap_or(base.num_connections))
            .threads_affinity(self.threads_affinity || base.threads_affinity)
            .listen_timeout(base.listen_timeout);

        if let Some(millis) = self.listen_timeout_ms {
            builder = builder.listen_timeout(Duration::from_millis(millis));
        }
        builder.build()
    }

    /// Isolation decorators in application order: PID namespace, then CPU pinning
    fn decorators(&self) -> LauncherResult<Vec<Box<dyn Decorator>>> {
        let mut decorators: Vec<Box<dyn Decorator>> = Vec::new();

        if self.isolate_pid {
            #[cfg(target_os = "linux")]
            decorators.push(Box::new(launcher::services::Namespace::new(
                nix::sched::CloneFlags::CLONE_NEWPID,
            )?));

            #[cfg(not(target_os = "linux"))]
            return Err(LauncherError::config(
                "isolate_pid",
                "PID namespaces are only available on Linux",
            ));
        }
        if !self.cpus.is_empty() {
            decorators.push(Box::new(Taskset::new(&self.cpus)?));
        }
        Ok(decorators)
    }
}

#[tokio::main]
async fn main() -> LauncherResult<()> {
    let args = Args::parse();

    logging::init_tracing_with_level("launcher", Some(&args.log_level));

    let config = args.resolve_config()?;
    let decorators = args.decorators()?;

    let mut executor = LocalExecutor::new();
    if let Some(root) = &args.output_root {
        executor = executor.with_output_root(root);
    }

    let memcached = MemcachedLauncher::new(executor, config).with_decorators(decorators);
    let name = memcached.name().to_string();
    logging::log_startup(&name, &memcached.build_command());

    let task = match memcached.launch().await {
        Ok(task) => task,
        Err(e) => {
            logging::log_error(&name, "Launch", &e);
            return Err(e);
        }
    };
    process_info!(
        name,
        "🚀 Ready at {}:{} (press Ctrl+C to stop)",
        task.address(),
        memcached.config().port
    );

    if let Err(err) = signal::ctrl_c().await {
        process_error!(name, "Failed to listen for Ctrl+C: {}", err);
    }
    logging::log_shutdown(&name, "Received Ctrl+C signal");

    shutdown(&name, task.as_ref(), args.keep_output).await?;

    logging::log_success(&name, "Stopped gracefully");
    Ok(())
}

/// Stop and clean the task, erasing its output unless asked to keep it
async fn shutdown(name: &str, task: &dyn TaskHandle, keep_output: bool) -> LauncherResult<()> {
    if keep_output {
        task.stop().await?;
        task.clean().await?;
        process_debug!(name, "Keeping task output");
        return Ok(());
    }

    let cleanup = teardown(task).await;
    if cleanup.is_empty() {
        return Ok(());
    }
    Err(LauncherError::Shutdown {
        workload: name.to_string(),
        cleanup,
    })
}
