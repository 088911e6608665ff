//! Local process execution
//!
//! Runs commands as children of the launcher through `sh -c`, capturing
//! stdout and stderr into a per-task output directory.

use async_trait::async_trait;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout};

use shared::{process_debug, process_warn};

use crate::error::ExecutorError;
use crate::traits::{Executor, TaskHandle};

pub const LOCAL_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(2);
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// File name of the first word of a command, used to label logs and output
fn program_name(command: &str) -> String {
    command
        .split_whitespace()
        .next()
        .and_then(|word| Path::new(word).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "task".to_string())
}

/// Executor spawning commands on the local host
#[derive(Debug, Clone)]
pub struct LocalExecutor {
    output_root: PathBuf,
    stop_grace: Duration,
}

impl LocalExecutor {
    /// Create executor writing task output under the system temp directory
    pub fn new() -> Self {
        Self {
            output_root: std::env::temp_dir(),
            stop_grace: DEFAULT_STOP_GRACE,
        }
    }

    /// Configure directory task output directories are created in (fluent API)
    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = output_root.into();
        self
    }

    /// Configure how long `stop` waits after SIGTERM before killing (fluent API)
    pub fn with_stop_grace(mut self, stop_grace: Duration) -> Self {
        self.stop_grace = stop_grace;
        self
    }

    fn output_dir_for(&self, program: &str) -> PathBuf {
        self.output_root
            .join(format!("{}_{}", program, uuid::Uuid::new_v4().simple()))
    }

    /// Spawn a command, returning the concrete local handle
    pub async fn spawn(&self, command: &str) -> Result<LocalTaskHandle, ExecutorError> {
        let program = program_name(command);
        let output_dir = self.output_dir_for(&program);

        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|source| ExecutorError::OutputDir {
                path: output_dir.clone(),
                source,
            })?;

        let output = TaskOutput::create(&output_dir)?;

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(format!("exec {command}"))
            .stdin(Stdio::null())
            .stdout(output.stdout.try_clone()?)
            .stderr(output.stderr.try_clone()?);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                drop(output);
                if let Err(e) = tokio::fs::remove_dir_all(&output_dir).await {
                    process_warn!(program, "Failed to remove {}: {}", output_dir.display(), e);
                }
                return Err(ExecutorError::Spawn {
                    command: command.to_string(),
                    source,
                });
            }
        };

        let pid = child.id().unwrap_or(0);
        process_debug!(
            program,
            "Spawned '{}' (PID: {}) with output in {}",
            command,
            pid,
            output_dir.display()
        );

        Ok(LocalTaskHandle {
            program,
            pid,
            child: Mutex::new(child),
            output: Mutex::new(Some(output)),
            output_dir,
            stop_grace: self.stop_grace,
        })
    }
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Executor for LocalExecutor {
    async fn execute(&self, command: &str) -> Result<Box<dyn TaskHandle>, ExecutorError> {
        Ok(Box::new(self.spawn(command).await?))
    }
}

/// Open output files of a task
struct TaskOutput {
    stdout: File,
    stderr: File,
}

impl TaskOutput {
    fn create(output_dir: &Path) -> Result<Self, ExecutorError> {
        Ok(Self {
            stdout: File::create(output_dir.join("stdout"))?,
            stderr: File::create(output_dir.join("stderr"))?,
        })
    }
}

/// Handle for a process spawned by [`LocalExecutor`]
pub struct LocalTaskHandle {
    program: String,
    pid: u32,
    child: Mutex<Child>,
    output: Mutex<Option<TaskOutput>>,
    output_dir: PathBuf,
    stop_grace: Duration,
}

impl LocalTaskHandle {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn stdout_path(&self) -> PathBuf {
        self.output_dir.join("stdout")
    }

    pub fn stderr_path(&self) -> PathBuf {
        self.output_dir.join("stderr")
    }

    /// Check whether the process is still running, reaping it if it exited
    pub async fn is_running(&self) -> Result<bool, ExecutorError> {
        let mut child = self.child.lock().await;
        Ok(child.try_wait()?.is_none())
    }

    #[cfg(unix)]
    async fn terminate_gracefully(&self, child: &mut Child) -> Result<bool, ExecutorError> {
        use nix::errno::Errno;
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        match signal::kill(Pid::from_raw(self.pid as i32), Signal::SIGTERM) {
            Ok(()) => {}
            Err(Errno::ESRCH) => return Ok(true),
            Err(e) => {
                return Err(ExecutorError::Signal {
                    message: format!("SIGTERM to {}: {}", self.pid, e),
                })
            }
        }

        let wait_for_exit = async {
            loop {
                if child.try_wait()?.is_some() {
                    return Ok::<(), std::io::Error>(());
                }
                sleep(EXIT_POLL_INTERVAL).await;
            }
        };
        let outcome = timeout(self.stop_grace, wait_for_exit).await;

        match outcome {
            Ok(exited) => {
                exited?;
                Ok(true)
            }
            Err(_) => Ok(child.try_wait()?.is_some()),
        }
    }

    #[cfg(not(unix))]
    async fn terminate_gracefully(&self, _child: &mut Child) -> Result<bool, ExecutorError> {
        Ok(false)
    }
}

#[async_trait]
impl TaskHandle for LocalTaskHandle {
    fn address(&self) -> String {
        LOCAL_ADDRESS.to_string()
    }

    async fn stop(&self) -> Result<(), ExecutorError> {
        let mut child = self.child.lock().await;

        if child.try_wait()?.is_some() {
            return Ok(());
        }

        if self.terminate_gracefully(&mut child).await? {
            process_debug!(self.program, "🛑 Stopped PID {}", self.pid);
            return Ok(());
        }

        process_warn!(
            self.program,
            "🔨 PID {} didn't exit within {:?}, killing",
            self.pid,
            self.stop_grace
        );
        child.kill().await?;
        Ok(())
    }

    async fn clean(&self) -> Result<(), ExecutorError> {
        if self.is_running().await? {
            return Err(ExecutorError::TaskRunning { pid: self.pid });
        }
        self.output.lock().await.take();
        Ok(())
    }

    async fn erase_output(&self) -> Result<(), ExecutorError> {
        match tokio::fs::remove_dir_all(&self.output_dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
