//! Command line isolation decorators
//!
//! Decorators only rewrite the command; the isolation itself is done by the
//! wrapper tools (`unshare`, `taskset`) at exec time.

#[cfg(target_os = "linux")]
pub use namespace::Namespace;

use crate::error::{LauncherError, LauncherResult};
use crate::traits::Decorator;

#[cfg(target_os = "linux")]
mod namespace {
    use nix::sched::CloneFlags;

    use crate::error::{LauncherError, LauncherResult};
    use crate::traits::Decorator;

    /// Namespaces `unshare` knows, in the order their flags are emitted
    const SUPPORTED: &[(CloneFlags, &str)] = &[
        (CloneFlags::CLONE_NEWPID, "--pid --mount-proc"),
        (CloneFlags::CLONE_NEWNS, "--mount"),
        (CloneFlags::CLONE_NEWIPC, "--ipc"),
        (CloneFlags::CLONE_NEWNET, "--net"),
        (CloneFlags::CLONE_NEWUTS, "--uts"),
        (CloneFlags::CLONE_NEWUSER, "--user"),
    ];

    /// Run the command in fresh Linux namespaces via `unshare`
    #[derive(Debug, Clone)]
    pub struct Namespace {
        prefix: String,
    }

    impl Namespace {
        pub fn new(flags: CloneFlags) -> LauncherResult<Self> {
            let options: Vec<&str> = SUPPORTED
                .iter()
                .filter(|(flag, _)| flags.contains(*flag))
                .map(|(_, option)| *option)
                .collect();

            if options.is_empty() {
                return Err(LauncherError::config(
                    "namespace",
                    format!("no supported namespace in {:?}", flags),
                ));
            }

            Ok(Self {
                prefix: format!("unshare --fork {}", options.join(" ")),
            })
        }
    }

    impl Decorator for Namespace {
        fn decorate(&self, command: &str) -> String {
            format!("{} {}", self.prefix, command)
        }
    }
}

/// Pin the command to a set of CPUs via `taskset`
#[derive(Debug, Clone)]
pub struct Taskset {
    cpus: String,
}

impl Taskset {
    pub fn new(cpus: &[usize]) -> LauncherResult<Self> {
        if cpus.is_empty() {
            return Err(LauncherError::config("cpus", "at least one CPU is required"));
        }
        let cpus = cpus
            .iter()
            .map(|cpu| cpu.to_string())
            .collect::<Vec<_>>()
            .join(",");
        Ok(Self { cpus })
    }
}

impl Decorator for Taskset {
    fn decorate(&self, command: &str) -> String {
        format!("taskset -c {} {}", self.cpus, command)
    }
}
