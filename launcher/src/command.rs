//! Command line construction
//!
//! Both functions are pure: identical inputs always yield byte-identical
//! command lines.

use crate::config::MemcachedConfig;
use crate::traits::Decorator;

/// Base memcached invocation
///
/// Flags are emitted in a fixed order: port, user, threads, memory,
/// connections, then `-T` when thread affinity is enabled.
pub fn build_command(config: &MemcachedConfig) -> String {
    let mut command = format!(
        "{} -p {} -u {} -t {} -m {} -c {}",
        config.path_to_binary,
        config.port,
        config.user,
        config.num_threads,
        config.max_memory_mb,
        config.num_connections,
    );
    if config.threads_affinity {
        command.push_str(" -T");
    }
    command
}

/// Apply decorators left to right, each wrapping the previous result
pub fn decorate<D>(command: &str, decorators: &[D]) -> String
where
    D: AsRef<dyn Decorator>,
{
    decorators
        .iter()
        .fold(command.to_string(), |acc, decorator| decorator.as_ref().decorate(&acc))
}
