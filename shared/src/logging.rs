//! Shared logging utilities for consistent tracing across launched workloads
//!
//! Every event emitted through the `process_*` macros carries a `process`
//! field naming the workload (for example `Memcached`) and a timestamp, so
//! output from several launchers running side by side stays attributable.

use chrono::{DateTime, Utc};
use std::fmt::Display;
use tracing::{error, info};

/// Build the filter directive for a component binary
///
/// The component crate and `shared` log at `level`; everything else is
/// kept at `warn`.
pub fn filter_directive(component: &str, log_level: Option<&str>) -> String {
    let base_level = log_level.unwrap_or("info");
    format!("warn,{component}={base_level},shared={base_level}")
}

/// Initialize tracing subscriber for a component with an optional log level
pub fn init_tracing_with_level(component: &str, log_level: Option<&str>) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = filter_directive(component, log_level);

    fmt()
        .with_env_filter(EnvFilter::new(&env_filter))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for process-aware info logging
#[macro_export]
macro_rules! process_info {
    ($process:expr, $($arg:tt)*) => {
        tracing::info!(
            process = %$process,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for process-aware warning logging
#[macro_export]
macro_rules! process_warn {
    ($process:expr, $($arg:tt)*) => {
        tracing::warn!(
            process = %$process,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for process-aware error logging
#[macro_export]
macro_rules! process_error {
    ($process:expr, $($arg:tt)*) => {
        tracing::error!(
            process = %$process,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for process-aware debug logging
#[macro_export]
macro_rules! process_debug {
    ($process:expr, $($arg:tt)*) => {
        tracing::debug!(
            process = %$process,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(process: &str, details: &str) {
    info!(
        process = %process,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(process: &str, reason: &str) {
    info!(
        process = %process,
        timestamp = format_timestamp(),
        "🛑 Shutting down: {}",
        reason
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(process: &str, context: &str, error: &dyn Display) {
    error!(
        process = %process,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

/// Contextual logging helper for success conditions
pub fn log_success(process: &str, message: &str) {
    info!(
        process = %process,
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}
