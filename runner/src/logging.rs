//! Development-time tracing for the task runner.
//!
//! Diagnostics only: output goes to stderr and is never part of the command
//! output or the persisted task result.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`; falls back to `default_filter` (the configured
/// `log_filter`) when unset or unparsable. Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=task_runner=debug task-runner walk tapping
/// ```
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
