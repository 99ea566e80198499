//! Logging Infrastructure
//!
//! Structured logging setup for binaries, demos and tests.

use tracing_subscriber::EnvFilter;

/// Initialize the logger with the default level.
pub fn init_logger() {
    init_logger_with_level(None);
}

/// Initialize the logger with an optional level override.
///
/// `RUST_LOG` takes precedence when set. Safe to call more than once; only
/// the first call installs the subscriber.
pub fn init_logger_with_level(log_level: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false)
        .try_init();
}
