//! Logging initialization and configuration.
//!
//! Logs are written to files in the `logs/` directory so that stdout carries
//! nothing but suggestions. Each run gets its own file.
//!
//! # Configuration
//!
//! The log level can be controlled via the `RUST_LOG` environment variable:
//! - `RUST_LOG=trace` - Show context lookups and candidate counts
//! - `RUST_LOG=debug` - Show why a request produced nothing
//! - `RUST_LOG=info` - Show startup and model loading (default)
//! - `RUST_LOG=warn` - Show warnings and errors only

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system.
///
/// Logs go to `logs/cmd-predictor.<timestamp>.log` next to the executable,
/// e.g. `logs/cmd-predictor.2024-12-06-14-30-25.log`. The level defaults to
/// `info` when `RUST_LOG` is not set.
///
/// The returned guard flushes the writer when dropped; keep it alive for the
/// lifetime of the program. `None` means logging could not be set up.
pub fn init_logging() -> Option<WorkerGuard> {
    // Logs live next to the executable, or under the working directory
    let log_dir = match std::env::current_exe() {
        Ok(exe_path) => exe_path
            .parent()
            .map(|p| p.join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs")),
        Err(_) => PathBuf::from("logs"),
    };

    // Ensure the logs directory exists
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create logs directory: {}", e);
        return None;
    }

    // One file per run, stamped with the start time
    let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
    let log_path = log_dir.join(format!("cmd-predictor.{}.log", timestamp));

    let log_file = match fs::File::create(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: Failed to create log file: {}", e);
            return None;
        }
    };

    // Non-blocking writer keeps file IO off the request path
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    // Default to "info" level if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Build and initialize the subscriber
    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    tracing::info!("Logging initialized - writing to {}", log_path.display());
    Some(guard)
}
