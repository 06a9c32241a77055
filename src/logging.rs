//! Logging infrastructure for embedding binaries.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is the embedder's call. For binaries that want the standard setup,
//! [`init_logging`] wires a per-session log file (truncated on open, so one
//! file spans exactly one engine session) together with stdout output.
//! Verbosity comes from the `RUST_LOG` environment variable and defaults to
//! `info`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default log directory relative to the working directory.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "yomikata.log";

/// Failure to set up logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log directory or file could not be prepared
    #[error("failed to prepare log file: {0}")]
    Io(#[from] io::Error),

    /// Some other subscriber already claimed the global default
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Installs the global tracing subscriber.
///
/// Events go both to `log_dir/log_file` (created as needed, truncated per
/// session, no ANSI escapes) and to stdout. Fails if another subscriber was
/// installed first, so embedders that bring their own setup keep it.
pub fn init_logging(log_dir: &str, log_file: &str) -> Result<LoggingGuard, LoggingError> {
    let (file_writer, file_guard) = session_log_writer(Path::new(log_dir), log_file)?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stdout))
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Opens the session log file and wraps it in a non-blocking writer.
///
/// Truncation happens at open time: the returned writer starts on an empty
/// file even when a previous session logged to the same path.
fn session_log_writer(
    log_dir: &Path,
    log_file: &str,
) -> io::Result<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(log_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_dir.join(log_file))?;
    Ok(tracing_appender::non_blocking(file))
}

fn env_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
}
