//! Diagnostic logging for the dashboard.
//!
//! The terminal belongs to the TUI, so log output only goes to a file:
//! - Writes to `<log_dir>/harmony_top.log` (cleared on start)
//! - Filter configurable via RUST_LOG, `info` by default

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "harmony_top.log";

/// Keeps the background log writer alive. Dropping it flushes the file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Create `log_dir` and empty the log file from a previous session.
fn prepare_log_file(log_dir: &Path) -> Result<PathBuf, io::Error> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(LOG_FILE);
    fs::write(&path, "")?;
    Ok(path)
}

/// Initialize logging into `log_dir`, creating it if needed.
pub fn init_logging(log_dir: &Path) -> Result<LoggingGuard, io::Error> {
    prepare_log_file(log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
