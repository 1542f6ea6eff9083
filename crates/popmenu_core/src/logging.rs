//! Structured logging setup with console and optional file output.
//!
//! Provides:
//! - Daily rotating log files when a log directory is configured
//! - Build-type conditional log levels
//! - Console-only fallback when file logging fails
//! - Environment variable override via POPMENU_LOG or RUST_LOG

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Logging configuration.
pub struct LogConfig {
    /// Directory for log files; console only when `None`
    pub log_dir: Option<PathBuf>,
    /// Whether running in a PTY (affects output formatting)
    pub is_pty: bool,
    /// Optional custom log filter
    pub log_filter: Option<String>,
}

impl LogConfig {
    /// Create a configuration that also writes to files under `log_dir`.
    pub fn new(log_dir: PathBuf) -> Self {
        Self {
            log_dir: Some(log_dir),
            is_pty: atty::is(atty::Stream::Stdout),
            log_filter: None,
        }
    }

    /// Create a console-only configuration.
    pub fn console() -> Self {
        Self { log_dir: None, is_pty: atty::is(atty::Stream::Stdout), log_filter: None }
    }

    /// Set custom log filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }
}

/// Guard that must be held for the lifetime of the application.
///
/// Dropping this guard flushes pending log entries.
pub struct LoggingGuard {
    _worker_guard: Option<WorkerGuard>,
}

/// Initialize logging with the given configuration.
///
/// If file logging initialization fails, falls back to console-only.
pub fn init_logging(config: LogConfig) -> LoggingGuard {
    let Some(log_dir) = config.log_dir.as_ref().filter(|_| !config.is_pty) else {
        return init_stdout_logging(config.log_filter.as_deref(), config.is_pty);
    };

    match init_file_logging(log_dir, config.log_filter.as_deref()) {
        Ok(guard) => LoggingGuard { _worker_guard: Some(guard) },
        Err(e) => {
            eprintln!("Warning: Failed to initialize file logging: {}. Using console only.", e);
            init_stdout_logging(config.log_filter.as_deref(), config.is_pty)
        }
    }
}

/// Initialize stdout-only logging.
fn init_stdout_logging(filter: Option<&str>, ansi: bool) -> LoggingGuard {
    let env_filter = build_env_filter(filter);

    // try_init: a host may already have installed a subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(ansi)
        .with_target(false)
        .with_thread_ids(false)
        .try_init();

    LoggingGuard { _worker_guard: None }
}

/// Initialize file + console logging.
fn init_file_logging(
    log_dir: &PathBuf,
    filter: Option<&str>,
) -> Result<WorkerGuard, Box<dyn std::error::Error + Send + Sync>> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("popmenu")
        .filename_suffix("log")
        .build(log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let stdout = std::io::stdout.with_max_level(tracing::Level::INFO);
    let combined = stdout.and(non_blocking);

    tracing_subscriber::fmt()
        .with_writer(combined)
        .with_env_filter(build_env_filter(filter))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .try_init()?;

    Ok(guard)
}

/// Build the environment filter from config or defaults.
fn build_env_filter(custom_filter: Option<&str>) -> EnvFilter {
    // Priority: custom filter > POPMENU_LOG > RUST_LOG > default
    if let Some(filter) = custom_filter {
        return EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(default_log_filter()));
    }

    EnvFilter::try_from_env("POPMENU_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter()))
}

/// Get the default log filter based on build type.
pub fn default_log_filter() -> &'static str {
    #[cfg(debug_assertions)]
    {
        "info,popmenu=debug,popmenu_core=debug,popmenu_ui=debug"
    }
    #[cfg(not(debug_assertions))]
    {
        "warn,popmenu=info,popmenu_core=info,popmenu_ui=info"
    }
}

/// Get the default log directory.
pub fn log_dir() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        PathBuf::from("./popmenu_data/logs")
    }

    #[cfg(not(debug_assertions))]
    {
        dirs::data_local_dir()
            .map(|d| d.join("popmenu").join("logs"))
            .unwrap_or_else(|| PathBuf::from("./popmenu_data/logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_logging_creates_log_dir() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("nested").join("logs");

        // A subscriber may already be installed by another test; the
        // directory is created either way.
        let result = init_file_logging(&dir, Some("debug"));
        assert!(dir.is_dir());
        if let Err(e) = result {
            assert!(!e.to_string().is_empty());
        }
    }

    #[test]
    fn test_explicit_filter_wins() {
        let filter = build_env_filter(Some("popmenu_core=trace"));
        assert_eq!(filter.to_string(), "popmenu_core=trace");
    }
}
