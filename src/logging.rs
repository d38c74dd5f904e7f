//! Logging setup.
//!
//! [`init`] builds a subscriber from [`LogSettings`] and installs it as the
//! default for the current thread. The returned [`LoggingGuard`] owns the
//! installation; dropping it tears logging down.

use crate::config::LogSettings;
use crate::config::types::DEFAULT_LOG_LEVEL;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing::warn;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Keeps the subscriber installed while alive.
#[must_use = "logging is torn down when the guard is dropped"]
pub struct LoggingGuard {
    _default: DefaultGuard,
}

/// Install stderr logging and, when configured, a debug-level log file.
pub fn init(settings: &LogSettings) -> LoggingGuard {
    let (filter, bad_level) = match EnvFilter::try_new(&settings.level) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(DEFAULT_LOG_LEVEL), Some(e.to_string())),
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(filter);

    let (file, file_error) = match settings.file.as_deref().map(open_log_file) {
        Some(Ok(file)) => (Some(file), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };
    let file_layer = file.map(|file| {
        fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_filter(LevelFilter::DEBUG)
    });

    let subscriber = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer);
    let guard = LoggingGuard {
        _default: tracing::subscriber::set_default(subscriber),
    };

    if let Some(error) = bad_level {
        warn!(level = %settings.level, error = %error, "invalid log level, using warn");
    }
    if let Some(error) = file_error {
        warn!(error = %error, "log file disabled");
    }

    guard
}

fn open_log_file(path: &Path) -> std::result::Result<File, String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| format!("cannot create '{}': {}", parent.display(), e))?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("cannot open '{}': {}", path.display(), e))
}
