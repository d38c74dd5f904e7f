//! Process settings sourced from `HERMOD_*` environment variables.

use super::types::*;
use std::path::PathBuf;

/// Logging configuration, consumed by [`crate::logging::init`].
///
/// Read on its own, before [`Settings`], so problems with the remaining
/// settings are logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Filter directive for stderr output, e.g. `warn` or `hermod=debug`.
    pub level: String,
    /// Optional file receiving debug-level output.
    pub file: Option<PathBuf>,
}

impl LogSettings {
    /// Read `HERMOD_LOG_LEVEL` and `HERMOD_LOG_FILE` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            level: get("HERMOD_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            file: get("HERMOD_LOG_FILE").map(PathBuf::from),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// Settings resolved once per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Timeout from the environment (or default); `--timeout` is applied later.
    pub timeout: CommandTimeout,
    /// Directory submissions are written to and read from.
    pub output_dir: PathBuf,
    /// Developer mapping file.
    pub mapping_path: PathBuf,
    /// Remote workflow file dispatched by `submit`.
    pub workflow: String,
    /// Optional `owner/name` passed to `gh --repo`.
    pub repo: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout: CommandTimeout::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            mapping_path: PathBuf::from(DEFAULT_MAPPING_PATH),
            workflow: DEFAULT_WORKFLOW.to_string(),
            repo: None,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup function.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            timeout: CommandTimeout::from_env_value(get(TIMEOUT_ENV_VAR).as_deref()),
            output_dir: get("HERMOD_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            mapping_path: get("HERMOD_CONFIG")
                .map(PathBuf::from)
                .unwrap_or(defaults.mapping_path),
            workflow: get("HERMOD_WORKFLOW").unwrap_or(defaults.workflow),
            repo: get("HERMOD_REPO"),
        }
    }
}
