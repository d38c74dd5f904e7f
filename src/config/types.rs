//! Configuration types, constants, and defaults for hermod.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Timeout applied to each external command when nothing else is configured.
pub const DEFAULT_COMMAND_TIMEOUT_SECONDS: u64 = 60;

/// Smallest accepted per-command timeout.
pub const MIN_COMMAND_TIMEOUT_SECONDS: u64 = 5;

/// Largest accepted per-command timeout.
pub const MAX_COMMAND_TIMEOUT_SECONDS: u64 = 900;

/// Environment variable overriding the per-command timeout.
pub const TIMEOUT_ENV_VAR: &str = "HERMOD_COMMAND_TIMEOUT_SECONDS";

pub const DEFAULT_OUTPUT_DIR: &str = "data/ai_usage/submissions";
pub const DEFAULT_MAPPING_PATH: &str = "config/developer_names.json";
pub const DEFAULT_WORKFLOW: &str = "ai-usage-ingest.yml";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Where the effective command timeout came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutSource {
    /// `--timeout` on the command line.
    Flag,
    /// `HERMOD_COMMAND_TIMEOUT_SECONDS`.
    Environment,
    Default,
}

impl fmt::Display for TimeoutSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeoutSource::Flag => "--timeout",
            TimeoutSource::Environment => TIMEOUT_ENV_VAR,
            TimeoutSource::Default => "default",
        };
        f.write_str(label)
    }
}

/// The per-command timeout every blocking subprocess call uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTimeout {
    pub seconds: u64,
    pub source: TimeoutSource,
}

impl Default for CommandTimeout {
    fn default() -> Self {
        Self {
            seconds: DEFAULT_COMMAND_TIMEOUT_SECONDS,
            source: TimeoutSource::Default,
        }
    }
}

impl CommandTimeout {
    /// Check a value against the accepted bounds.
    pub fn validate(seconds: u64) -> Option<u64> {
        (MIN_COMMAND_TIMEOUT_SECONDS..=MAX_COMMAND_TIMEOUT_SECONDS)
            .contains(&seconds)
            .then_some(seconds)
    }

    /// Resolve the timeout from the raw environment value.
    ///
    /// A missing value yields the default. A value that does not parse or is
    /// out of bounds is logged and also yields the default.
    pub fn from_env_value(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            return Self::default();
        };

        match raw.parse::<u64>().ok().and_then(Self::validate) {
            Some(seconds) => Self {
                seconds,
                source: TimeoutSource::Environment,
            },
            None => {
                tracing::warn!(
                    value = raw,
                    min = MIN_COMMAND_TIMEOUT_SECONDS,
                    max = MAX_COMMAND_TIMEOUT_SECONDS,
                    default = DEFAULT_COMMAND_TIMEOUT_SECONDS,
                    "invalid {}, falling back to default",
                    TIMEOUT_ENV_VAR
                );
                Self::default()
            }
        }
    }

    /// Apply a `--timeout` flag. The flag is range-checked by clap, but an
    /// out-of-bounds value is still ignored here rather than trusted.
    pub fn with_override(self, flag: Option<u64>) -> Self {
        match flag.and_then(Self::validate) {
            Some(seconds) => Self {
                seconds,
                source: TimeoutSource::Flag,
            },
            None => self,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.seconds)
    }
}
