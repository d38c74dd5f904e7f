//! Git identity queries for hermod.
//!
//! Reads `user.email` and `user.name` through `git config`. Lookups are
//! soft: a missing git binary, an unset key, a non-zero exit, or a timeout
//! all yield `None`, and the caller decides whether no answer is fatal.

use crate::process::{CommandOutcome, CommandRunner, CommandSpec};
use std::time::Duration;
use tracing::{debug, warn};

/// Read a single `git config` value.
///
/// # Returns
///
/// * `Some(value)` - The trimmed, non-empty value
/// * `None` - If the key is unset or git could not answer in time
pub fn config_value(runner: &dyn CommandRunner, key: &str, timeout: Duration) -> Option<String> {
    let spec = CommandSpec::new("git", ["config", key], timeout);

    match runner.run(&spec) {
        CommandOutcome::Success(output) => {
            let value = output.stdout.trim();
            if value.is_empty() {
                debug!(key, "git config value is empty");
                None
            } else {
                Some(value.to_string())
            }
        }
        CommandOutcome::Failed { code, .. } => {
            debug!(key, ?code, "git config value not set");
            None
        }
        CommandOutcome::TimedOut { after } => {
            warn!(key, timeout_secs = after.as_secs(), "git config lookup timed out");
            None
        }
        CommandOutcome::NotFound => {
            warn!("git not found in PATH");
            None
        }
    }
}

/// `git config user.email`.
pub fn user_email(runner: &dyn CommandRunner, timeout: Duration) -> Option<String> {
    config_value(runner, "user.email", timeout)
}

/// `git config user.name`.
pub fn user_name(runner: &dyn CommandRunner, timeout: Duration) -> Option<String> {
    config_value(runner, "user.name", timeout)
}
