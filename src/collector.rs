//! Usage collection from `ccusage` and `ccusage-codex`.
//!
//! Both tools are run with `daily --json --since YYYYMMDD` and must print a
//! JSON object. Their output is kept verbatim in the [`UsageRecord`].

use crate::error::{HermodError, Result};
use crate::process::{CommandOutcome, CommandRunner, CommandSpec};
use crate::record::{DateRange, UsageRecord};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

pub const CLAUDE_CODE_TOOL: &str = "ccusage";
pub const CODEX_TOOL: &str = "ccusage-codex";

/// The only programs the collector will start.
const ALLOWED_COMMANDS: [&str; 2] = [CLAUDE_CODE_TOOL, CODEX_TOOL];

/// Characters never accepted in a tool argument.
const DANGEROUS_CHARS: [char; 11] = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];

/// Runs the usage tools and assembles a [`UsageRecord`].
pub struct UsageCollector<'a> {
    runner: &'a dyn CommandRunner,
    timeout: Duration,
}

impl<'a> UsageCollector<'a> {
    pub fn new(runner: &'a dyn CommandRunner, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    /// Collect usage for `developer` over `range`.
    ///
    /// # Returns
    ///
    /// * `Ok(UsageRecord)` - Both tools answered with a JSON object
    /// * `Err(HermodError::Collection)` - A tool failed, is missing, or printed unusable output
    /// * `Err(HermodError::Timeout)` - A tool ran past the command timeout
    pub fn collect(
        &self,
        developer: &str,
        range: &DateRange,
        now: DateTime<Utc>,
    ) -> Result<UsageRecord> {
        let since = range.since_arg();
        info!(developer, since = %since, "collecting usage data");

        let claude_code = self.run_tool(CLAUDE_CODE_TOOL, &["daily", "--json", "--since", &since])?;
        let codex = self.run_tool(CODEX_TOOL, &["daily", "--json", "--since", &since])?;

        Ok(UsageRecord::new(
            developer,
            range.clone(),
            now,
            claude_code,
            codex,
        ))
    }

    /// Run one usage tool and parse its stdout as a JSON object.
    pub fn run_tool(&self, program: &str, args: &[&str]) -> Result<Value> {
        validate_command(program, args)?;

        let spec = CommandSpec::new(program, args.iter().copied(), self.timeout);
        let stdout = match self.runner.run(&spec) {
            CommandOutcome::Success(output) => output.stdout,
            CommandOutcome::TimedOut { after } => {
                debug!(tool = program, timeout_secs = after.as_secs(), "usage tool timed out");
                return Err(HermodError::Timeout {
                    command: spec.display(),
                    seconds: after.as_secs(),
                });
            }
            CommandOutcome::NotFound => {
                return Err(HermodError::Collection(format!(
                    "{} not found in PATH",
                    program
                )));
            }
            failed @ CommandOutcome::Failed { .. } => {
                return Err(HermodError::Collection(format!(
                    "{} {}",
                    program,
                    failed.failure_detail()
                )));
            }
        };

        let value: Value = serde_json::from_str(&stdout).map_err(|e| {
            HermodError::Collection(format!("invalid JSON from {}: {}", program, e))
        })?;

        if !value.is_object() {
            return Err(HermodError::Collection(format!(
                "expected a JSON object from {}, got {}",
                program,
                json_type_name(&value)
            )));
        }

        debug!(tool = program, bytes = stdout.len(), "usage tool returned data");
        Ok(value)
    }
}

/// Reject anything other than the known tools and any argument carrying
/// shell metacharacters.
fn validate_command(program: &str, args: &[&str]) -> Result<()> {
    if !ALLOWED_COMMANDS.contains(&program) {
        return Err(HermodError::Collection(format!(
            "command not allowed: {}",
            if program.is_empty() { "empty" } else { program }
        )));
    }

    if let Some(bad) = args.iter().find(|arg| arg.contains(DANGEROUS_CHARS)) {
        return Err(HermodError::Collection(format!(
            "invalid argument contains dangerous characters: {}",
            bad
        )));
    }

    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeRunner, failed, ok};
    use chrono::{NaiveDate, TimeZone};
    use serde_json::json;

    const TIMEOUT: Duration = Duration::from_secs(60);

    fn range() -> DateRange {
        DateRange::ending_on(NaiveDate::from_ymd_opt(2025, 1, 22).unwrap(), 7)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 22, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_collect_success() {
        let runner = FakeRunner::new()
            .respond(
                "ccusage daily",
                ok(r#"{"daily": [{"date": "2025-01-22", "cost": 1.5}], "totals": {"totalCost": 1.5}}"#),
            )
            .respond(
                "ccusage-codex daily",
                ok(r#"{"daily": [{"date": "2025-01-22", "cost": 2.0}], "totals": {"totalCost": 2.0}}"#),
            );
        let collector = UsageCollector::new(&runner, TIMEOUT);

        let record = collector.collect("Chad", &range(), now()).unwrap();

        assert_eq!(record.developer(), "Chad");
        assert_eq!(record.metadata.date_range.days, Some(7));
        assert_eq!(record.claude_code_cost(), Some(1.5));
        assert_eq!(record.codex_cost(), Some(2.0));
    }

    #[test]
    fn test_collect_passes_since_and_timeout() {
        let runner = FakeRunner::new()
            .respond("ccusage daily", ok("{}"))
            .respond("ccusage-codex daily", ok("{}"));
        let collector = UsageCollector::new(&runner, Duration::from_secs(300));

        collector.collect("Chad", &range(), now()).unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].program, "ccusage");
        assert_eq!(calls[0].args, vec!["daily", "--json", "--since", "20250115"]);
        assert_eq!(calls[1].program, "ccusage-codex");
        assert!(calls.iter().all(|c| c.timeout == Duration::from_secs(300)));
    }

    #[test]
    fn test_tool_failure_is_collection_error() {
        let runner = FakeRunner::new()
            .respond("ccusage daily", ok("{}"))
            .respond("ccusage-codex daily", failed(1, "Command failed"));
        let collector = UsageCollector::new(&runner, TIMEOUT);

        let err = collector.collect("Chad", &range(), now()).unwrap_err();
        assert!(matches!(err, HermodError::Collection(_)));
        assert!(err.to_string().contains("ccusage-codex exited with code 1: Command failed"));
    }

    #[test]
    fn test_tool_timeout_is_timeout_error() {
        let runner = FakeRunner::new().respond(
            "ccusage daily",
            CommandOutcome::TimedOut { after: TIMEOUT },
        );
        let collector = UsageCollector::new(&runner, TIMEOUT);

        let err = collector.collect("Chad", &range(), now()).unwrap_err();
        assert!(matches!(err, HermodError::Timeout { seconds: 60, .. }));
        assert!(err.to_string().contains("timed out"));
        // The second tool is never started.
        assert!(runner.calls_to("ccusage-codex daily").is_empty());
    }

    #[test]
    fn test_invalid_json_is_collection_error() {
        let runner = FakeRunner::new().respond("ccusage daily", ok("not valid json"));
        let collector = UsageCollector::new(&runner, TIMEOUT);

        let err = collector.collect("Chad", &range(), now()).unwrap_err();
        assert!(err.to_string().contains("invalid JSON from ccusage"));
    }

    #[test]
    fn test_non_object_json_is_collection_error() {
        let runner = FakeRunner::new().respond("ccusage daily", ok(r#"["list", "not", "dict"]"#));
        let collector = UsageCollector::new(&runner, TIMEOUT);

        let err = collector.run_tool("ccusage", &["daily"]).unwrap_err();
        assert!(err.to_string().contains("expected a JSON object from ccusage, got array"));
    }

    #[test]
    fn test_missing_tool_is_collection_error() {
        let runner = FakeRunner::new();
        let collector = UsageCollector::new(&runner, TIMEOUT);

        let err = collector.run_tool("ccusage", &["daily"]).unwrap_err();
        assert!(matches!(err, HermodError::Collection(_)));
        assert!(err.to_string().contains("not found in PATH"));
    }

    #[test]
    fn test_rejects_commands_outside_allowlist() {
        let runner = FakeRunner::new();
        let collector = UsageCollector::new(&runner, TIMEOUT);

        let err = collector.run_tool("malicious-command", &["--arg"]).unwrap_err();
        assert!(err.to_string().contains("command not allowed: malicious-command"));

        let err = collector.run_tool("", &[]).unwrap_err();
        assert!(err.to_string().contains("command not allowed: empty"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_rejects_dangerous_arguments() {
        let runner = FakeRunner::new();
        let collector = UsageCollector::new(&runner, TIMEOUT);

        for arg in [
            "; rm -rf /",
            "| cat /etc/passwd",
            "& background-task",
            "$(malicious)",
            "`whoami`",
        ] {
            let err = collector.run_tool("ccusage", &["daily", arg]).unwrap_err();
            assert!(
                err.to_string().contains("dangerous characters"),
                "{}",
                arg
            );
        }
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_payload_is_kept_verbatim() {
        let payload = json!({"daily": [{"date": "2025-01-22", "models": ["x"]}], "extra": {"k": 1}});
        let runner = FakeRunner::new()
            .respond("ccusage daily", ok(&payload.to_string()))
            .respond("ccusage-codex daily", ok("{}"));
        let collector = UsageCollector::new(&runner, TIMEOUT);

        let record = collector.collect("Chad", &range(), now()).unwrap();
        assert_eq!(record.claude_code, payload);
        assert_eq!(record.codex, json!({}));
    }
}
