//! Remote workflow dispatch through the GitHub CLI.
//!
//! Submitting is three blocking `gh` calls, each bounded by the command
//! timeout: `gh auth status`, `gh workflow run`, and a best-effort
//! `gh repo view` used only to make the success message more useful.

use crate::error::{HermodError, Result};
use crate::process::{CommandOutcome, CommandRunner, CommandSpec, ToolLocator};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub const GH: &str = "gh";

/// Dispatches the ingestion workflow for a submission file.
pub struct WorkflowTrigger<'a> {
    runner: &'a dyn CommandRunner,
    locator: &'a dyn ToolLocator,
    workflow: String,
    repo: Option<String>,
    timeout: Duration,
}

impl<'a> WorkflowTrigger<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        locator: &'a dyn ToolLocator,
        workflow: &str,
        repo: Option<&str>,
        timeout: Duration,
    ) -> Self {
        Self {
            runner,
            locator,
            workflow: workflow.to_string(),
            repo: repo.map(str::to_string),
            timeout,
        }
    }

    pub fn workflow(&self) -> &str {
        &self.workflow
    }

    /// Fail early when `gh` is not on PATH.
    pub fn ensure_installed(&self) -> Result<()> {
        if self.locator.is_installed(GH) {
            Ok(())
        } else {
            Err(not_installed())
        }
    }

    /// `gh auth status`. Any failure is fatal; there is no retry.
    pub fn authenticate(&self) -> Result<()> {
        let spec = self.spec(["auth", "status"]);

        match self.runner.run(&spec) {
            CommandOutcome::Success(_) => {
                debug!("GitHub CLI is authenticated");
                Ok(())
            }
            CommandOutcome::TimedOut { after } => Err(timed_out(&spec, after)),
            CommandOutcome::NotFound => Err(not_installed()),
            failed @ CommandOutcome::Failed { .. } => {
                debug!(detail = %failed.failure_detail(), "gh auth status failed");
                Err(HermodError::Submission(
                    "GitHub CLI is not authenticated. Run: gh auth login".to_string(),
                ))
            }
        }
    }

    /// `gh workflow run <workflow> -f submission_file=<name>`.
    ///
    /// Only the file reference is sent, so the command line stays the same
    /// size however many days the record covers. A non-zero exit is reported
    /// with the CLI's own stderr; a timeout is reported as such. Neither is
    /// retried.
    pub fn dispatch(&self, file: &Path) -> Result<()> {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());

        let mut args = vec![
            "workflow".to_string(),
            "run".to_string(),
            self.workflow.clone(),
            "-f".to_string(),
            format!("submission_file={}", file_name),
        ];
        if let Some(repo) = &self.repo {
            args.push("--repo".to_string());
            args.push(repo.clone());
        }
        let spec = self.spec(args);

        info!(workflow = %self.workflow, file = %file_name, "dispatching workflow");
        match self.runner.run(&spec) {
            CommandOutcome::Success(_) => Ok(()),
            CommandOutcome::TimedOut { after } => Err(timed_out(&spec, after)),
            CommandOutcome::NotFound => Err(not_installed()),
            CommandOutcome::Failed { code, stderr, .. } => {
                let stderr = stderr.trim();
                Err(HermodError::Submission(if stderr.is_empty() {
                    format!("Workflow dispatch failed (exit code {:?})", code)
                } else {
                    format!("Workflow dispatch failed: {}", stderr)
                }))
            }
        }
    }

    /// Repository URL for the success message, if `gh` can tell us.
    ///
    /// Never fails: errors, timeouts, and odd output all yield `None`.
    pub fn repository_url(&self) -> Option<String> {
        let mut args = vec!["repo".to_string(), "view".to_string()];
        if let Some(repo) = &self.repo {
            args.push(repo.clone());
        }
        args.extend(["--json", "url", "--jq", ".url"].map(str::to_string));
        let spec = self.spec(args);

        let outcome = self.runner.run(&spec);
        match outcome.success_stdout() {
            Some(url) if url.starts_with("http") && !url.contains(char::is_whitespace) => {
                Some(url.trim_end_matches('/').to_string())
            }
            Some(other) => {
                debug!(output = other, "unexpected repository URL output");
                None
            }
            None => {
                debug!(detail = %outcome.failure_detail(), "repository URL lookup failed");
                None
            }
        }
    }

    fn spec<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(GH, args, self.timeout)
    }
}

fn not_installed() -> HermodError {
    HermodError::Submission(
        "GitHub CLI (gh) is not installed. Install it from https://cli.github.com/".to_string(),
    )
}

fn timed_out(spec: &CommandSpec, after: Duration) -> HermodError {
    debug!(command = %spec.short_name(), timeout_secs = after.as_secs(), "gh timed out");
    HermodError::Timeout {
        command: spec.short_name(),
        seconds: after.as_secs(),
    }
}
