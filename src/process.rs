//! External process execution for hermod.
//!
//! Every subprocess hermod starts (git, the usage tools, the GitHub CLI) goes
//! through a [`CommandRunner`]. The runner never returns an error: each call
//! ends in exactly one [`CommandOutcome`], and the caller decides which
//! outcomes are fatal.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A fully specified external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable name, resolved through PATH.
    pub program: String,
    /// Arguments, passed verbatim (no shell involved).
    pub args: Vec<String>,
    /// Wall-clock limit after which the child is killed.
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new<I, S>(program: &str, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            timeout,
        }
    }

    /// Render the command line for logs and error messages.
    pub fn display(&self) -> String {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.as_str());
        words.extend(self.args.iter().map(String::as_str));
        shell_words::join(words)
    }

    /// Program plus its first argument, e.g. `gh auth`.
    pub fn short_name(&self) -> String {
        match self.args.first() {
            Some(first) => format!("{} {}", self.program, first),
            None => self.program.clone(),
        }
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }
}

/// Captured output of a command that exited with status 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// The tagged result of running one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Exit status 0.
    Success(CommandOutput),
    /// The deadline passed and the child was killed.
    TimedOut { after: Duration },
    /// The executable could not be found.
    NotFound,
    /// Non-zero exit, killed by a signal, or could not be started.
    Failed {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

impl CommandOutcome {
    /// Trimmed stdout of a successful run, `None` for anything else.
    pub fn success_stdout(&self) -> Option<&str> {
        match self {
            CommandOutcome::Success(output) => Some(output.stdout.trim()),
            _ => None,
        }
    }

    /// One-line description of a failed outcome, preferring stderr.
    pub fn failure_detail(&self) -> String {
        match self {
            CommandOutcome::Success(_) => "succeeded".to_string(),
            CommandOutcome::TimedOut { after } => format!("timed out after {}s", after.as_secs()),
            CommandOutcome::NotFound => "executable not found".to_string(),
            CommandOutcome::Failed {
                code,
                stdout,
                stderr,
            } => {
                let message = if stderr.trim().is_empty() {
                    stdout.trim()
                } else {
                    stderr.trim()
                };
                match (code, message.is_empty()) {
                    (Some(code), true) => format!("exited with code {}", code),
                    (Some(code), false) => format!("exited with code {}: {}", code, message),
                    (None, true) => "terminated abnormally".to_string(),
                    (None, false) => message.to_string(),
                }
            }
        }
    }
}

/// Runs external commands.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> CommandOutcome;
}

/// Answers whether an executable is reachable through PATH.
pub trait ToolLocator {
    fn is_installed(&self, tool: &str) -> bool;
}

/// Runner backed by real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> CommandOutcome {
        debug!(command = %spec.display(), timeout_secs = spec.timeout_secs(), "running command");

        match run_with_timeout(spec) {
            Ok(outcome) => {
                if !matches!(outcome, CommandOutcome::Success(_)) {
                    debug!(command = %spec.short_name(), detail = %outcome.failure_detail(), "command did not succeed");
                }
                outcome
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(program = %spec.program, "executable not found");
                CommandOutcome::NotFound
            }
            Err(e) => {
                debug!(command = %spec.short_name(), error = %e, "failed to run command");
                CommandOutcome::Failed {
                    code: None,
                    stdout: String::new(),
                    stderr: e.to_string(),
                }
            }
        }
    }
}

/// Locator backed by a PATH search; nothing is executed.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathLocator;

impl ToolLocator for PathLocator {
    fn is_installed(&self, tool: &str) -> bool {
        which::which(tool).is_ok()
    }
}

/// Spawn the command with stdout/stderr going to anonymous temp files, then
/// poll until it exits or the deadline passes.
fn run_with_timeout(spec: &CommandSpec) -> std::io::Result<CommandOutcome> {
    let mut stdout_file = tempfile::tempfile()?;
    let mut stderr_file = tempfile::tempfile()?;

    let mut child = Command::new(&spec.program)
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout_file.try_clone()?))
        .stderr(Stdio::from(stderr_file.try_clone()?))
        .spawn()?;

    let Some(status) = wait_with_timeout(&mut child, spec.timeout)? else {
        return Ok(CommandOutcome::TimedOut {
            after: spec.timeout,
        });
    };

    let stdout = read_back(&mut stdout_file)?;
    let stderr = read_back(&mut stderr_file)?;

    if status.success() {
        Ok(CommandOutcome::Success(CommandOutput { stdout, stderr }))
    } else {
        Ok(CommandOutcome::Failed {
            code: status.code(),
            stdout,
            stderr,
        })
    }
}

/// The parts of a running child the wait loop touches.
trait Waitable {
    fn try_wait(&mut self) -> std::io::Result<Option<ExitStatus>>;
    fn kill_and_reap(&mut self);
}

impl Waitable for Child {
    fn try_wait(&mut self) -> std::io::Result<Option<ExitStatus>> {
        Child::try_wait(self)
    }

    fn kill_and_reap(&mut self) {
        kill_process(self);
    }
}

/// Poll until the child exits. `Ok(None)` means the deadline passed.
///
/// The child never outlives this call unreaped: it is killed both on timeout
/// and when polling itself fails.
fn wait_with_timeout<W: Waitable>(
    child: &mut W,
    timeout: Duration,
) -> std::io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) if start.elapsed() >= timeout => {
                child.kill_and_reap();
                return Ok(None);
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                child.kill_and_reap();
                return Err(e);
            }
        }
    }
}

/// Kill a process and reap it.
fn kill_process(child: &mut Child) {
    // On Unix this is SIGKILL; on Windows it is TerminateProcess.
    let _ = child.kill();
    let _ = child.wait();
}

fn read_back(file: &mut File) -> std::io::Result<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(program: &str, args: &[&str], secs: u64) -> CommandSpec {
        CommandSpec::new(program, args.iter().copied(), Duration::from_secs(secs))
    }

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let spec = spec("git", &["config", "user.name"], 5);
        assert_eq!(spec.display(), "git config user.name");

        let spec = CommandSpec::new(
            "gh",
            ["workflow", "run", "a b.yml"],
            Duration::from_secs(5),
        );
        assert_eq!(spec.display(), "gh workflow run 'a b.yml'");
    }

    #[test]
    fn short_name_uses_first_argument() {
        assert_eq!(spec("gh", &["auth", "status"], 5).short_name(), "gh auth");
        assert_eq!(spec("ccusage", &[], 5).short_name(), "ccusage");
    }

    #[test]
    fn failure_detail_prefers_stderr() {
        let outcome = CommandOutcome::Failed {
            code: Some(1),
            stdout: "out".to_string(),
            stderr: "not logged in\n".to_string(),
        };
        assert_eq!(outcome.failure_detail(), "exited with code 1: not logged in");

        let outcome = CommandOutcome::Failed {
            code: Some(2),
            stdout: String::new(),
            stderr: String::new(),
        };
        assert_eq!(outcome.failure_detail(), "exited with code 2");
    }

    #[test]
    fn success_stdout_is_trimmed() {
        let outcome = CommandOutcome::Success(CommandOutput {
            stdout: "  value\n".to_string(),
            stderr: String::new(),
        });
        assert_eq!(outcome.success_stdout(), Some("value"));
        assert_eq!(CommandOutcome::NotFound.success_stdout(), None);
    }

    #[test]
    fn system_runner_reports_missing_executable() {
        let outcome = SystemRunner.run(&spec("hermod-definitely-not-a-real-tool", &[], 5));
        assert_eq!(outcome, CommandOutcome::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_captures_stdout() {
        let outcome = SystemRunner.run(&spec("echo", &["hello"], 5));
        assert_eq!(outcome.success_stdout(), Some("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_non_zero_exit() {
        let outcome = SystemRunner.run(&spec("sh", &["-c", "echo oops >&2; exit 3"], 5));
        match outcome {
            CommandOutcome::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr.trim(), "oops");
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_kills_on_timeout() {
        let start = Instant::now();
        let outcome = SystemRunner.run(&spec("sleep", &["5"], 1));
        assert!(matches!(outcome, CommandOutcome::TimedOut { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn path_locator_misses_unknown_tool() {
        assert!(!PathLocator.is_installed("hermod-definitely-not-a-real-tool"));
    }

    /// Child whose polling fails after a few successful checks.
    struct FailingPoll {
        polls_before_error: usize,
        killed: bool,
    }

    impl Waitable for FailingPoll {
        fn try_wait(&mut self) -> std::io::Result<Option<ExitStatus>> {
            if self.polls_before_error == 0 {
                return Err(std::io::Error::other("wait failed"));
            }
            self.polls_before_error -= 1;
            Ok(None)
        }

        fn kill_and_reap(&mut self) {
            self.killed = true;
        }
    }

    #[test]
    fn poll_error_kills_child() {
        let mut child = FailingPoll {
            polls_before_error: 2,
            killed: false,
        };

        let err = wait_with_timeout(&mut child, Duration::from_secs(60)).unwrap_err();
        assert_eq!(err.to_string(), "wait failed");
        assert!(child.killed);
    }

    #[test]
    fn deadline_kills_child() {
        let mut child = FailingPoll {
            polls_before_error: usize::MAX,
            killed: false,
        };

        let waited = wait_with_timeout(&mut child, Duration::ZERO).unwrap();
        assert!(waited.is_none());
        assert!(child.killed);
    }
}
