use crate::process::{CommandOutcome, CommandOutput, CommandRunner, CommandSpec, ToolLocator};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

/// Scripted [`CommandRunner`] keyed on `"<program> <first arg>"`.
///
/// Unscripted commands report `NotFound`. Every call is recorded.
#[derive(Default)]
pub(crate) struct FakeRunner {
    responses: HashMap<String, Vec<CommandOutcome>>,
    calls: RefCell<Vec<CommandSpec>>,
    served: RefCell<HashMap<String, usize>>,
}

impl FakeRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a command. Repeated calls to the same key return
    /// queued responses in order, repeating the last one when exhausted.
    pub(crate) fn respond(mut self, key: &str, outcome: CommandOutcome) -> Self {
        self.responses
            .entry(key.to_string())
            .or_default()
            .push(outcome);
        self
    }

    pub(crate) fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Calls whose short name (`program first-arg`) equals `key`.
    pub(crate) fn calls_to(&self, key: &str) -> Vec<CommandSpec> {
        self.calls
            .borrow()
            .iter()
            .filter(|spec| spec.short_name() == key)
            .cloned()
            .collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, spec: &CommandSpec) -> CommandOutcome {
        self.calls.borrow_mut().push(spec.clone());

        let key = spec.short_name();
        let Some(queue) = self.responses.get(&key) else {
            return CommandOutcome::NotFound;
        };

        let mut served = self.served.borrow_mut();
        let index = served.entry(key).or_insert(0);
        let outcome = queue[(*index).min(queue.len() - 1)].clone();
        *index += 1;
        outcome
    }
}

/// [`ToolLocator`] answering from a fixed set of installed tools.
pub(crate) struct FakeLocator {
    installed: HashSet<String>,
}

impl FakeLocator {
    pub(crate) fn with(tools: &[&str]) -> Self {
        Self {
            installed: tools.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub(crate) fn all() -> Self {
        Self::with(&["ccusage", "ccusage-codex", "gh", "git"])
    }
}

impl ToolLocator for FakeLocator {
    fn is_installed(&self, tool: &str) -> bool {
        self.installed.contains(tool)
    }
}

pub(crate) fn ok(stdout: &str) -> CommandOutcome {
    CommandOutcome::Success(CommandOutput {
        stdout: stdout.to_string(),
        stderr: String::new(),
    })
}

pub(crate) fn failed(code: i32, stderr: &str) -> CommandOutcome {
    CommandOutcome::Failed {
        code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

pub(crate) fn create_test_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path();

    git(path, &["init"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);

    temp_dir
}

fn git(repo_dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .current_dir(repo_dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute git {}: {}", args.join(" "), e));

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "git {} failed (exit code {:?})\nstdout:\n{}\nstderr:\n{}",
            args.join(" "),
            output.status.code(),
            stdout,
            stderr
        );
    }
}

/// In-memory log sink, installed at the same `warn` default as the binary.
#[derive(Clone, Default)]
pub(crate) struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Capture events on this thread until the guard is dropped.
    pub(crate) fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_target(false)
            .without_time()
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
