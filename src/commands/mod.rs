//! Command implementations for hermod.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! flows, and is the only place errors are turned into user-visible text
//! and exit codes.

mod collect;
mod output;
mod submit;


use crate::cli::Command;
use crate::context::AppContext;
use crate::error::Result;
use crate::exit_codes;
use collect::CollectReport;
use std::io::{self, Write};
use submit::SubmitReport;
use tracing::debug;

/// Successful outcome of a command, ready to render.
#[derive(Debug)]
enum Report {
    Collected(CollectReport),
    Submitted(SubmitReport),
}

/// Dispatch a command to its implementation.
fn dispatch(command: Command, ctx: &AppContext<'_>) -> Result<Report> {
    match command {
        Command::Collect(args) => collect::cmd_collect(args, ctx).map(Report::Collected),
        Command::Submit(args) => submit::cmd_submit(args, ctx).map(Report::Submitted),
    }
}

/// Run a command and print exactly one terminal message.
///
/// Returns the process exit code.
pub fn run(
    command: Command,
    ctx: &AppContext<'_>,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> i32 {
    let json = match &command {
        Command::Collect(args) => args.json,
        Command::Submit(args) => args.json,
    };

    let (printed, code) = match dispatch(command, ctx) {
        Ok(report) => (render(&report, json, stdout), exit_codes::SUCCESS),
        Err(err) => {
            debug!(kind = err.kind(), "command failed");
            let printed = if json {
                output::error_json(&err, stdout)
            } else {
                output::error_human(&err, stderr)
            };
            (printed, err.exit_code())
        }
    };

    if let Err(e) = printed {
        debug!(error = %e, "failed to write command output");
    }
    code
}

fn render(report: &Report, json: bool, out: &mut dyn Write) -> io::Result<()> {
    match (report, json) {
        (Report::Collected(r), false) => output::collect_human(r, out),
        (Report::Collected(r), true) => output::collect_json(r, out),
        (Report::Submitted(r), false) => output::submit_human(r, out),
        (Report::Submitted(r), true) => output::submit_json(r, out),
    }
}
