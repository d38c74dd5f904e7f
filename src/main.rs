//! Hermod: collect AI coding-assistant usage and submit it for ingestion.
//!
//! This is the main entry point for the `hermod` CLI. It parses arguments,
//! reads settings from the environment, sets up logging, and hands the
//! command to the dispatcher, which decides the exit code.

mod cli;
mod commands;
pub mod collector;
pub mod config;
pub mod context;
pub mod deps;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod git;
pub mod identity;
pub mod logging;
pub mod process;
pub mod record;
pub mod submission;
pub mod trigger;

#[cfg(test)]
mod test_support;

use cli::Cli;
use config::{LogSettings, Settings};
use context::AppContext;
use process::{PathLocator, SystemRunner};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Logging first, so problems reading the remaining settings are reported.
    let _logging = logging::init(&LogSettings::from_env());
    let settings = Settings::from_env();

    let runner = SystemRunner;
    let locator = PathLocator;
    let ctx = AppContext::new(settings, &runner, &locator);

    let code = commands::run(
        cli.command,
        &ctx,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    );
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
