//! CLI argument parsing for hermod.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; the flows themselves
//! are in the `commands` module.

use crate::config::types::{MAX_COMMAND_TIMEOUT_SECONDS, MIN_COMMAND_TIMEOUT_SECONDS};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hermod: collect AI coding-assistant usage and submit it for ingestion.
///
/// `collect` resolves who you are, runs the usage tools, and saves a
/// timestamped submission file. `submit` dispatches the newest submission
/// file to the ingestion workflow through the GitHub CLI.
#[derive(Parser, Debug)]
#[command(name = "hermod")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for hermod.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect usage data and save a submission file.
    ///
    /// Checks that ccusage and ccusage-codex are installed, resolves the
    /// developer name, and writes ai_usage_<developer>_<timestamp>.json.
    Collect(CollectArgs),

    /// Submit the most recent submission file.
    ///
    /// Requires an authenticated GitHub CLI.
    Submit(SubmitArgs),
}

/// Arguments for the `collect` command.
#[derive(Parser, Debug)]
pub struct CollectArgs {
    /// Developer name to record instead of auto-detecting from git.
    #[arg(short, long)]
    pub developer: Option<String>,

    /// Number of days of usage to collect.
    #[arg(short = 'n', long, default_value_t = 7, value_parser = clap::value_parser!(u32).range(1..=365))]
    pub days: u32,

    /// Print a single JSON object instead of human-readable output.
    #[arg(long)]
    pub json: bool,

    /// Per-command timeout in seconds (overrides HERMOD_COMMAND_TIMEOUT_SECONDS).
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u64).range(MIN_COMMAND_TIMEOUT_SECONDS..=MAX_COMMAND_TIMEOUT_SECONDS)
    )]
    pub timeout: Option<u64>,

    /// Developer mapping file (overrides HERMOD_CONFIG).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `submit` command.
#[derive(Parser, Debug)]
pub struct SubmitArgs {
    /// Directory holding submission files (overrides HERMOD_OUTPUT_DIR).
    #[arg(long)]
    pub submission_dir: Option<PathBuf>,

    /// Print a single JSON object instead of human-readable output.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_collect_defaults() {
        let cli = Cli::try_parse_from(["hermod", "collect"]).unwrap();
        match cli.command {
            Command::Collect(args) => {
                assert_eq!(args.developer, None);
                assert_eq!(args.days, 7);
                assert!(!args.json);
                assert_eq!(args.timeout, None);
                assert_eq!(args.config, None);
            }
            _ => panic!("Expected Collect command"),
        }
    }

    #[test]
    fn parse_collect_with_all_flags() {
        let cli = Cli::try_parse_from([
            "hermod",
            "collect",
            "--developer",
            "Jane Doe",
            "--days",
            "30",
            "--json",
            "--timeout",
            "300",
            "--config",
            "team/names.json",
        ])
        .unwrap();
        match cli.command {
            Command::Collect(args) => {
                assert_eq!(args.developer.as_deref(), Some("Jane Doe"));
                assert_eq!(args.days, 30);
                assert!(args.json);
                assert_eq!(args.timeout, Some(300));
                assert_eq!(args.config, Some(PathBuf::from("team/names.json")));
            }
            _ => panic!("Expected Collect command"),
        }
    }

    #[test]
    fn parse_collect_short_flags() {
        let cli = Cli::try_parse_from(["hermod", "collect", "-d", "Chad", "-n", "14", "-t", "30"])
            .unwrap();
        match cli.command {
            Command::Collect(args) => {
                assert_eq!(args.developer.as_deref(), Some("Chad"));
                assert_eq!(args.days, 14);
                assert_eq!(args.timeout, Some(30));
            }
            _ => panic!("Expected Collect command"),
        }
    }

    #[test]
    fn parse_collect_rejects_out_of_range_values() {
        for argv in [
            ["hermod", "collect", "--days", "0"],
            ["hermod", "collect", "--days", "366"],
            ["hermod", "collect", "--timeout", "4"],
            ["hermod", "collect", "--timeout", "901"],
        ] {
            let err = Cli::try_parse_from(argv).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "{:?}", argv);
        }
    }

    #[test]
    fn parse_submit() {
        let cli = Cli::try_parse_from(["hermod", "submit"]).unwrap();
        match cli.command {
            Command::Submit(args) => {
                assert_eq!(args.submission_dir, None);
                assert!(!args.json);
            }
            _ => panic!("Expected Submit command"),
        }
    }

    #[test]
    fn parse_submit_with_dir() {
        let cli =
            Cli::try_parse_from(["hermod", "submit", "--submission-dir", "/tmp/subs", "--json"])
                .unwrap();
        match cli.command {
            Command::Submit(args) => {
                assert_eq!(args.submission_dir, Some(PathBuf::from("/tmp/subs")));
                assert!(args.json);
            }
            _ => panic!("Expected Submit command"),
        }
    }

    #[test]
    fn version_flag_is_handled_by_clap() {
        let err = Cli::try_parse_from(["hermod", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["hermod"]).is_err());
    }
}
