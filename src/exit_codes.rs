//! Exit code constants for the hermod CLI.
//!
//! - 0: Success
//! - 1: Any command failure (config, dependencies, detection, collection,
//!   persistence, submission, timeout)
//!
//! Invalid command-line usage is reported by clap itself, which exits with 2.

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// A command ran and failed.
pub const FAILURE: i32 = 1;
