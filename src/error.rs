//! Error types for the hermod CLI.
//!
//! Uses thiserror for derive macros. The `Display` text of each variant is the
//! message shown to the user, so it should read as a complete sentence.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for hermod operations.
///
/// Each variant is one failure kind a command can end with. Lower layers that
/// are allowed to fail softly (a single git config lookup, for example) never
/// produce one of these; they return `None` instead.
#[derive(Error, Debug)]
pub enum HermodError {
    /// The developer mapping file exists but is malformed.
    #[error("Invalid developer mapping config: {0}")]
    Config(String),

    /// One or more required usage tools are not on PATH.
    #[error("Dependencies not installed: {}", .0.join(", "))]
    DependencyMissing(Vec<String>),

    /// No valid developer name could be produced.
    #[error("{0}")]
    Detection(String),

    /// A usage tool failed or returned output we could not use.
    #[error("Failed to collect usage data: {0}")]
    Collection(String),

    /// The submission file could not be written.
    #[error("Failed to save submission: {0}")]
    Persistence(String),

    /// Authentication, dispatch, or submission file problems.
    #[error("{0}")]
    Submission(String),

    /// A bounded external call exceeded its deadline.
    #[error("{command} timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },
}

impl HermodError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            HermodError::Config(_)
            | HermodError::DependencyMissing(_)
            | HermodError::Detection(_)
            | HermodError::Collection(_)
            | HermodError::Persistence(_)
            | HermodError::Submission(_)
            | HermodError::Timeout { .. } => exit_codes::FAILURE,
        }
    }

    /// Short machine-friendly name of the failure kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            HermodError::Config(_) => "config",
            HermodError::DependencyMissing(_) => "dependency_missing",
            HermodError::Detection(_) => "detection",
            HermodError::Collection(_) => "collection",
            HermodError::Persistence(_) => "persistence",
            HermodError::Submission(_) => "submission",
            HermodError::Timeout { .. } => "timeout",
        }
    }
}

/// Result type alias for hermod operations.
pub type Result<T> = std::result::Result<T, HermodError>;
