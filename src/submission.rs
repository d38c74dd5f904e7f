//! Submission files: naming, writing, locating, and reading back.
//!
//! A submission file is named `ai_usage_<developer>_<YYYYMMDD_HHMMSS>.json`
//! (UTC) and holds one pretty-printed [`UsageRecord`]. Files are written once
//! and never modified afterwards.

use crate::error::{HermodError, Result};
use crate::fs::atomic_write;
use crate::identity::{is_valid_developer_name, validate_developer_name};
use crate::record::UsageRecord;
use chrono::{DateTime, Utc};
use globset::{Glob, GlobMatcher};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;
use tracing::{debug, info};

pub const SUBMISSION_PREFIX: &str = "ai_usage_";
pub const SUBMISSION_GLOB: &str = "ai_usage_*.json";

static SUBMISSION_MATCHER: LazyLock<GlobMatcher> = LazyLock::new(|| {
    Glob::new(SUBMISSION_GLOB)
        .expect("submission glob is valid")
        .compile_matcher()
});

/// Make a developer name safe for use inside a file name.
///
/// Anything other than ASCII letters, digits, `_`, and `-` becomes `_`.
pub fn sanitize_for_filename(developer: &str) -> String {
    developer
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File name for a submission by `developer` written at `at`.
pub fn submission_file_name(developer: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}{}_{}.json",
        SUBMISSION_PREFIX,
        sanitize_for_filename(developer),
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Persists usage records into a submission directory.
#[derive(Debug, Clone)]
pub struct SubmissionWriter {
    output_dir: PathBuf,
}

impl SubmissionWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Write `record` to a new submission file and return its path.
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the written file
    /// * `Err(HermodError::Detection)` - The record carries an invalid developer name
    /// * `Err(HermodError::Persistence)` - Serialization or I/O failure
    pub fn save(&self, record: &UsageRecord, at: DateTime<Utc>) -> Result<PathBuf> {
        validate_developer_name(record.developer())?;

        let path = self
            .output_dir
            .join(submission_file_name(record.developer(), at));

        let mut content = serde_json::to_string_pretty(record)
            .map_err(|e| HermodError::Persistence(format!("failed to serialize record: {}", e)))?;
        content.push('\n');

        atomic_write(&path, content.as_bytes())?;
        info!(path = %path.display(), developer = record.developer(), "saved submission");
        Ok(path)
    }
}

/// Read and parse a submission file.
///
/// # Returns
///
/// * `Ok(UsageRecord)` - The parsed record
/// * `Err(HermodError::Submission)` - Unreadable file, or content that is not a valid record
pub fn load_submission<P: AsRef<Path>>(path: P) -> Result<UsageRecord> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path).map_err(|e| {
        HermodError::Submission(format!(
            "Failed to read submission file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let record: UsageRecord = serde_json::from_str(&content).map_err(|e| {
        HermodError::Submission(format!(
            "Invalid submission file format ({}): {}",
            path.display(),
            e
        ))
    })?;

    if !is_valid_developer_name(record.developer()) {
        return Err(HermodError::Submission(format!(
            "Invalid submission file format ({}): invalid developer name '{}'",
            path.display(),
            record.developer()
        )));
    }

    Ok(record)
}

/// Find the most recent submission file in `dir`.
///
/// The newest modification time wins; equal times fall back to the file name,
/// whose timestamp suffix sorts chronologically.
pub fn find_latest_submission<P: AsRef<Path>>(dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let not_found = || {
        HermodError::Submission(format!(
            "No submission file found in {}. Run `hermod collect` first.",
            dir.display()
        ))
    };

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "cannot read submission directory");
            return Err(not_found());
        }
    };

    let mut candidates: Vec<(SystemTime, String, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            if !SUBMISSION_MATCHER.is_match(&name) {
                return None;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            Some((modified, name, entry.path()))
        })
        .collect();

    candidates.sort();
    let (_, name, path) = candidates.pop().ok_or_else(not_found)?;
    debug!(file = %name, "selected latest submission");
    Ok(path)
}
