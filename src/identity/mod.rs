//! Developer identity resolution.
//!
//! Produces the canonical developer name stamped onto a submission. Sources
//! are tried in order and the first valid answer wins:
//!
//! 1. An explicit `--developer` value (validated, never second-guessed)
//! 2. `git config user.email` looked up in the mapping file
//! 3. `git config user.name` looked up in the mapping file
//! 4. The local part of an unmapped git email
//!
//! Individual git lookups fail softly; only the absence of any valid name is
//! an error.

use crate::config::IdentityIndex;
use crate::error::{HermodError, Result};
use crate::git;
use crate::process::CommandRunner;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};


pub const DEVELOPER_NAME_MIN_LENGTH: usize = 1;
pub const DEVELOPER_NAME_MAX_LENGTH: usize = 100;

static DEVELOPER_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^[A-Za-z0-9 ._\-]{{{},{}}}$",
        DEVELOPER_NAME_MIN_LENGTH, DEVELOPER_NAME_MAX_LENGTH
    ))
    .expect("developer name pattern is a valid regex")
});

/// Whether `name` may be used as a canonical developer name.
///
/// Allowed: ASCII letters, digits, spaces, periods, underscores, and hyphens,
/// 1 to 100 characters, not blank.
pub fn is_valid_developer_name(name: &str) -> bool {
    !name.trim().is_empty() && DEVELOPER_NAME_PATTERN.is_match(name)
}

/// Check an explicitly supplied name.
pub fn validate_developer_name(name: &str) -> Result<&str> {
    if is_valid_developer_name(name) {
        Ok(name)
    } else {
        Err(HermodError::Detection(format!(
            "Invalid developer name. Must be {}-{} characters and contain only letters, \
             numbers, spaces, periods, underscores, and hyphens.",
            DEVELOPER_NAME_MIN_LENGTH, DEVELOPER_NAME_MAX_LENGTH
        )))
    }
}

/// Which source produced a resolved name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Explicit,
    EmailMapping,
    NameMapping,
    EmailFallback,
}

impl IdentitySource {
    /// Human-readable description for command output.
    pub fn describe(&self) -> &'static str {
        match self {
            IdentitySource::Explicit => "--developer",
            IdentitySource::EmailMapping => "git email mapping",
            IdentitySource::NameMapping => "git name mapping",
            IdentitySource::EmailFallback => "git email username",
        }
    }
}

/// A canonical developer name and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub name: String,
    pub source: IdentitySource,
}

/// Resolves the canonical developer name for this machine.
pub struct IdentityResolver<'a> {
    runner: &'a dyn CommandRunner,
    mapping_path: PathBuf,
    timeout: Duration,
}

impl<'a> IdentityResolver<'a> {
    /// Create a resolver reading mappings from `mapping_path`.
    ///
    /// The file is only read when auto-detection is needed.
    pub fn new<P: AsRef<Path>>(
        runner: &'a dyn CommandRunner,
        mapping_path: P,
        timeout: Duration,
    ) -> Self {
        Self {
            runner,
            mapping_path: mapping_path.as_ref().to_path_buf(),
            timeout,
        }
    }

    /// Resolve the developer name.
    ///
    /// # Returns
    ///
    /// * `Ok(ResolvedIdentity)` - A name that passed validation
    /// * `Err(HermodError::Detection)` - Explicit name invalid, or nothing usable found
    /// * `Err(HermodError::Config)` - The mapping file exists but is malformed
    pub fn resolve(&self, explicit: Option<&str>) -> Result<ResolvedIdentity> {
        if let Some(name) = explicit {
            validate_developer_name(name)?;
            debug!(developer = name, "using explicit developer name");
            return Ok(ResolvedIdentity {
                name: name.to_string(),
                source: IdentitySource::Explicit,
            });
        }

        let index = IdentityIndex::load(&self.mapping_path)?;
        if index.is_empty() {
            debug!("no developer mappings, only the email fallback can apply");
        }
        let resolved = self.detect(&index)?;

        if !is_valid_developer_name(&resolved.name) {
            return Err(HermodError::Detection(format!(
                "Auto-detected developer name '{}' is invalid. \
                 Please provide a valid name with --developer option.",
                resolved.name
            )));
        }

        Ok(resolved)
    }

    fn detect(&self, index: &IdentityIndex) -> Result<ResolvedIdentity> {
        // Email first: it is the most reliable identifier.
        let email = git::user_email(self.runner, self.timeout);
        if let Some(canonical) = email.as_deref().and_then(|e| index.canonical_for_email(e)) {
            info!(developer = canonical, "detected developer from email mapping");
            return Ok(ResolvedIdentity {
                name: canonical.to_string(),
                source: IdentitySource::EmailMapping,
            });
        }

        let git_name = git::user_name(self.runner, self.timeout);
        if let Some(canonical) = git_name.as_deref().and_then(|n| index.canonical_for_name(n)) {
            info!(developer = canonical, "detected developer from name mapping");
            return Ok(ResolvedIdentity {
                name: canonical.to_string(),
                source: IdentitySource::NameMapping,
            });
        }

        if let Some(fallback) = email.as_deref().and_then(email_local_part)
            && is_valid_developer_name(fallback)
        {
            warn!(
                email = email.as_deref().unwrap_or_default(),
                git_name = git_name.as_deref().unwrap_or_default(),
                fallback,
                mapping = %self.mapping_path.display(),
                "no developer mapping found, using email username as fallback"
            );
            return Ok(ResolvedIdentity {
                name: fallback.to_string(),
                source: IdentitySource::EmailFallback,
            });
        }

        Err(HermodError::Detection(format!(
            "Failed to detect developer: could not auto-detect developer from git config \
             (git email: '{}', git name: '{}'). Add this developer to {} or use --developer.",
            email.as_deref().unwrap_or_default(),
            git_name.as_deref().unwrap_or_default(),
            self.mapping_path.display()
        )))
    }
}

/// The part of an email before `@`, if there is one.
fn email_local_part(email: &str) -> Option<&str> {
    email
        .split_once('@')
        .map(|(local, _)| local)
        .filter(|local| !local.is_empty())
}
