//! Mapping file loading, validation, and indexing.

use super::model::{DeveloperMapping, MappingFile};
use crate::error::{HermodError, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// Exact-match lookup tables built from the mapping file.
///
/// Keys are normalized (trimmed, lower-cased); values are canonical names.
/// Every key maps to exactly one canonical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityIndex {
    emails: HashMap<String, String>,
    names: HashMap<String, String>,
}

impl IdentityIndex {
    /// Load and index the mapping file at `path`.
    ///
    /// A missing file is not an error: the mapping is optional and an empty
    /// index is returned. A file that exists but cannot be read or parsed, or
    /// that contains conflicting entries, is a `Config` error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!(path = %path.display(), "developer mapping file not found, using empty mapping");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            HermodError::Config(format!("failed to read '{}': {}", path.display(), e))
        })?;

        let index = Self::from_json(&content).map_err(|e| {
            HermodError::Config(format!("{} ({})", config_detail(&e), path.display()))
        })?;

        debug!(
            path = %path.display(),
            emails = index.emails.len(),
            names = index.names.len(),
            "loaded developer mapping"
        );
        Ok(index)
    }

    /// Parse and index a mapping document.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: MappingFile = serde_json::from_str(json)
            .map_err(|e| HermodError::Config(format!("failed to parse mapping JSON: {}", e)))?;

        Self::from_developers(&file.developers)
    }

    /// Build the index, rejecting duplicates and ambiguous identities.
    pub fn from_developers(developers: &[DeveloperMapping]) -> Result<Self> {
        let mut index = Self::default();
        let mut seen_canonical = HashSet::new();

        for dev in developers {
            let canonical = dev.canonical_name.trim();
            if canonical.is_empty() {
                return Err(HermodError::Config(
                    "canonical_name must be non-empty".to_string(),
                ));
            }
            if !seen_canonical.insert(canonical.to_string()) {
                return Err(HermodError::Config(format!(
                    "duplicate canonical_name '{}'",
                    canonical
                )));
            }

            for email in &dev.git_emails {
                insert_unique(&mut index.emails, "git_emails", email, canonical)?;
            }

            // Tracker identifiers are frequently email addresses.
            for linear in dev.linear_names.iter().filter(|n| n.contains('@')) {
                insert_unique(&mut index.emails, "linear_names", linear, canonical)?;
            }

            for name in &dev.git_names {
                insert_unique(&mut index.names, "git_names", name, canonical)?;
            }
        }

        Ok(index)
    }

    /// Canonical name for a git email, matched case-insensitively.
    pub fn canonical_for_email(&self, email: &str) -> Option<&str> {
        self.emails.get(&normalize(email)).map(String::as_str)
    }

    /// Canonical name for a git display name, matched case-insensitively.
    pub fn canonical_for_name(&self, name: &str) -> Option<&str> {
        self.names.get(&normalize(name)).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.names.is_empty()
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn insert_unique(
    table: &mut HashMap<String, String>,
    field: &str,
    raw: &str,
    canonical: &str,
) -> Result<()> {
    let key = normalize(raw);
    if key.is_empty() {
        return Err(HermodError::Config(format!(
            "empty entry in {} for '{}'",
            field, canonical
        )));
    }

    match table.get(&key) {
        Some(existing) if existing != canonical => Err(HermodError::Config(format!(
            "'{}' in {} maps to both '{}' and '{}'",
            raw, field, existing, canonical
        ))),
        Some(_) => Ok(()),
        None => {
            table.insert(key, canonical.to_string());
            Ok(())
        }
    }
}

/// Strip the variant prefix so `load` can add the path without repeating it.
fn config_detail(err: &HermodError) -> String {
    match err {
        HermodError::Config(detail) => detail.clone(),
        other => other.to_string(),
    }
}
