//! Developer mapping file model.

use serde::{Deserialize, Serialize};

/// Top-level shape of `developer_names.json`.
///
/// Unknown fields are ignored so the file can carry extra bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingFile {
    pub developers: Vec<DeveloperMapping>,
}

/// One developer and every identity string known to belong to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeveloperMapping {
    /// The name stamped onto submissions. Must be unique within the file.
    pub canonical_name: String,

    /// Emails seen in `git config user.email`.
    #[serde(default)]
    pub git_emails: Vec<String>,

    /// Display names seen in `git config user.name`.
    #[serde(default)]
    pub git_names: Vec<String>,

    /// Identifiers from the issue tracker. Entries that look like emails are
    /// also indexed as emails.
    #[serde(default)]
    pub linear_names: Vec<String>,
}
