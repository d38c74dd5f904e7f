//! Required external tool checks.
//!
//! Presence is a PATH lookup only; nothing is executed.

use crate::process::ToolLocator;
use std::collections::BTreeMap;
use tracing::debug;

/// Usage tools `collect` cannot run without.
pub const REQUIRED_TOOLS: [&str; 2] = ["ccusage", "ccusage-codex"];

/// Install hints shown when tools are missing.
pub const INSTALL_HINTS: [&str; 2] = ["npm install -g ccusage", "npm install -g @ccusage/codex"];

/// Availability of each required tool, keyed by tool name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyStatus {
    tools: BTreeMap<String, bool>,
}

impl DependencyStatus {
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        Self {
            tools: pairs
                .into_iter()
                .map(|(tool, installed)| (tool.to_string(), installed))
                .collect(),
        }
    }

    pub fn all_installed(&self) -> bool {
        self.tools.values().all(|installed| *installed)
    }

    /// Missing tools in name order.
    pub fn missing(&self) -> Vec<String> {
        self.tools
            .iter()
            .filter(|(_, installed)| !**installed)
            .map(|(tool, _)| tool.clone())
            .collect()
    }
}

/// Check every required tool.
pub fn check_all(locator: &dyn ToolLocator) -> DependencyStatus {
    let status = DependencyStatus::from_pairs(REQUIRED_TOOLS.iter().map(|tool| {
        let installed = locator.is_installed(tool);
        if !installed {
            debug!(tool, "not found in PATH");
        }
        (*tool, installed)
    }));

    let missing = status.missing();
    if missing.is_empty() {
        debug!("all dependencies installed");
    } else {
        debug!(missing = %missing.join(", "), "missing dependencies");
    }

    status
}
