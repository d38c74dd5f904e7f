//! `hermod submit`.
//!
//! locate newest submission → check gh → authenticate → parse file →
//! dispatch → look up the repository URL (best effort).

use crate::cli::SubmitArgs;
use crate::context::AppContext;
use crate::error::Result;
use crate::submission::{find_latest_submission, load_submission};
use crate::trigger::WorkflowTrigger;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug)]
pub struct SubmitReport {
    pub file: PathBuf,
    pub developer: String,
    pub workflow: String,
    /// `None` when the lookup failed; the submission itself still succeeded.
    pub repository_url: Option<String>,
}

pub fn cmd_submit(args: SubmitArgs, ctx: &AppContext<'_>) -> Result<SubmitReport> {
    let dir = args
        .submission_dir
        .unwrap_or_else(|| ctx.settings.output_dir.clone());
    let file = find_latest_submission(&dir)?;
    info!(file = %file.display(), "submitting");

    let trigger = WorkflowTrigger::new(
        ctx.runner,
        ctx.locator,
        &ctx.settings.workflow,
        ctx.settings.repo.as_deref(),
        ctx.settings.timeout.duration(),
    );

    trigger.ensure_installed()?;
    trigger.authenticate()?;

    let record = load_submission(&file)?;
    trigger.dispatch(&file)?;

    let repository_url = trigger.repository_url();

    Ok(SubmitReport {
        file,
        developer: record.metadata.developer,
        workflow: trigger.workflow().to_string(),
        repository_url,
    })
}
