//! `hermod collect`.
//!
//! validate explicit name → check dependencies → resolve identity →
//! collect usage → save submission. Any step's error ends the flow.

use crate::cli::CollectArgs;
use crate::collector::UsageCollector;
use crate::config::CommandTimeout;
use crate::context::AppContext;
use crate::deps;
use crate::error::{HermodError, Result};
use crate::identity::{IdentityResolver, IdentitySource, validate_developer_name};
use crate::record::{DateRange, UsageRecord};
use crate::submission::SubmissionWriter;
use std::path::PathBuf;
use tracing::info;

/// Everything the collect summary needs.
#[derive(Debug)]
pub struct CollectReport {
    pub developer: String,
    pub source: IdentitySource,
    pub days: u32,
    pub record: UsageRecord,
    pub output_file: PathBuf,
    pub timeout: CommandTimeout,
}

impl CollectReport {
    pub fn date_range(&self) -> &DateRange {
        &self.record.metadata.date_range
    }
}

pub fn cmd_collect(args: CollectArgs, ctx: &AppContext<'_>) -> Result<CollectReport> {
    if let Some(name) = args.developer.as_deref() {
        validate_developer_name(name)?;
    }

    let status = deps::check_all(ctx.locator);
    if !status.all_installed() {
        return Err(HermodError::DependencyMissing(status.missing()));
    }

    let timeout = ctx.settings.timeout.with_override(args.timeout);
    let mapping_path = args
        .config
        .unwrap_or_else(|| ctx.settings.mapping_path.clone());

    let identity = IdentityResolver::new(ctx.runner, &mapping_path, timeout.duration())
        .resolve(args.developer.as_deref())?;
    info!(developer = %identity.name, source = ?identity.source, "developer resolved");

    let now = ctx.now();
    let range = DateRange::ending_on(now.date_naive(), args.days);
    let record =
        UsageCollector::new(ctx.runner, timeout.duration()).collect(&identity.name, &range, now)?;

    let output_file = SubmissionWriter::new(&ctx.settings.output_dir).save(&record, now)?;

    Ok(CollectReport {
        developer: identity.name,
        source: identity.source,
        days: args.days,
        record,
        output_file,
        timeout,
    })
}
