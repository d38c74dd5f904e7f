//! The usage record written to a submission file.
//!
//! The `claude_code` and `codex` payloads are whatever the usage tools
//! printed; hermod only ever looks inside them to read a total cost for
//! display.

use chrono::{DateTime, Days, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Submission format version written into `metadata.version`.
pub const RECORD_VERSION: &str = "1.0";

/// Primary cost field in a tool's `totals` object.
pub const COST_FIELD: &str = "totalCost";

/// Older `ccusage-codex` releases report cost under this name instead.
pub const LEGACY_COST_FIELD: &str = "costUSD";

/// Inclusive date window a collection covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

impl DateRange {
    /// The `days` days ending on `today`.
    pub fn ending_on(today: NaiveDate, days: u32) -> Self {
        let start = today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self {
            start,
            end: today,
            days: Some(days),
        }
    }

    /// Start date in the `YYYYMMDD` form the usage tools take for `--since`.
    pub fn since_arg(&self) -> String {
        self.start.format("%Y%m%d").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub developer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<String>,
    pub date_range: DateRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// One collection run, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub metadata: Metadata,
    pub claude_code: Value,
    pub codex: Value,
}

impl UsageRecord {
    pub fn new(
        developer: &str,
        date_range: DateRange,
        collected_at: DateTime<Utc>,
        claude_code: Value,
        codex: Value,
    ) -> Self {
        Self {
            metadata: Metadata {
                developer: developer.to_string(),
                collected_at: Some(collected_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
                date_range,
                version: Some(RECORD_VERSION.to_string()),
            },
            claude_code,
            codex,
        }
    }

    pub fn developer(&self) -> &str {
        &self.metadata.developer
    }

    /// Total Claude Code cost, if reported.
    pub fn claude_code_cost(&self) -> Option<f64> {
        self.claude_code.get("totals").and_then(claude_code_cost)
    }

    /// Total Codex cost, if reported under either field name.
    pub fn codex_cost(&self) -> Option<f64> {
        self.codex.get("totals").and_then(codex_cost)
    }
}

/// Cost from a Claude Code `totals` object.
pub fn claude_code_cost(totals: &Value) -> Option<f64> {
    totals.get(COST_FIELD).and_then(Value::as_f64)
}

/// Cost from a Codex `totals` object: `totalCost`, else `costUSD`.
pub fn codex_cost(totals: &Value) -> Option<f64> {
    totals
        .get(COST_FIELD)
        .and_then(Value::as_f64)
        .or_else(|| totals.get(LEGACY_COST_FIELD).and_then(Value::as_f64))
}
