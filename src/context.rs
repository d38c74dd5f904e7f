//! Services shared by the command flows.
//!
//! Commands never reach for the process environment, PATH, or the clock
//! directly; everything external comes through an [`AppContext`], which
//! `main` builds once from real implementations and tests build from fakes.

use crate::config::Settings;
use crate::process::{CommandRunner, ToolLocator};
use chrono::{DateTime, Utc};

/// Source of the current time.
pub type Clock = fn() -> DateTime<Utc>;

/// Resolved settings plus the process and clock seams a command runs against.
pub struct AppContext<'a> {
    pub settings: Settings,
    pub runner: &'a dyn CommandRunner,
    pub locator: &'a dyn ToolLocator,
    pub clock: Clock,
}

impl<'a> AppContext<'a> {
    pub fn new(
        settings: Settings,
        runner: &'a dyn CommandRunner,
        locator: &'a dyn ToolLocator,
    ) -> Self {
        Self {
            settings,
            runner,
            locator,
            clock: Utc::now,
        }
    }

    /// Replace the clock, for deterministic timestamps.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}
