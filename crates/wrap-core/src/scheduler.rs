//! Cron-driven trigger for the weekly wrap
//!
//! The schedule is a standard 5-field cron expression (an optional leading
//! seconds field is accepted) evaluated in the configured time zone:
//!
//! - `SCHEDULE_CRON`: e.g. `0 9 * * 1` for Mondays at 09:00
//! - `SCHEDULE_TIMEZONE` (or `TZ`): IANA zone name, UTC when unset or unknown
//!
//! The loop sleeps until the next occurrence, runs one cycle to completion and
//! only then looks for the following occurrence, so cycles never overlap.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use croner::Cron;
use tracing::{error, info, warn};

use crate::config::ScheduleConfig;
use crate::error::{Error, Result};
use crate::pipeline::{Delivery, WeeklyWrap};

/// Parse an IANA zone name, falling back to UTC
pub fn resolve_timezone(name: &str) -> Tz {
    let name = name.trim();
    if name.is_empty() {
        return Tz::UTC;
    }

    match name.parse::<Tz>() {
        Ok(tz) => tz,
        Err(e) => {
            warn!(timezone = %name, "Unknown time zone ({}), using UTC", e);
            Tz::UTC
        }
    }
}

pub struct Schedule {
    cron: Cron,
    expression: String,
    timezone: Tz,
}

impl Schedule {
    pub fn new(expression: &str, timezone: Tz) -> Result<Self> {
        let cron = Cron::new(expression)
            .with_seconds_optional()
            .parse()
            .map_err(|e| {
                Error::Schedule(format!("invalid cron expression '{}': {}", expression, e))
            })?;

        Ok(Self {
            cron,
            expression: expression.to_string(),
            timezone,
        })
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        Self::new(&config.cron, resolve_timezone(&config.timezone))
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// First occurrence strictly after `after`
    pub fn next_after(&self, after: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let local = after.with_timezone(&self.timezone);
        let next = self
            .cron
            .find_next_occurrence(&local, false)
            .map_err(|e| {
                Error::Schedule(format!(
                    "no occurrence of '{}' after {}: {}",
                    self.expression, after, e
                ))
            })?;

        Ok(next.with_timezone(&Utc))
    }

    /// The next `count` occurrences after `after`
    pub fn upcoming(&self, after: DateTime<Utc>, count: usize) -> Result<Vec<DateTime<Utc>>> {
        let mut occurrences = Vec::with_capacity(count);
        let mut cursor = after;

        for _ in 0..count {
            cursor = self.next_after(cursor)?;
            occurrences.push(cursor);
        }

        Ok(occurrences)
    }
}

/// Run the weekly wrap on schedule until the process stops
///
/// A failed cycle is logged and the loop carries on with the next occurrence.
/// Returns only if the expression has no further occurrences.
pub async fn run_scheduler(schedule: &Schedule, wrap: &WeeklyWrap) -> Result<()> {
    info!(
        cron = %schedule.expression(),
        timezone = %schedule.timezone(),
        "Starting weekly wrap scheduler"
    );

    loop {
        let next = schedule.next_after(Utc::now())?;
        info!(
            next_run = %next.with_timezone(&schedule.timezone()),
            "Next weekly wrap scheduled"
        );

        let wait = (next - Utc::now()).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        info!("Running scheduled weekly wrap...");

        match wrap.run(Delivery::Send).await {
            Ok(outcome) if outcome.delivered => {
                info!(date_range = %outcome.analysis.date_range, "Weekly wrap sent");
            }
            Ok(outcome) => {
                warn!(date_range = %outcome.analysis.date_range, "Weekly wrap prepared but not sent");
            }
            Err(e) => {
                error!("Weekly wrap failed: {}", e);
            }
        }
    }
}
