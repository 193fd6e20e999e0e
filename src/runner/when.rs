//! Time-based execution gate
//!
//! A task may throttle itself with a `frequency` (`"daily"` or a number of
//! milliseconds) and carry a `when` condition. The gate is evaluated at the
//! top of every run.

use crate::runner::RunOptions;
use chrono::{DateTime, Duration, Utc};

/// Minimum spacing between two runs of a task
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frequency {
    /// At least 24 hours apart
    Daily,
    /// At least this many milliseconds apart
    Millis(f64),
}

impl Frequency {
    /// Parse `"daily"` or a non-negative number of milliseconds
    pub fn parse(value: &str) -> Option<Self> {
        if value == "daily" {
            return Some(Frequency::Daily);
        }

        value
            .parse::<f64>()
            .ok()
            .filter(|ms| ms.is_finite() && *ms >= 0.0)
            .map(Frequency::Millis)
    }

    /// Whether `elapsed` is long enough for another run
    pub fn has_elapsed(&self, elapsed: Duration) -> bool {
        match self {
            Frequency::Daily => elapsed >= Duration::hours(24),
            Frequency::Millis(threshold) => elapsed.num_milliseconds() as f64 >= *threshold,
        }
    }
}

/// Extra condition attached to a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhenCondition {
    /// Passes as soon as the UTC calendar day changed since the last run
    NewDay,
    /// Unrecognized condition, carried for diagnostics only
    Other(String),
}

impl WhenCondition {
    pub fn parse(value: &str) -> Self {
        match value {
            "new-day" => WhenCondition::NewDay,
            other => WhenCondition::Other(other.to_string()),
        }
    }
}

/// Scheduling metadata of one task
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    /// Raw frequency field, validated when the gate runs
    pub frequency: Option<String>,
    pub when: Option<WhenCondition>,
}

/// Decide whether a task may run at `now`
pub fn should_execute_timewise(
    schedule: &Schedule,
    last_execution: Option<DateTime<Utc>>,
    options: &RunOptions,
    now: DateTime<Utc>,
) -> bool {
    if options.run_only_with_frequency && schedule.frequency.is_none() {
        return false;
    }

    if let Some(raw) = &schedule.frequency {
        let Some(frequency) = Frequency::parse(raw) else {
            log::info!("Malformed frequency field ({}). Skipped.", raw);
            return false;
        };

        if let Some(last) = last_execution {
            if !frequency.has_elapsed(now.signed_duration_since(last)) {
                return false;
            }
        }
    }

    if let Some(WhenCondition::NewDay) = &schedule.when {
        let is_new_day = last_execution.map_or(true, |last| last.date_naive() != now.date_naive());
        if is_new_day {
            log::debug!("New day since last execution");
            return true;
        }
    }

    true
}
