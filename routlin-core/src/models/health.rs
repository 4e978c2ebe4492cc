use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const MIN_CYCLE_LENGTH: u32 = 21;
pub const MAX_CYCLE_LENGTH: u32 = 45;
pub const MIN_PERIOD_DURATION: u32 = 3;
pub const MAX_PERIOD_DURATION: u32 = 10;

pub const DEFAULT_CYCLE_LENGTH: u32 = 28;
pub const DEFAULT_PERIOD_DURATION: u32 = 5;

/// One logged period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodEntry {
    pub id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: i64,
    /// Days since the previous period's start; `None` for the first entry.
    pub cycle_length: Option<i64>,
}

impl PeriodEntry {
    /// An entry spanning `duration` days from `start_date`.
    pub fn new(start_date: NaiveDate, duration: u32, cycle_length: Option<i64>) -> Self {
        let duration = i64::from(duration);
        Self {
            id: Uuid::new_v4().to_string(),
            start_date,
            end_date: start_date + Duration::days(duration - 1),
            duration,
            cycle_length,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

impl fmt::Display for PeriodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({} days)",
            self.start_date, self.end_date, self.duration
        )?;
        if let Some(cycle) = self.cycle_length {
            write!(f, ", cycle {} days", cycle)?;
        }
        Ok(())
    }
}

/// Per-user cycle settings and period log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthProfile {
    pub avg_cycle_length: u32,
    pub avg_period_duration: u32,
    pub last_period_start: Option<NaiveDate>,
    #[serde(default)]
    pub entries: Vec<PeriodEntry>,
}

impl Default for HealthProfile {
    fn default() -> Self {
        Self {
            avg_cycle_length: DEFAULT_CYCLE_LENGTH,
            avg_period_duration: DEFAULT_PERIOD_DURATION,
            last_period_start: None,
            entries: Vec::new(),
        }
    }
}
