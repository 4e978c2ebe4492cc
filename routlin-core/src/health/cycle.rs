//! Pure cycle arithmetic.
//!
//! Every function takes the reference date explicitly. Predictions are
//! computed in closed form, so a period start far in the past costs the
//! same as yesterday's.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::date_range::DateRange;

/// Number of predicted windows in a forecast.
pub const FORECAST_WINDOWS: usize = 3;

/// Snapshot of where the user is in their cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleStatus {
    /// 1-indexed day within the current cycle.
    pub current_day: i64,
    pub cycle_length: u32,
    pub next_period: NaiveDate,
    pub days_until_next: i64,
}

impl CycleStatus {
    pub fn compute(last_start: NaiveDate, cycle_length: u32, today: NaiveDate) -> Self {
        let next_period = next_period_start(last_start, cycle_length, today);
        Self {
            current_day: current_cycle_day(last_start, cycle_length, today),
            cycle_length,
            next_period,
            days_until_next: (next_period - today).num_days(),
        }
    }
}

/// Day of the cycle `today` falls on, wrapping every `cycle_length` days.
pub fn current_cycle_day(last_start: NaiveDate, cycle_length: u32, today: NaiveDate) -> i64 {
    let length = i64::from(cycle_length.max(1));
    (today - last_start).num_days().rem_euclid(length) + 1
}

/// The first `last_start + k * cycle_length` (k >= 0) strictly after `today`.
pub fn next_period_start(last_start: NaiveDate, cycle_length: u32, today: NaiveDate) -> NaiveDate {
    let length = i64::from(cycle_length.max(1));
    let elapsed = (today - last_start).num_days();
    let cycles = if elapsed < 0 { 0 } else { elapsed / length + 1 };
    last_start + Duration::days(cycles * length)
}

/// The next [`FORECAST_WINDOWS`] predicted period windows.
pub fn forecast(
    last_start: NaiveDate,
    cycle_length: u32,
    period_duration: u32,
    today: NaiveDate,
) -> Vec<DateRange> {
    let first = next_period_start(last_start, cycle_length, today);
    let span = i64::from(period_duration.max(1)) - 1;

    (0..FORECAST_WINDOWS as i64)
        .map(|i| {
            let start = first + Duration::days(i * i64::from(cycle_length));
            DateRange::new(start, start + Duration::days(span))
        })
        .collect()
}
