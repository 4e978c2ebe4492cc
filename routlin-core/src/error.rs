//! Validation errors raised by tracker mutations.
//!
//! Every error is returned before any state is touched, so a caller that
//! receives one can keep using the record it passed in.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{MAX_CYCLE_LENGTH, MAX_PERIOD_DURATION, MIN_CYCLE_LENGTH, MIN_PERIOD_DURATION};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("Invalid date '{0}'. Use YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Please enter a tag name")]
    EmptyTagName,

    #[error("Tag with name '{0}' already exists")]
    DuplicateTagName(String),

    #[error("Color {0} is not in the palette")]
    UnknownColor(String),

    #[error("Color {0} is already used by another tag")]
    DuplicateColor(String),

    #[error("All palette colors are in use, delete a tag first")]
    PaletteExhausted,

    #[error("Tag not found: {0}")]
    TagNotFound(String),

    #[error("Goal not found: {0}")]
    GoalNotFound(String),

    #[error("Goal target must be at least 1, got {0}")]
    InvalidTarget(i64),

    #[error(
        "Cycle length must be between {} and {} days, got {0}",
        MIN_CYCLE_LENGTH,
        MAX_CYCLE_LENGTH
    )]
    CycleLengthOutOfRange(u32),

    #[error(
        "Period duration must be between {} and {} days, got {0}",
        MIN_PERIOD_DURATION,
        MAX_PERIOD_DURATION
    )]
    PeriodDurationOutOfRange(u32),

    #[error("Health tracking is not set up yet")]
    HealthNotSetUp,

    #[error("Period start {start} must be after the last logged start {last}")]
    PeriodStartNotAfterLast { start: NaiveDate, last: NaiveDate },

    #[error("Period entry not found: {0}")]
    PeriodEntryNotFound(String),

    #[error("End date {end} cannot be before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

pub type TrackerResult<T> = Result<T, TrackerError>;
