//! Derived statistics over a user's calendar.
//!
//! Everything here is read-only and takes `today` from the caller.

mod goals;
mod streaks;
mod trend;
mod usage;

pub use goals::{goal_progress, progress_percent, GoalProgress};
pub use streaks::{calculate_streaks, streak_length, Streak};
pub use trend::{build_trend, TrendPoint, TrendSeries, TrendTag, TREND_DAYS};
pub use usage::{ChartSeries, TagUsage, UsageReport};
