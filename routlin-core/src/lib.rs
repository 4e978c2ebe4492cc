//! Routlin Core Library
//!
//! Data model, statistics and cycle predictions for the Routlin habit
//! tracker, plus the client side of its sync API. Every time-dependent
//! function takes `today` as an argument.

pub mod date_range;
pub mod error;
pub mod health;
pub mod models;
pub mod stats;
pub mod sync;

pub use date_range::{parse_date, DateRange, Period, DATE_FORMAT};
pub use error::{TrackerError, TrackerResult};
pub use health::{CycleStatus, PeriodDays, DEFAULT_HISTORY_LIMIT};
pub use models::{
    palette_color, Entries, Goal, GoalPeriod, HealthProfile, PeriodEntry, Tag, UserData, PALETTE,
};
pub use stats::{
    build_trend, calculate_streaks, goal_progress, ChartSeries, GoalProgress, Streak, TagUsage,
    TrendSeries, UsageReport,
};
pub use sync::{check_server, ApiClient, SyncError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
