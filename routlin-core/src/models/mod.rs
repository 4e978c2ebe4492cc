mod entries;
mod goal;
mod health;
mod tag;
mod user_data;

pub use entries::Entries;
pub use goal::{Goal, GoalPeriod};
pub use health::{
    HealthProfile, PeriodEntry, DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_DURATION, MAX_CYCLE_LENGTH,
    MAX_PERIOD_DURATION, MIN_CYCLE_LENGTH, MIN_PERIOD_DURATION,
};
pub use tag::{palette_color, Tag, PALETTE};
pub use user_data::UserData;
