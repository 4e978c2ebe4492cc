//! Cycle tracking: period log mutations and predictions.
//!
//! A profile counts as set up once it has a last period start and at least
//! one logged entry. Settings survive deleting every entry, so the next
//! setup starts from the user's last known averages.

mod cycle;

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

pub use cycle::{current_cycle_day, forecast, next_period_start, CycleStatus, FORECAST_WINDOWS};

use crate::date_range::DateRange;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{
    HealthProfile, PeriodEntry, MAX_CYCLE_LENGTH, MAX_PERIOD_DURATION, MIN_CYCLE_LENGTH,
    MIN_PERIOD_DURATION,
};

/// How many entries the history view shows by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 6;

/// Minimum entries before the average cycle length is recalculated.
const RECALC_MIN_ENTRIES: usize = 3;
/// Minimum known cycle lengths before the average is recalculated.
const RECALC_MIN_CYCLES: usize = 2;

pub fn validate_cycle_length(days: u32) -> TrackerResult<u32> {
    if (MIN_CYCLE_LENGTH..=MAX_CYCLE_LENGTH).contains(&days) {
        Ok(days)
    } else {
        Err(TrackerError::CycleLengthOutOfRange(days))
    }
}

pub fn validate_period_duration(days: u32) -> TrackerResult<u32> {
    if (MIN_PERIOD_DURATION..=MAX_PERIOD_DURATION).contains(&days) {
        Ok(days)
    } else {
        Err(TrackerError::PeriodDurationOutOfRange(days))
    }
}

/// Calendar days to mark: logged periods and forecast windows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeriodDays {
    pub confirmed: BTreeSet<NaiveDate>,
    pub predicted: BTreeSet<NaiveDate>,
}

impl HealthProfile {
    pub fn is_set_up(&self) -> bool {
        self.last_period_start.is_some() && !self.entries.is_empty()
    }

    /// Starts tracking from a known last period, replacing any previous log.
    pub fn setup(
        &mut self,
        last_period_start: NaiveDate,
        cycle_length: u32,
        period_duration: u32,
    ) -> TrackerResult<&PeriodEntry> {
        let cycle_length = validate_cycle_length(cycle_length)?;
        let period_duration = validate_period_duration(period_duration)?;

        self.avg_cycle_length = cycle_length;
        self.avg_period_duration = period_duration;
        self.last_period_start = Some(last_period_start);
        self.entries = vec![PeriodEntry::new(last_period_start, period_duration, None)];

        tracing::debug!(%last_period_start, cycle_length, period_duration, "health set up");
        Ok(&self.entries[0])
    }

    /// Logs a period starting on `start`.
    ///
    /// Once there are enough entries, the average cycle length becomes the
    /// rounded mean of every known cycle length.
    pub fn log_period(&mut self, start: NaiveDate) -> TrackerResult<&PeriodEntry> {
        let last = self.last_period_start.ok_or(TrackerError::HealthNotSetUp)?;
        if start <= last {
            return Err(TrackerError::PeriodStartNotAfterLast { start, last });
        }

        let cycle_length = (start - last).num_days();
        self.entries.push(PeriodEntry::new(
            start,
            self.avg_period_duration,
            Some(cycle_length),
        ));
        self.last_period_start = Some(start);

        if self.entries.len() >= RECALC_MIN_ENTRIES {
            if let Some(avg) = self.mean_cycle_length() {
                tracing::debug!(
                    previous = self.avg_cycle_length,
                    recalculated = avg,
                    "average cycle length updated"
                );
                self.avg_cycle_length = avg;
            }
        }

        let index = self.entries.len() - 1;
        Ok(&self.entries[index])
    }

    /// Changes the dates of a logged period.
    pub fn edit_entry(
        &mut self,
        entry_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> TrackerResult<&PeriodEntry> {
        if end < start {
            return Err(TrackerError::EndBeforeStart { start, end });
        }
        let index = self
            .entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or_else(|| TrackerError::PeriodEntryNotFound(entry_id.to_string()))?;

        let entry = &mut self.entries[index];
        entry.start_date = start;
        entry.end_date = end;
        entry.duration = (end - start).num_days() + 1;

        let is_most_recent = self.entries.iter().all(|e| e.start_date <= start);
        if is_most_recent {
            self.last_period_start = Some(start);
        }

        Ok(&self.entries[index])
    }

    /// Removes a logged period and moves the last start to the newest
    /// remaining entry.
    pub fn delete_entry(&mut self, entry_id: &str) -> TrackerResult<PeriodEntry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or_else(|| TrackerError::PeriodEntryNotFound(entry_id.to_string()))?;

        let removed = self.entries.remove(index);
        self.last_period_start = self.entries.iter().map(|e| e.start_date).max();
        tracing::debug!(entry_id, remaining = self.entries.len(), "deleted period entry");
        Ok(removed)
    }

    pub fn update_settings(&mut self, cycle_length: u32, period_duration: u32) -> TrackerResult<()> {
        let cycle_length = validate_cycle_length(cycle_length)?;
        let period_duration = validate_period_duration(period_duration)?;
        self.avg_cycle_length = cycle_length;
        self.avg_period_duration = period_duration;
        Ok(())
    }

    /// Current cycle position, or `None` until tracking is set up.
    pub fn status(&self, today: NaiveDate) -> Option<CycleStatus> {
        if !self.is_set_up() {
            return None;
        }
        let last = self.last_period_start?;
        Some(CycleStatus::compute(last, self.avg_cycle_length, today))
    }

    pub fn predictions(&self, today: NaiveDate) -> Vec<DateRange> {
        match self.last_period_start {
            Some(last) => forecast(
                last,
                self.avg_cycle_length,
                self.avg_period_duration,
                today,
            ),
            None => Vec::new(),
        }
    }

    pub fn period_days(&self, today: NaiveDate) -> PeriodDays {
        let confirmed = self
            .entries
            .iter()
            .flat_map(|e| DateRange::new(e.start_date, e.end_date).iter_days())
            .collect();
        let predicted = self
            .predictions(today)
            .into_iter()
            .flat_map(DateRange::iter_days)
            .collect();
        PeriodDays {
            confirmed,
            predicted,
        }
    }

    /// Entries newest first.
    pub fn recent_history(&self, limit: usize) -> Vec<&PeriodEntry> {
        let mut entries: Vec<&PeriodEntry> = self.entries.iter().collect();
        entries.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        entries.truncate(limit);
        entries
    }

    fn mean_cycle_length(&self) -> Option<u32> {
        let lengths: Vec<i64> = self
            .entries
            .iter()
            .filter_map(|e| e.cycle_length)
            .filter(|len| *len > 0)
            .collect();
        if lengths.len() < RECALC_MIN_CYCLES {
            return None;
        }

        let sum: i64 = lengths.iter().sum();
        let count = lengths.len() as i64;
        // Round half up.
        let mean = (2 * sum + count) / (2 * count);
        let clamped = mean.clamp(i64::from(MIN_CYCLE_LENGTH), i64::from(MAX_CYCLE_LENGTH));
        u32::try_from(clamped).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn set_up_profile(start: NaiveDate) -> HealthProfile {
        let mut profile = HealthProfile::default();
        profile.setup(start, 28, 5).unwrap();
        profile
    }

    #[test]
    fn test_setup_creates_first_entry() {
        let mut profile = HealthProfile::default();
        assert!(!profile.is_set_up());

        let entry = profile.setup(date(2024, 1, 1), 30, 4).unwrap().clone();
        assert_eq!(entry.start_date, date(2024, 1, 1));
        assert_eq!(entry.end_date, date(2024, 1, 4));
        assert_eq!(entry.duration, 4);
        assert_eq!(entry.cycle_length, None);

        assert!(profile.is_set_up());
        assert_eq!(profile.avg_cycle_length, 30);
        assert_eq!(profile.avg_period_duration, 4);
        assert_eq!(profile.last_period_start, Some(date(2024, 1, 1)));
    }

    #[test]
    fn test_setup_validation_leaves_profile_untouched() {
        let mut profile = HealthProfile::default();
        assert_eq!(
            profile.setup(date(2024, 1, 1), 20, 5).unwrap_err(),
            TrackerError::CycleLengthOutOfRange(20)
        );
        assert_eq!(
            profile.setup(date(2024, 1, 1), 46, 5).unwrap_err(),
            TrackerError::CycleLengthOutOfRange(46)
        );
        assert_eq!(
            profile.setup(date(2024, 1, 1), 28, 11).unwrap_err(),
            TrackerError::PeriodDurationOutOfRange(11)
        );
        assert_eq!(profile, HealthProfile::default());

        profile.setup(date(2024, 1, 1), 21, 3).unwrap();
        profile.setup(date(2024, 1, 1), 45, 10).unwrap();
    }

    #[test]
    fn test_log_period_records_cycle_length() {
        let mut profile = set_up_profile(date(2024, 1, 1));
        let entry = profile.log_period(date(2024, 1, 31)).unwrap().clone();

        assert_eq!(entry.cycle_length, Some(30));
        assert_eq!(entry.end_date, date(2024, 2, 4));
        assert_eq!(entry.duration, 5);
        assert_eq!(profile.last_period_start, Some(date(2024, 1, 31)));
        // Two entries are not enough to recalculate.
        assert_eq!(profile.avg_cycle_length, 28);
    }

    #[test]
    fn test_average_recalculated_after_third_entry() {
        let start = date(2024, 1, 1);
        let mut profile = set_up_profile(start);
        profile.log_period(start + Duration::days(30)).unwrap();
        profile.log_period(start + Duration::days(58)).unwrap();

        assert_eq!(profile.entries.len(), 3);
        assert_eq!(profile.avg_cycle_length, 29);
    }

    #[test]
    fn test_average_uses_every_cycle_uniformly() {
        let start = date(2024, 1, 1);
        let mut profile = set_up_profile(start);
        let mut day = 0;
        for len in [26, 27, 33, 30] {
            day += len;
            profile.log_period(start + Duration::days(day)).unwrap();
        }
        // (26 + 27 + 33 + 30) / 4 = 29
        assert_eq!(profile.avg_cycle_length, 29);

        day += 31;
        profile.log_period(start + Duration::days(day)).unwrap();
        // 147 / 5 = 29.4
        assert_eq!(profile.avg_cycle_length, 29);
    }

    #[test]
    fn test_average_rounds_half_up() {
        let start = date(2024, 1, 1);
        let mut profile = set_up_profile(start);
        profile.log_period(start + Duration::days(29)).unwrap();
        profile.log_period(start + Duration::days(29 + 30)).unwrap();
        assert_eq!(profile.avg_cycle_length, 30);
    }

    #[test]
    fn test_average_is_clamped_to_bounds() {
        let start = date(2024, 1, 1);
        let mut profile = set_up_profile(start);
        profile.log_period(start + Duration::days(10)).unwrap();
        profile.log_period(start + Duration::days(20)).unwrap();
        assert_eq!(profile.avg_cycle_length, MIN_CYCLE_LENGTH);
    }

    #[test]
    fn test_log_period_rejections() {
        let mut profile = HealthProfile::default();
        assert_eq!(
            profile.log_period(date(2024, 1, 1)).unwrap_err(),
            TrackerError::HealthNotSetUp
        );

        let mut profile = set_up_profile(date(2024, 1, 10));
        let before = profile.clone();
        assert_eq!(
            profile.log_period(date(2024, 1, 10)).unwrap_err(),
            TrackerError::PeriodStartNotAfterLast {
                start: date(2024, 1, 10),
                last: date(2024, 1, 10)
            }
        );
        assert!(profile.log_period(date(2024, 1, 2)).is_err());
        assert_eq!(profile, before);
    }

    #[test]
    fn test_edit_entry_recomputes_duration() {
        let mut profile = set_up_profile(date(2024, 1, 1));
        let first_id = profile.entries[0].id.clone();
        profile.log_period(date(2024, 1, 29)).unwrap();

        let entry = profile
            .edit_entry(&first_id, date(2024, 1, 2), date(2024, 1, 8))
            .unwrap();
        assert_eq!(entry.duration, 7);
        // Not the most recent entry, so the last start is unchanged.
        assert_eq!(profile.last_period_start, Some(date(2024, 1, 29)));
    }

    #[test]
    fn test_edit_most_recent_entry_moves_last_start() {
        let mut profile = set_up_profile(date(2024, 1, 1));
        let second_id = profile.log_period(date(2024, 1, 29)).unwrap().id.clone();

        profile
            .edit_entry(&second_id, date(2024, 1, 27), date(2024, 1, 31))
            .unwrap();
        assert_eq!(profile.last_period_start, Some(date(2024, 1, 27)));
    }

    #[test]
    fn test_edit_entry_rejections() {
        let mut profile = set_up_profile(date(2024, 1, 1));
        let id = profile.entries[0].id.clone();
        let before = profile.clone();

        assert_eq!(
            profile
                .edit_entry(&id, date(2024, 1, 5), date(2024, 1, 4))
                .unwrap_err(),
            TrackerError::EndBeforeStart {
                start: date(2024, 1, 5),
                end: date(2024, 1, 4)
            }
        );
        assert!(matches!(
            profile.edit_entry("missing", date(2024, 1, 1), date(2024, 1, 2)),
            Err(TrackerError::PeriodEntryNotFound(_))
        ));
        assert_eq!(profile, before);
    }

    #[test]
    fn test_delete_entry_resets_last_start() {
        let mut profile = set_up_profile(date(2024, 1, 1));
        let first_id = profile.entries[0].id.clone();
        let second_id = profile.log_period(date(2024, 1, 29)).unwrap().id.clone();

        profile.delete_entry(&second_id).unwrap();
        assert_eq!(profile.last_period_start, Some(date(2024, 1, 1)));

        profile.delete_entry(&first_id).unwrap();
        assert_eq!(profile.last_period_start, None);
        assert!(!profile.is_set_up());
        assert!(profile.status(date(2024, 2, 1)).is_none());
        // Settings persist.
        assert_eq!(profile.avg_cycle_length, 28);

        assert!(profile.delete_entry(&first_id).is_err());
    }

    #[test]
    fn test_update_settings() {
        let mut profile = HealthProfile::default();
        profile.update_settings(32, 6).unwrap();
        assert_eq!(profile.avg_cycle_length, 32);
        assert_eq!(profile.avg_period_duration, 6);

        assert!(profile.update_settings(32, 2).is_err());
        assert_eq!(profile.avg_period_duration, 6);
    }

    #[test]
    fn test_status_and_predictions() {
        let profile = set_up_profile(date(2024, 1, 1));
        let today = date(2024, 1, 20);

        let status = profile.status(today).unwrap();
        assert_eq!(status.current_day, 20);
        assert_eq!(status.next_period, date(2024, 1, 29));
        assert_eq!(status.days_until_next, 9);

        let predictions = profile.predictions(today);
        assert_eq!(predictions.len(), FORECAST_WINDOWS);
        assert_eq!(predictions[0].start, date(2024, 1, 29));

        assert!(HealthProfile::default().predictions(today).is_empty());
    }

    #[test]
    fn test_period_days() {
        let profile = set_up_profile(date(2024, 1, 1));
        let days = profile.period_days(date(2024, 1, 20));

        assert_eq!(days.confirmed.len(), 5);
        assert!(days.confirmed.contains(&date(2024, 1, 5)));
        assert_eq!(days.predicted.len(), 15);
        assert!(days.predicted.contains(&date(2024, 2, 2)));
        assert!(!days.predicted.contains(&date(2024, 2, 3)));
    }

    #[test]
    fn test_recent_history_newest_first() {
        let start = date(2024, 1, 1);
        let mut profile = set_up_profile(start);
        for i in 1..=7 {
            profile.log_period(start + Duration::days(28 * i)).unwrap();
        }

        let history = profile.recent_history(DEFAULT_HISTORY_LIMIT);
        assert_eq!(history.len(), 6);
        assert_eq!(history[0].start_date, start + Duration::days(28 * 7));
        assert!(history.windows(2).all(|w| w[0].start_date > w[1].start_date));
    }
}
