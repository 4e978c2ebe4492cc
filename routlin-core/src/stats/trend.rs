use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::models::UserData;

/// Number of days in the rolling trend window.
pub const TREND_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendTag {
    pub color: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// "Today" for the last point, otherwise the short weekday name.
    pub label: String,
    pub count: usize,
    pub tags: Vec<TrendTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendSeries {
    pub points: Vec<TrendPoint>,
}

/// Tag counts for the seven days ending `today`, oldest first.
///
/// Returns `None` when no day in the window has any activity.
pub fn build_trend(data: &UserData, today: NaiveDate) -> Option<TrendSeries> {
    let points: Vec<TrendPoint> = (0..TREND_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let ids = data.entries.tags_on(date);
            let tags = ids
                .iter()
                .filter_map(|id| data.tag(id))
                .map(|tag| TrendTag {
                    color: tag.color.clone(),
                    name: tag.name.clone(),
                })
                .collect();
            let label = if offset == 0 {
                "Today".to_string()
            } else {
                date.format("%a").to_string()
            };

            TrendPoint {
                date,
                label,
                count: ids.len(),
                tags,
            }
        })
        .collect();

    if points.iter().all(|p| p.count == 0) {
        return None;
    }
    Some(TrendSeries { points })
}
