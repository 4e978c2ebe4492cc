//! Tag usage over a date range.
//!
//! A single [`UsageReport`] backs both the detail view and the chart, so the
//! two can never disagree on ordering.

use serde::Serialize;

use crate::date_range::DateRange;
use crate::models::{Tag, UserData};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagUsage {
    pub tag_id: String,
    pub name: String,
    pub color: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub range: DateRange,
    /// Tags used at least once, in the order they were first seen.
    pub used: Vec<TagUsage>,
    pub unused: Vec<Tag>,
}

/// Parallel arrays ready for a pie or bar chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<u32>,
    pub colors: Vec<String>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl UsageReport {
    pub fn compute(data: &UserData, range: DateRange) -> Self {
        let mut used: Vec<TagUsage> = Vec::new();

        for (_, ids) in data.entries.in_range(range) {
            for id in ids {
                if let Some(row) = used.iter_mut().find(|row| row.tag_id == *id) {
                    row.count += 1;
                    continue;
                }
                // Ids with no live tag are not reported.
                if let Some(tag) = data.tag(id) {
                    used.push(TagUsage {
                        tag_id: tag.id.clone(),
                        name: tag.name.clone(),
                        color: tag.color.clone(),
                        count: 1,
                    });
                }
            }
        }

        let unused = data
            .tags
            .iter()
            .filter(|tag| !used.iter().any(|row| row.tag_id == tag.id))
            .cloned()
            .collect();

        Self {
            range,
            used,
            unused,
        }
    }

    pub fn has_activity(&self) -> bool {
        !self.used.is_empty()
    }

    /// Highest count; the first tag seen wins ties.
    pub fn most_used(&self) -> Option<&TagUsage> {
        // max_by_key keeps the last maximum, so walk backwards.
        self.used.iter().rev().max_by_key(|row| row.count)
    }

    /// Lowest count; the first tag seen wins ties.
    ///
    /// `None` when it would name the same tag as [`most_used`](Self::most_used).
    pub fn least_used(&self) -> Option<&TagUsage> {
        let least = self.used.iter().min_by_key(|row| row.count)?;
        match self.most_used() {
            Some(most) if most.tag_id == least.tag_id => None,
            _ => Some(least),
        }
    }

    pub fn chart(&self) -> ChartSeries {
        let mut series = ChartSeries::default();
        for row in &self.used {
            series.labels.push(format!("{} ({})", row.name, row.count));
            series.values.push(row.count);
            series.colors.push(row.color.clone());
        }
        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_range::Period;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> UserData {
        let mut data = UserData::new();
        data.tags.push(Tag::new("Run", "#FF5252").with_id("run"));
        data.tags.push(Tag::new("Read", "#2196F3").with_id("read"));
        data.tags.push(Tag::new("Yoga", "#69F0AE").with_id("yoga"));
        data.tags.push(Tag::new("Swim", "#FFD740").with_id("swim"));

        data.entries.set(date(2024, 2, 28), vec!["swim".into()]);
        data.entries
            .set(date(2024, 3, 1), vec!["read".into(), "run".into()]);
        data.entries.set(date(2024, 3, 2), vec!["run".into()]);
        data.entries
            .set(date(2024, 3, 3), vec!["yoga".into(), "run".into()]);
        data.entries.set(date(2024, 3, 4), vec!["read".into()]);
        data
    }

    #[test]
    fn test_usage_counts_and_order() {
        let data = sample();
        let report = UsageReport::compute(&data, Period::Monthly.range(date(2024, 3, 15)));

        let rows: Vec<(&str, u32)> = report
            .used
            .iter()
            .map(|r| (r.tag_id.as_str(), r.count))
            .collect();
        assert_eq!(rows, vec![("read", 2), ("run", 3), ("yoga", 1)]);

        assert_eq!(report.most_used().unwrap().tag_id, "run");
        assert_eq!(report.least_used().unwrap().tag_id, "yoga");
        let unused: Vec<&str> = report.unused.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(unused, vec!["Swim"]);
    }

    #[test]
    fn test_ties_go_to_first_seen() {
        let mut data = sample();
        data.entries.set(date(2024, 3, 5), vec!["read".into(), "yoga".into()]);
        let report = UsageReport::compute(&data, Period::Monthly.range(date(2024, 3, 15)));

        // read 3, run 3, yoga 2
        assert_eq!(report.most_used().unwrap().tag_id, "read");
        assert_eq!(report.least_used().unwrap().tag_id, "yoga");
    }

    #[test]
    fn test_least_used_suppressed_for_single_tag() {
        let data = sample();
        let range = DateRange::new(date(2024, 3, 2), date(2024, 3, 2));
        let report = UsageReport::compute(&data, range);

        assert_eq!(report.most_used().unwrap().tag_id, "run");
        assert!(report.least_used().is_none());
    }

    #[test]
    fn test_empty_range_reports_everything_unused() {
        let data = sample();
        let range = Period::Daily.range(date(2025, 1, 1));
        let report = UsageReport::compute(&data, range);

        assert!(!report.has_activity());
        assert!(report.most_used().is_none());
        assert!(report.least_used().is_none());
        assert_eq!(report.unused.len(), data.tags.len());
        assert!(report.chart().is_empty());
    }

    #[test]
    fn test_chart_series_parallel_arrays() {
        let data = sample();
        let report = UsageReport::compute(&data, Period::Monthly.range(date(2024, 3, 15)));
        let chart = report.chart();

        assert_eq!(chart.labels, vec!["Read (2)", "Run (3)", "Yoga (1)"]);
        assert_eq!(chart.values, vec![2, 3, 1]);
        assert_eq!(chart.colors, vec!["#2196F3", "#FF5252", "#69F0AE"]);
    }

    #[test]
    fn test_dangling_ids_are_ignored() {
        let mut data = sample();
        data.entries.set(date(2024, 3, 6), vec!["ghost".into()]);
        let report = UsageReport::compute(&data, Period::Monthly.range(date(2024, 3, 15)));
        assert!(report.used.iter().all(|r| r.tag_id != "ghost"));
    }
}
