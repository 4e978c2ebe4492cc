use chrono::NaiveDate;
use serde::Serialize;

use crate::date_range::DateRange;
use crate::models::{Entries, Goal, Tag, UserData};

/// How far a goal has come in its current period.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub goal: Goal,
    pub tag: Tag,
    pub range: DateRange,
    pub count: u32,
    /// Percentage, capped at 100.
    pub progress: f64,
    pub achieved: bool,
}

impl GoalProgress {
    pub fn compute(goal: &Goal, tag: &Tag, entries: &Entries, today: NaiveDate) -> Self {
        let range = goal.period.period().range(today);
        let count = entries
            .in_range(range)
            .filter(|(_, ids)| ids.iter().any(|id| *id == goal.tag_id))
            .count() as u32;

        Self {
            goal: goal.clone(),
            tag: tag.clone(),
            range,
            count,
            progress: progress_percent(count, goal.target_count),
            achieved: count >= goal.target_count,
        }
    }

    /// Days still needed, zero once achieved.
    pub fn remaining(&self) -> u32 {
        self.goal.target_count.saturating_sub(self.count)
    }
}

pub fn progress_percent(count: u32, target: u32) -> f64 {
    if target == 0 {
        return 100.0;
    }
    (f64::from(count) / f64::from(target) * 100.0).min(100.0)
}

/// Progress for every goal whose tag still exists, in goal order.
pub fn goal_progress(data: &UserData, today: NaiveDate) -> Vec<GoalProgress> {
    data.goals
        .iter()
        .filter_map(|goal| {
            let tag = data.tag(&goal.tag_id)?;
            Some(GoalProgress::compute(goal, tag, &data.entries, today))
        })
        .collect()
}
