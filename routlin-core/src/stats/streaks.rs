use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Entries, UserData};

/// A run of consecutive days ending today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub tag_id: String,
    pub count: u32,
}

/// Active streaks for every tag, longest first.
///
/// Tags missing from today's entry have no streak and are left out. Ties keep
/// the order the tags were created in.
pub fn calculate_streaks(data: &UserData, today: NaiveDate) -> Vec<Streak> {
    let mut streaks: Vec<Streak> = data
        .tags
        .iter()
        .filter_map(|tag| {
            let count = streak_length(&data.entries, &tag.id, today);
            (count > 0).then(|| Streak {
                tag_id: tag.id.clone(),
                count,
            })
        })
        .collect();

    // sort_by is stable
    streaks.sort_by(|a, b| b.count.cmp(&a.count));
    streaks
}

/// Consecutive days ending at `today` that carry `tag_id`.
///
/// The walk never goes past the earliest recorded day.
pub fn streak_length(entries: &Entries, tag_id: &str, today: NaiveDate) -> u32 {
    let Some(earliest) = entries.earliest() else {
        return 0;
    };

    let mut count = 0;
    let mut day = today;
    while day >= earliest && entries.has_tag(day, tag_id) {
        count += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    count
}
