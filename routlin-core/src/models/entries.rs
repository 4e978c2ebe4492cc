//! Date-keyed calendar entries.
//!
//! A day is present only while it has at least one tag, so "no entry" and
//! "no activity" mean the same thing.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::date_range::DateRange;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Entries(BTreeMap<NaiveDate, Vec<String>>);

// Loaded data may carry empty days; they are dropped on the way in.
impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<NaiveDate, Vec<String>>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

impl Entries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag IDs recorded on `date`, in the order they were selected.
    pub fn tags_on(&self, date: NaiveDate) -> &[String] {
        self.0.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_tag(&self, date: NaiveDate, tag_id: &str) -> bool {
        self.tags_on(date).iter().any(|id| id == tag_id)
    }

    /// Replaces the tags for `date`. An empty selection removes the day.
    pub fn set(&mut self, date: NaiveDate, tag_ids: Vec<String>) {
        let mut unique: Vec<String> = Vec::with_capacity(tag_ids.len());
        for id in tag_ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        if unique.is_empty() {
            self.0.remove(&date);
        } else {
            self.0.insert(date, unique);
        }
    }

    /// Removes a tag from every day, dropping days left empty.
    ///
    /// Returns the number of days that referenced the tag.
    pub fn remove_tag(&mut self, tag_id: &str) -> usize {
        let mut touched = 0;
        self.0.retain(|_, ids| {
            let before = ids.len();
            ids.retain(|id| id != tag_id);
            if ids.len() != before {
                touched += 1;
            }
            !ids.is_empty()
        });
        touched
    }

    /// Days in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[String])> {
        self.0.iter().map(|(date, ids)| (*date, ids.as_slice()))
    }

    /// Days inside `range`, ascending. An inverted range yields nothing.
    pub fn in_range(&self, range: DateRange) -> impl Iterator<Item = (NaiveDate, &[String])> {
        self.0
            .range(range.start..=range.end.max(range.start))
            .filter(move |(date, _)| **date <= range.end)
            .map(|(date, ids)| (*date, ids.as_slice()))
    }

    /// Number of days a tag was used on.
    pub fn usage_count(&self, tag_id: &str) -> usize {
        self.0
            .values()
            .filter(|ids| ids.iter().any(|id| id == tag_id))
            .count()
    }

    pub fn earliest(&self) -> Option<NaiveDate> {
        self.0.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(NaiveDate, Vec<String>)> for Entries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, Vec<String>)>>(iter: I) -> Self {
        let mut entries = Entries::new();
        for (date, ids) in iter {
            entries.set(date, ids);
        }
        entries
    }
}
