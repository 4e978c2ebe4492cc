//! The per-user record and its validated mutations.
//!
//! All checks run before anything is changed, so a rejected call leaves the
//! record exactly as it was.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{palette_color, Entries, Goal, GoalPeriod, HealthProfile, Tag, PALETTE};
use crate::error::{TrackerError, TrackerResult};

/// Everything the tracker knows about one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub entries: Entries,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub health: Option<HealthProfile>,
}

impl UserData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(&self, tag_id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == tag_id)
    }

    /// Finds a tag by ID, or by case-insensitive name.
    pub fn find_tag(&self, id_or_name: &str) -> Option<&Tag> {
        self.tag(id_or_name)
            .or_else(|| self.tags.iter().find(|t| t.has_name(id_or_name)))
    }

    /// The first palette color no tag is using.
    pub fn next_available_color(&self) -> Option<&'static str> {
        PALETTE
            .iter()
            .copied()
            .find(|c| !self.tags.iter().any(|t| t.has_color(c)))
    }

    /// Creates a tag. Without a color, the first free palette color is used.
    pub fn add_tag(&mut self, name: &str, color: Option<&str>) -> TrackerResult<&Tag> {
        let name = self.check_tag_name(name, None)?;
        let color = match color {
            Some(c) => self.check_tag_color(c, None)?,
            None => self
                .next_available_color()
                .ok_or(TrackerError::PaletteExhausted)?,
        };

        let tag = Tag::new(name, color);
        tracing::debug!(tag_id = %tag.id, name = %tag.name, "added tag");
        self.tags.push(tag);
        Ok(&self.tags[self.tags.len() - 1])
    }

    /// Renames and/or recolors a tag.
    pub fn edit_tag(
        &mut self,
        tag_id: &str,
        name: Option<&str>,
        color: Option<&str>,
    ) -> TrackerResult<&Tag> {
        let index = self
            .tags
            .iter()
            .position(|t| t.id == tag_id)
            .ok_or_else(|| TrackerError::TagNotFound(tag_id.to_string()))?;

        let name = name
            .map(|n| self.check_tag_name(n, Some(tag_id)))
            .transpose()?;
        let color = color
            .map(|c| self.check_tag_color(c, Some(tag_id)))
            .transpose()?;

        let tag = &mut self.tags[index];
        if let Some(name) = name {
            tag.name = name;
        }
        if let Some(color) = color {
            tag.color = color.to_string();
        }
        tracing::debug!(tag_id = %tag.id, "edited tag");
        Ok(&self.tags[index])
    }

    /// Deletes a tag and every reference to it.
    pub fn delete_tag(&mut self, tag_id: &str) -> TrackerResult<Tag> {
        let index = self
            .tags
            .iter()
            .position(|t| t.id == tag_id)
            .ok_or_else(|| TrackerError::TagNotFound(tag_id.to_string()))?;

        let tag = self.tags.remove(index);
        let days = self.entries.remove_tag(tag_id);
        let goals_before = self.goals.len();
        self.goals.retain(|g| g.tag_id != tag_id);

        tracing::debug!(
            tag_id = %tag.id,
            days,
            goals = goals_before - self.goals.len(),
            "deleted tag"
        );
        Ok(tag)
    }

    /// Replaces the tags recorded on `date`. An empty list clears the day.
    pub fn set_day(&mut self, date: NaiveDate, tag_ids: Vec<String>) -> TrackerResult<()> {
        if let Some(missing) = tag_ids.iter().find(|id| self.tag(id).is_none()) {
            return Err(TrackerError::TagNotFound(missing.clone()));
        }
        self.entries.set(date, tag_ids);
        Ok(())
    }

    /// Creates a goal, or updates the target of the existing goal for the
    /// same tag and period.
    pub fn save_goal(
        &mut self,
        tag_id: &str,
        target_count: i64,
        period: GoalPeriod,
    ) -> TrackerResult<&Goal> {
        if self.tag(tag_id).is_none() {
            return Err(TrackerError::TagNotFound(tag_id.to_string()));
        }
        let target = u32::try_from(target_count)
            .ok()
            .filter(|t| *t >= 1)
            .ok_or(TrackerError::InvalidTarget(target_count))?;

        let index = match self
            .goals
            .iter()
            .position(|g| g.tag_id == tag_id && g.period == period)
        {
            Some(index) => {
                self.goals[index].target_count = target;
                index
            }
            None => {
                self.goals.push(Goal::new(tag_id, target, period));
                self.goals.len() - 1
            }
        };
        tracing::debug!(
            goal_id = %self.goals[index].id,
            target_count = target,
            %period,
            "saved goal"
        );
        Ok(&self.goals[index])
    }

    pub fn delete_goal(&mut self, goal_id: &str) -> TrackerResult<Goal> {
        let index = self
            .goals
            .iter()
            .position(|g| g.id == goal_id)
            .ok_or_else(|| TrackerError::GoalNotFound(goal_id.to_string()))?;
        Ok(self.goals.remove(index))
    }

    /// The health profile, created with default settings on first access.
    pub fn health_mut(&mut self) -> &mut HealthProfile {
        self.health.get_or_insert_with(HealthProfile::default)
    }

    fn check_tag_name(&self, name: &str, exclude: Option<&str>) -> TrackerResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::EmptyTagName);
        }
        if self
            .tags
            .iter()
            .any(|t| Some(t.id.as_str()) != exclude && t.has_name(name))
        {
            return Err(TrackerError::DuplicateTagName(name.to_string()));
        }
        Ok(name.to_string())
    }

    fn check_tag_color(&self, color: &str, exclude: Option<&str>) -> TrackerResult<&'static str> {
        let color =
            palette_color(color).ok_or_else(|| TrackerError::UnknownColor(color.to_string()))?;
        if self
            .tags
            .iter()
            .any(|t| Some(t.id.as_str()) != exclude && t.has_color(color))
        {
            return Err(TrackerError::DuplicateColor(color.to_string()));
        }
        Ok(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn data_with_tags(names: &[&str]) -> (UserData, Vec<String>) {
        let mut data = UserData::new();
        let ids = names
            .iter()
            .map(|n| data.add_tag(n, None).unwrap().id.clone())
            .collect();
        (data, ids)
    }

    #[test]
    fn test_add_tag_picks_first_free_color() {
        let mut data = UserData::new();
        data.add_tag("Run", Some("#2196F3")).unwrap();
        let tag = data.add_tag("Read", None).unwrap();
        assert_eq!(tag.color, "#FF5252");
        let tag = data.add_tag("Cook", None).unwrap();
        assert_eq!(tag.color, "#FFD740");
    }

    #[test]
    fn test_add_tag_rejects_duplicates() {
        let mut data = UserData::new();
        data.add_tag("Run", Some("#FF5252")).unwrap();

        assert_eq!(
            data.add_tag(" run ", None).unwrap_err(),
            TrackerError::DuplicateTagName("run".to_string())
        );
        assert_eq!(
            data.add_tag("Swim", Some("#ff5252")).unwrap_err(),
            TrackerError::DuplicateColor("#FF5252".to_string())
        );
        assert_eq!(
            data.add_tag("Swim", Some("#000000")).unwrap_err(),
            TrackerError::UnknownColor("#000000".to_string())
        );
        assert_eq!(data.add_tag("   ", None).unwrap_err(), TrackerError::EmptyTagName);
        assert_eq!(data.tags.len(), 1);
    }

    #[test]
    fn test_palette_limits_tag_count() {
        let mut data = UserData::new();
        for i in 0..PALETTE.len() {
            data.add_tag(&format!("Tag {}", i), None).unwrap();
        }
        assert_eq!(data.next_available_color(), None);
        assert_eq!(
            data.add_tag("One more", None).unwrap_err(),
            TrackerError::PaletteExhausted
        );
    }

    #[test]
    fn test_edit_tag_allows_own_name_and_color() {
        let (mut data, ids) = data_with_tags(&["Run", "Read"]);

        let tag = data.edit_tag(&ids[0], Some("RUN"), Some("#ff5252")).unwrap();
        assert_eq!(tag.name, "RUN");
        assert_eq!(tag.color, "#FF5252");

        assert_eq!(
            data.edit_tag(&ids[0], Some("read"), None).unwrap_err(),
            TrackerError::DuplicateTagName("read".to_string())
        );
        assert_eq!(
            data.edit_tag(&ids[0], None, Some("#2196F3")).unwrap_err(),
            TrackerError::DuplicateColor("#2196F3".to_string())
        );
        assert!(matches!(
            data.edit_tag("missing", Some("x"), None),
            Err(TrackerError::TagNotFound(_))
        ));
    }

    #[test]
    fn test_edit_tag_failure_leaves_name_untouched() {
        let (mut data, ids) = data_with_tags(&["Run", "Read"]);
        data.edit_tag(&ids[0], Some("Jog"), Some("#nope")).unwrap_err();
        assert_eq!(data.tags[0].name, "Run");
    }

    #[test]
    fn test_delete_tag_cascades() {
        let (mut data, ids) = data_with_tags(&["Run", "Read"]);
        data.set_day(date(2024, 1, 1), vec![ids[0].clone()]).unwrap();
        data.set_day(date(2024, 1, 2), vec![ids[0].clone(), ids[1].clone()])
            .unwrap();
        data.save_goal(&ids[0], 3, GoalPeriod::Week).unwrap();
        data.save_goal(&ids[1], 3, GoalPeriod::Week).unwrap();

        let removed = data.delete_tag(&ids[0]).unwrap();
        assert_eq!(removed.name, "Run");
        assert_eq!(data.tags.len(), 1);
        assert_eq!(data.entries.len(), 1);
        assert_eq!(data.entries.tags_on(date(2024, 1, 2)), &[ids[1].clone()][..]);
        assert_eq!(data.goals.len(), 1);
        assert_eq!(data.goals[0].tag_id, ids[1]);
    }

    #[test]
    fn test_set_day_rejects_unknown_tag() {
        let (mut data, ids) = data_with_tags(&["Run"]);
        let err = data
            .set_day(date(2024, 1, 1), vec![ids[0].clone(), "ghost".to_string()])
            .unwrap_err();
        assert_eq!(err, TrackerError::TagNotFound("ghost".to_string()));
        assert!(data.entries.is_empty());
    }

    #[test]
    fn test_save_goal_upserts_per_tag_and_period() {
        let (mut data, ids) = data_with_tags(&["Run"]);
        let first_id = data.save_goal(&ids[0], 3, GoalPeriod::Week).unwrap().id.clone();
        let goal = data.save_goal(&ids[0], 5, GoalPeriod::Week).unwrap();
        assert_eq!(goal.id, first_id);
        assert_eq!(goal.target_count, 5);

        data.save_goal(&ids[0], 20, GoalPeriod::Month).unwrap();
        assert_eq!(data.goals.len(), 2);
    }

    #[test]
    fn test_save_goal_validation() {
        let (mut data, ids) = data_with_tags(&["Run"]);
        assert_eq!(
            data.save_goal(&ids[0], 0, GoalPeriod::Week).unwrap_err(),
            TrackerError::InvalidTarget(0)
        );
        assert_eq!(
            data.save_goal(&ids[0], -2, GoalPeriod::Week).unwrap_err(),
            TrackerError::InvalidTarget(-2)
        );
        assert!(matches!(
            data.save_goal("ghost", 1, GoalPeriod::Week),
            Err(TrackerError::TagNotFound(_))
        ));
        assert!(data.goals.is_empty());
    }

    #[test]
    fn test_delete_goal() {
        let (mut data, ids) = data_with_tags(&["Run"]);
        let goal_id = data.save_goal(&ids[0], 3, GoalPeriod::Year).unwrap().id.clone();
        assert!(data.delete_goal("nope").is_err());
        data.delete_goal(&goal_id).unwrap();
        assert!(data.goals.is_empty());
    }

    #[test]
    fn test_find_tag_by_id_or_name() {
        let (data, ids) = data_with_tags(&["Run"]);
        assert_eq!(data.find_tag(&ids[0]).unwrap().name, "Run");
        assert_eq!(data.find_tag("run").unwrap().id, ids[0]);
        assert!(data.find_tag("walk").is_none());
    }

    #[test]
    fn test_health_is_created_lazily() {
        let mut data = UserData::new();
        assert!(data.health.is_none());
        assert_eq!(data.health_mut().avg_cycle_length, 28);
        assert!(data.health.is_some());
    }

    #[test]
    fn test_json_round_trip() {
        let json = r##"{
            "tags": [{"id": "t1", "name": "Run", "color": "#FF5252"}],
            "entries": {"2024-01-01": ["t1"], "2024-01-02": ["t1"]},
            "goals": [{"id": "g1", "tagId": "t1", "targetCount": 3, "period": "week"}],
            "health": {
                "avgCycleLength": 28,
                "avgPeriodDuration": 5,
                "lastPeriodStart": "2024-01-01",
                "entries": [{
                    "id": "p1",
                    "startDate": "2024-01-01",
                    "endDate": "2024-01-05",
                    "duration": 5,
                    "cycleLength": null
                }]
            }
        }"##;

        let data: UserData = serde_json::from_str(json).unwrap();
        assert_eq!(data.tags[0].name, "Run");
        assert_eq!(data.entries.len(), 2);
        assert_eq!(data.goals[0].period, GoalPeriod::Week);

        let saved = serde_json::to_string(&data).unwrap();
        let reloaded: UserData = serde_json::from_str(&saved).unwrap();
        assert_eq!(reloaded, data);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let data: UserData = serde_json::from_str(r#"{"health": null}"#).unwrap();
        assert_eq!(data, UserData::new());
    }
}
