use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::date_range::Period;

/// Period a goal is measured over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPeriod {
    Week,
    Month,
    Year,
}

impl GoalPeriod {
    /// The statistics period with the same bounds.
    pub fn period(self) -> Period {
        match self {
            GoalPeriod::Week => Period::Weekly,
            GoalPeriod::Month => Period::Monthly,
            GoalPeriod::Year => Period::Yearly,
        }
    }

    /// Human label for the current window, e.g. "This Week".
    pub fn label(self) -> &'static str {
        match self {
            GoalPeriod::Week => "This Week",
            GoalPeriod::Month => "This Month",
            GoalPeriod::Year => "This Year",
        }
    }
}

impl fmt::Display for GoalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalPeriod::Week => write!(f, "week"),
            GoalPeriod::Month => write!(f, "month"),
            GoalPeriod::Year => write!(f, "year"),
        }
    }
}

impl FromStr for GoalPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "week" => Ok(GoalPeriod::Week),
            "month" => Ok(GoalPeriod::Month),
            "year" => Ok(GoalPeriod::Year),
            _ => Err(format!(
                "Invalid goal period '{}'. Valid options: week, month, year",
                s
            )),
        }
    }
}

/// A target number of tagged days per period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub tag_id: String,
    pub target_count: u32,
    pub period: GoalPeriod,
}

impl Goal {
    pub fn new(tag_id: impl Into<String>, target_count: u32, period: GoalPeriod) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tag_id: tag_id.into(),
            target_count,
            period,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}
