use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The fixed tag palette. Every tag owns one of these colors exclusively.
pub const PALETTE: [&str; 10] = [
    "#FF5252", // Red
    "#2196F3", // Blue
    "#FFD740", // Amber
    "#00BCD4", // Cyan
    "#7C4DFF", // Deep purple
    "#FFAB40", // Orange
    "#69F0AE", // Green
    "#8D6E63", // Brown
    "#78909C", // Blue grey
    "#F50057", // Pink
];

/// Returns the canonical palette spelling of `color`, if it is a palette color.
pub fn palette_color(color: &str) -> Option<&'static str> {
    let color = color.trim();
    PALETTE
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(color))
}

/// A user-defined activity label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            color: color.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    pub fn has_color(&self, color: &str) -> bool {
        self.color.eq_ignore_ascii_case(color.trim())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.color)
    }
}
