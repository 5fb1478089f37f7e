//! Dashboard widget types

use crate::geometry::GridPosition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Free-form per-widget settings, validated by whichever widget reads them
pub type WidgetConfig = HashMap<String, serde_json::Value>;

/// Kind of content a widget shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetType {
    Calendar,
    Assignments,
    Habits,
    Notes,
    Pomodoro,
    Analytics,
    Flashcards,
}

impl WidgetType {
    pub const ALL: [WidgetType; 7] = [
        WidgetType::Calendar,
        WidgetType::Assignments,
        WidgetType::Habits,
        WidgetType::Notes,
        WidgetType::Pomodoro,
        WidgetType::Analytics,
        WidgetType::Flashcards,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetType::Calendar => "calendar",
            WidgetType::Assignments => "assignments",
            WidgetType::Habits => "habits",
            WidgetType::Notes => "notes",
            WidgetType::Pomodoro => "pomodoro",
            WidgetType::Analytics => "analytics",
            WidgetType::Flashcards => "flashcards",
        }
    }

    /// Title used when a widget is added without one
    pub fn default_title(&self) -> &'static str {
        match self {
            WidgetType::Calendar => "Calendar",
            WidgetType::Assignments => "Assignments",
            WidgetType::Habits => "Habits",
            WidgetType::Notes => "Notes",
            WidgetType::Pomodoro => "Pomodoro Timer",
            WidgetType::Analytics => "Analytics",
            WidgetType::Flashcards => "Flashcards",
        }
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for WidgetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WidgetType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown widget type: {}", s))
    }
}

/// Size class of a widget. Each class maps to a fixed footprint in cells.
///
/// Parsing is lenient: an unrecognised size name becomes `Medium`, which is
/// also the footprint the grid falls back to for unknown sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WidgetSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl WidgetSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetSize::Small => "small",
            WidgetSize::Medium => "medium",
            WidgetSize::Large => "large",
        }
    }

    /// Strict parse, `None` for unknown names
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "small" => Some(WidgetSize::Small),
            "medium" => Some(WidgetSize::Medium),
            "large" => Some(WidgetSize::Large),
            _ => None,
        }
    }
}

impl From<&str> for WidgetSize {
    fn from(name: &str) -> Self {
        WidgetSize::parse(name).unwrap_or_else(|| {
            log::warn!("Unknown widget size '{}', using medium", name);
            WidgetSize::Medium
        })
    }
}

impl From<String> for WidgetSize {
    fn from(name: String) -> Self {
        WidgetSize::from(name.as_str())
    }
}

impl From<WidgetSize> for String {
    fn from(size: WidgetSize) -> Self {
        size.as_str().to_string()
    }
}

impl fmt::Display for WidgetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

fn default_visible() -> bool {
    true
}

/// A widget placed on a dashboard layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardWidget {
    /// Unique within the owning layout
    pub id: String,
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    pub title: String,
    pub size: WidgetSize,
    /// Top-left cell
    pub position: GridPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<WidgetConfig>,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

/// Everything needed to add a widget; id and position are assigned on insert
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSpec {
    pub widget_type: WidgetType,
    pub title: String,
    pub size: WidgetSize,
    pub config: Option<WidgetConfig>,
    pub is_visible: bool,
}

impl WidgetSpec {
    pub fn new(widget_type: WidgetType, size: WidgetSize) -> Self {
        Self {
            widget_type,
            title: widget_type.default_title().to_string(),
            size,
            config: None,
            is_visible: true,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_config(mut self, config: WidgetConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the widget with the given id and position
    pub fn into_widget(self, id: String, position: GridPosition) -> DashboardWidget {
        DashboardWidget {
            id,
            widget_type: self.widget_type,
            title: self.title,
            size: self.size,
            position,
            config: self.config,
            is_visible: self.is_visible,
        }
    }
}
