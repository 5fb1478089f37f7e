//! Dashboard layouts and the export envelope

use crate::geometry::GridSize;
use crate::widget::DashboardWidget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version string written into every exported layout file
pub const LAYOUT_FORMAT_VERSION: &str = "1.0";

/// A named arrangement of widgets on a grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardLayout {
    pub id: String,
    pub name: String,
    /// Widget ids are unique within a layout
    pub widgets: Vec<DashboardWidget>,
    #[serde(default)]
    pub grid_size: GridSize,
    pub last_modified: DateTime<Utc>,
}

impl DashboardLayout {
    /// Create an empty layout
    pub fn new(id: impl Into<String>, name: impl Into<String>, grid_size: GridSize) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            widgets: Vec::new(),
            grid_size,
            last_modified: Utc::now(),
        }
    }

    /// Mark the layout as structurally modified
    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }

    pub fn widget(&self, widget_id: &str) -> Option<&DashboardWidget> {
        self.widgets.iter().find(|w| w.id == widget_id)
    }

    pub fn widget_mut(&mut self, widget_id: &str) -> Option<&mut DashboardWidget> {
        self.widgets.iter_mut().find(|w| w.id == widget_id)
    }
}

/// Versioned wrapper used when a layout is exported to or imported from a file.
///
/// Every field is optional on input so that a structurally incomplete file
/// still parses and can be rejected with a precise reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<DashboardLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl LayoutEnvelope {
    /// Wrap a layout for export, stamped with the current time
    pub fn new(layout: DashboardLayout) -> Self {
        Self {
            layout: Some(layout),
            exported_at: Some(Utc::now()),
            version: Some(LAYOUT_FORMAT_VERSION.to_string()),
        }
    }
}

/// File name used when exporting a layout: lowercased, whitespace runs
/// replaced by hyphens, suffixed `-layout.json`.
pub fn export_filename(layout_name: &str) -> String {
    let slug = layout_name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("{}-layout.json", slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("Exam Week"), "exam-week-layout.json");
        assert_eq!(export_filename("Default"), "default-layout.json");
        assert_eq!(export_filename("My  Study   Setup"), "my-study-setup-layout.json");
    }

    #[test]
    fn test_layout_wire_format() {
        let layout = DashboardLayout::new("l1", "Default", GridSize::default());
        let json = serde_json::to_value(&layout).unwrap();

        assert_eq!(json["gridSize"]["cols"], 12);
        assert_eq!(json["gridSize"]["rows"], 8);
        assert!(json["lastModified"].is_string());
        assert!(json["widgets"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_envelope_missing_layout_still_parses() {
        let envelope: LayoutEnvelope = serde_json::from_str(r#"{"version":"1.0"}"#).unwrap();
        assert!(envelope.layout.is_none());
        assert_eq!(envelope.version.as_deref(), Some("1.0"));
    }
}
