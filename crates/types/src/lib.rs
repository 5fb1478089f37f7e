//! studydash-types: Shared data types for the studydash dashboard.
//!
//! This crate contains pure data types (widgets, layouts, grid geometry and
//! drag payloads) that are shared across all studydash crates. The types
//! have no storage or UI dependencies, so they serialize to exactly the JSON
//! shapes written to disk and exchanged during drag gestures.

pub mod drag;
pub mod geometry;
pub mod layout;
pub mod widget;

// Re-export commonly used types at the crate root for convenience
pub use drag::{DragData, DragItem, DRAG_MIME_TYPE};
pub use geometry::{ContainerRect, Footprint, GridPosition, GridSize, PixelPoint};
pub use layout::{export_filename, DashboardLayout, LayoutEnvelope, LAYOUT_FORMAT_VERSION};
pub use widget::{DashboardWidget, WidgetConfig, WidgetSize, WidgetSpec, WidgetType};

/// Generate a fresh identifier with the given prefix (e.g. `widget-…`).
pub fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}
