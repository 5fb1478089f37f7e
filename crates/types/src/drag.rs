//! Drag payloads

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// MIME type of the transfer slot a drag item is serialized into
pub const DRAG_MIME_TYPE: &str = "application/json";

/// Key/value payload attached to a drag item. Each drop zone validates the
/// keys it cares about.
pub type DragData = HashMap<String, serde_json::Value>;

/// The thing being dragged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragItem {
    pub id: String,
    /// Matched against a drop zone's accepted types
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub data: DragData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl DragItem {
    pub fn new(id: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_type: item_type.into(),
            data: DragData::new(),
            index: None,
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Serialize for a native drag transfer slot
    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a transfer slot payload
    pub fn from_payload(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }
}
