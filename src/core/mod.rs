//! Drag-and-drop coordination and layout persistence

mod dashboard;
mod drag;
mod gesture;
mod layout_manager;
mod registry;

pub use dashboard::{
    cell_from_index, cell_index, grid_drop_zone, GRID_ZONE_TYPE, PALETTE_ITEM, WIDGET_ITEM,
};
pub use drag::{DragCoordinator, DragState, DropOutcome, DropRejection};
pub use gesture::{
    DataTransfer, NativeDragAdapter, NativeDragEvent, PointerAdapter, TouchAdapter, TouchEvent,
};
pub use layout_manager::{LayoutManager, DEFAULT_LAYOUT_NAME};
pub use registry::{DropCallback, DropZone, DropZoneGuard, DropZoneRegistry};
