//! Drop zone for a dashboard grid
//!
//! Wires drag-and-drop to layout persistence: dropping a widget moves it,
//! dropping a palette entry adds a new widget. The drop index is the
//! row-major cell index under the pointer (see [`cell_index`]).

use super::layout_manager::LayoutManager;
use super::registry::DropZone;
use std::cell::RefCell;
use std::rc::Rc;
use studydash_core::grid::{self, size_to_footprint};
use studydash_core::LayoutStore;
use studydash_types::{DragItem, GridPosition, GridSize, WidgetSize, WidgetSpec, WidgetType};

/// Zone type of dashboard grids
pub const GRID_ZONE_TYPE: &str = "dashboard-grid";
/// Item type of a widget already on the grid; the item id is the widget id
pub const WIDGET_ITEM: &str = "widget";
/// Item type of a new widget dragged from the palette. Its data carries
/// `type`, `size` and optionally `title`.
pub const PALETTE_ITEM: &str = "widget-palette";

/// Row-major index of a cell, `None` for cells outside the grid
pub fn cell_index(position: GridPosition, grid: GridSize) -> Option<usize> {
    let inside = position.x >= 0 && position.y >= 0 && position.x < grid.cols && position.y < grid.rows;
    inside.then(|| position.y as usize * grid.cols as usize + position.x as usize)
}

/// Cell for a row-major index
pub fn cell_from_index(index: usize, grid: GridSize) -> GridPosition {
    let cols = grid.cols.max(1) as usize;
    GridPosition::new((index % cols) as i32, (index / cols) as i32)
}

/// Build the drop zone for one layout's grid
pub fn grid_drop_zone<S: LayoutStore + 'static>(
    zone_id: &str,
    manager: Rc<RefCell<LayoutManager<S>>>,
    layout_id: &str,
) -> DropZone {
    let layout_id = layout_id.to_string();
    DropZone::new(
        zone_id,
        GRID_ZONE_TYPE,
        [WIDGET_ITEM, PALETTE_ITEM],
        move |item, index| {
            let mut manager = manager.borrow_mut();
            let result = match item.item_type.as_str() {
                WIDGET_ITEM => move_dropped_widget(&mut manager, &layout_id, item, index),
                PALETTE_ITEM => add_dropped_widget(&mut manager, &layout_id, item, index),
                other => {
                    log::debug!("Grid ignored item type {}", other);
                    Ok(())
                }
            };
            if let Err(e) = result {
                log::error!("Failed to apply drop on layout {}: {}", layout_id, e);
            }
        },
    )
}

fn move_dropped_widget<S: LayoutStore>(
    manager: &mut LayoutManager<S>,
    layout_id: &str,
    item: &DragItem,
    index: Option<usize>,
) -> studydash_core::Result<()> {
    let Some(index) = index else {
        log::debug!("Widget {} dropped without a target cell", item.id);
        return Ok(());
    };
    let Some(layout) = manager.layout(layout_id)? else {
        log::warn!("drop: layout {} not found", layout_id);
        return Ok(());
    };
    let Some(widget) = layout.widget(&item.id) else {
        log::warn!("drop: widget {} not found in layout {}", item.id, layout_id);
        return Ok(());
    };

    let target = cell_from_index(index, layout.grid_size);
    let footprint = size_to_footprint(widget.size);
    if !grid::can_place(&layout, &widget.id, target, footprint) {
        log::info!("Widget {} does not fit at ({}, {}), not moved", item.id, target.x, target.y);
        return Ok(());
    }

    manager.move_widget(layout_id, &item.id, target)?;
    Ok(())
}

fn add_dropped_widget<S: LayoutStore>(
    manager: &mut LayoutManager<S>,
    layout_id: &str,
    item: &DragItem,
    index: Option<usize>,
) -> studydash_core::Result<()> {
    let widget_type = item
        .data
        .get("type")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<WidgetType>().ok());
    let Some(widget_type) = widget_type else {
        log::warn!("Palette item {} has no valid widget type", item.id);
        return Ok(());
    };
    let size = item
        .data
        .get("size")
        .and_then(|v| v.as_str())
        .map(WidgetSize::from)
        .unwrap_or_default();

    let mut spec = WidgetSpec::new(widget_type, size);
    if let Some(title) = item.data.get("title").and_then(|v| v.as_str()) {
        spec = spec.with_title(title);
    }

    let Some(index) = index else {
        manager.place_widget(layout_id, spec)?;
        return Ok(());
    };
    let Some(layout) = manager.layout(layout_id)? else {
        log::warn!("drop: layout {} not found", layout_id);
        return Ok(());
    };

    let target = cell_from_index(index, layout.grid_size);
    if grid::can_place(&layout, "", target, size_to_footprint(spec.size)) {
        manager.add_widget_at(layout_id, spec, target)?;
    } else {
        log::info!(
            "New {} widget does not fit at ({}, {}), placing at first free cell",
            spec.widget_type,
            target.x,
            target.y
        );
        manager.place_widget(layout_id, spec)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::drag::DragCoordinator;
    use crate::core::registry::DropZoneRegistry;
    use studydash_core::MemoryStore;

    fn setup() -> (Rc<RefCell<LayoutManager<MemoryStore>>>, String) {
        let mut manager = LayoutManager::new(MemoryStore::new(), "alice");
        let layout = manager.create_layout("Study").unwrap();
        (Rc::new(RefCell::new(manager)), layout.id)
    }

    #[test]
    fn test_cell_index_roundtrip() {
        let grid = GridSize::default();
        assert_eq!(cell_index(GridPosition::new(3, 2), grid), Some(27));
        assert_eq!(cell_from_index(27, grid), GridPosition::new(3, 2));
    }

    #[test]
    fn test_cell_index_outside_grid() {
        let grid = GridSize::default();
        assert_eq!(cell_index(GridPosition::new(-1, 1), grid), None);
        assert_eq!(cell_index(GridPosition::new(12, 0), grid), None);
        assert_eq!(cell_index(GridPosition::new(0, 8), grid), None);
        assert_eq!(cell_index(GridPosition::new(11, 7), grid), Some(95));
    }

    #[test]
    fn test_palette_drop_adds_widget_at_cell() {
        let (manager, layout_id) = setup();
        let registry = DropZoneRegistry::new();
        let _zone = registry.register(grid_drop_zone("grid", manager.clone(), &layout_id));
        let mut coordinator = DragCoordinator::new(registry);

        coordinator.start_drag(
            DragItem::new("palette-notes", PALETTE_ITEM)
                .with_data("type", serde_json::json!("notes"))
                .with_data("size", serde_json::json!("small")),
        );
        let index = cell_index(GridPosition::new(4, 1), GridSize::default());
        assert!(coordinator.drop("grid", index).is_accepted());

        let layout = manager.borrow().layout(&layout_id).unwrap().unwrap();
        assert_eq!(layout.widgets.len(), 1);
        assert_eq!(layout.widgets[0].widget_type, WidgetType::Notes);
        assert_eq!(layout.widgets[0].position, GridPosition::new(4, 1));
    }

    #[test]
    fn test_widget_drop_moves_unless_colliding() {
        let (manager, layout_id) = setup();
        let (a, b) = {
            let mut m = manager.borrow_mut();
            let a = m
                .place_widget(&layout_id, WidgetSpec::new(WidgetType::Calendar, WidgetSize::Large))
                .unwrap()
                .unwrap();
            let b = m
                .place_widget(&layout_id, WidgetSpec::new(WidgetType::Habits, WidgetSize::Small))
                .unwrap()
                .unwrap();
            (a, b)
        };
        assert_eq!(b.position, GridPosition::new(6, 0));

        let registry = DropZoneRegistry::new();
        let _zone = registry.register(grid_drop_zone("grid", manager.clone(), &layout_id));
        let mut coordinator = DragCoordinator::new(registry);
        let grid = GridSize::default();

        // Onto the large widget: refused
        coordinator.start_drag(DragItem::new(b.id.clone(), WIDGET_ITEM));
        coordinator.drop("grid", cell_index(GridPosition::new(2, 2), grid));
        let layout = manager.borrow().layout(&layout_id).unwrap().unwrap();
        assert_eq!(layout.widget(&b.id).unwrap().position, GridPosition::new(6, 0));

        // Free space: moved
        coordinator.start_drag(DragItem::new(b.id.clone(), WIDGET_ITEM));
        coordinator.drop("grid", cell_index(GridPosition::new(0, 5), grid));
        let layout = manager.borrow().layout(&layout_id).unwrap().unwrap();
        assert_eq!(layout.widget(&b.id).unwrap().position, GridPosition::new(0, 5));
        assert_eq!(layout.widget(&a.id).unwrap().position, GridPosition::ORIGIN);

        // Large widget past the right edge: refused
        coordinator.start_drag(DragItem::new(a.id.clone(), WIDGET_ITEM));
        coordinator.drop("grid", cell_index(GridPosition::new(10, 4), grid));
        let layout = manager.borrow().layout(&layout_id).unwrap().unwrap();
        assert_eq!(layout.widget(&a.id).unwrap().position, GridPosition::ORIGIN);
    }

    #[test]
    fn test_palette_drop_onto_widget_is_placed_in_free_cell() {
        let (manager, layout_id) = setup();
        manager
            .borrow_mut()
            .place_widget(&layout_id, WidgetSpec::new(WidgetType::Calendar, WidgetSize::Large))
            .unwrap();

        let registry = DropZoneRegistry::new();
        let _zone = registry.register(grid_drop_zone("grid", manager.clone(), &layout_id));
        let mut coordinator = DragCoordinator::new(registry);

        coordinator.start_drag(
            DragItem::new("palette-habits", PALETTE_ITEM)
                .with_data("type", serde_json::json!("habits"))
                .with_data("size", serde_json::json!("small")),
        );
        coordinator.drop("grid", cell_index(GridPosition::new(2, 2), GridSize::default()));

        let layout = manager.borrow().layout(&layout_id).unwrap().unwrap();
        assert_eq!(layout.widgets.len(), 2);
        let added = &layout.widgets[1];
        assert_eq!(added.widget_type, WidgetType::Habits);
        assert_eq!(added.position, GridPosition::new(6, 0));
        assert!(!grid::has_collision(&layout, &added.id, added.position, size_to_footprint(added.size)));
    }
}
