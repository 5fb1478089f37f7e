//! Grid layout engine
//!
//! Stateless helpers for converting between pixel and cell space, detecting
//! widget overlap and packing widgets onto a layout grid. Nothing here
//! touches storage; callers apply the results to a layout themselves.
//!
//! Rectangles are half-open: a widget at `x` with width `w` covers columns
//! `x..x + w`, so widgets that share only an edge do not overlap.

use studydash_types::{
    ContainerRect, DashboardLayout, DashboardWidget, Footprint, GridPosition, GridSize,
    PixelPoint, WidgetSize,
};

/// Convert a pointer position to the grid cell under it.
///
/// The result is not clamped: pointers outside the container produce
/// negative or out-of-range cells.
pub fn pixel_to_cell(
    pointer_x: f64,
    pointer_y: f64,
    container: &ContainerRect,
    grid: GridSize,
) -> GridPosition {
    let cell_width = container.width / grid.cols as f64;
    let cell_height = container.height / grid.rows as f64;

    GridPosition {
        x: ((pointer_x - container.left) / cell_width).floor() as i32,
        y: ((pointer_y - container.top) / cell_height).floor() as i32,
    }
}

/// Pixel coordinates of a cell's top-left corner
pub fn cell_to_pixel(position: GridPosition, container: &ContainerRect, grid: GridSize) -> PixelPoint {
    let cell_width = container.width / grid.cols as f64;
    let cell_height = container.height / grid.rows as f64;

    PixelPoint {
        x: container.left + position.x as f64 * cell_width,
        y: container.top + position.y as f64 * cell_height,
    }
}

/// Round a pixel position (relative to the container) to the nearest cell boundary
pub fn snap_to_grid_pixels(
    position: PixelPoint,
    grid: GridSize,
    container_width: f64,
    container_height: f64,
) -> PixelPoint {
    let cell_width = container_width / grid.cols as f64;
    let cell_height = container_height / grid.rows as f64;

    PixelPoint {
        x: (position.x / cell_width).round() * cell_width,
        y: (position.y / cell_height).round() * cell_height,
    }
}

/// Footprint of a size class: small 2×2, medium 4×3, large 6×4
pub fn size_to_footprint(size: WidgetSize) -> Footprint {
    match size {
        WidgetSize::Small => Footprint::new(2, 2),
        WidgetSize::Medium => Footprint::new(4, 3),
        WidgetSize::Large => Footprint::new(6, 4),
    }
}

/// Footprint for a size given by name. Unknown names get the medium footprint.
pub fn footprint_for_size_name(name: &str) -> Footprint {
    match WidgetSize::parse(name) {
        Some(size) => size_to_footprint(size),
        None => size_to_footprint(WidgetSize::Medium),
    }
}

/// Axis-aligned overlap test on half-open rectangles
pub fn rectangles_overlap(
    a_pos: GridPosition,
    a_size: Footprint,
    b_pos: GridPosition,
    b_size: Footprint,
) -> bool {
    let a_right = a_pos.x + a_size.width;
    let a_bottom = a_pos.y + a_size.height;
    let b_right = b_pos.x + b_size.width;
    let b_bottom = b_pos.y + b_size.height;

    !(a_right <= b_pos.x || b_right <= a_pos.x || a_bottom <= b_pos.y || b_bottom <= a_pos.y)
}

/// Whether a candidate rectangle overlaps any widget in the layout other than
/// `widget_id` itself
pub fn has_collision(
    layout: &DashboardLayout,
    widget_id: &str,
    position: GridPosition,
    footprint: Footprint,
) -> bool {
    layout
        .widgets
        .iter()
        .filter(|w| w.id != widget_id)
        .any(|w| rectangles_overlap(position, footprint, w.position, size_to_footprint(w.size)))
}

/// Whether a rectangle lies completely inside the grid
pub fn fits_in_grid(position: GridPosition, footprint: Footprint, grid: GridSize) -> bool {
    position.x >= 0
        && position.y >= 0
        && position.x.saturating_add(footprint.width) <= grid.cols
        && position.y.saturating_add(footprint.height) <= grid.rows
}

/// Whether `widget_id` may occupy a rectangle: inside the grid and clear of
/// every other widget
pub fn can_place(
    layout: &DashboardLayout,
    widget_id: &str,
    position: GridPosition,
    footprint: Footprint,
) -> bool {
    fits_in_grid(position, footprint, layout.grid_size)
        && !has_collision(layout, widget_id, position, footprint)
}

/// Find the first collision-free position for a footprint, scanning row by row.
///
/// `exclude` names a widget to ignore (the one being placed, if it is
/// already in the layout). Returns `None` if the footprint fits nowhere.
pub fn find_available_position(
    layout: &DashboardLayout,
    footprint: Footprint,
    exclude: Option<&str>,
) -> Option<GridPosition> {
    let grid = layout.grid_size;
    let exclude = exclude.unwrap_or("");

    if footprint.width > grid.cols || footprint.height > grid.rows {
        return None;
    }

    for y in 0..=grid.rows.saturating_sub(footprint.height) {
        for x in 0..=grid.cols.saturating_sub(footprint.width) {
            let candidate = GridPosition::new(x, y);
            if !has_collision(layout, exclude, candidate, footprint) {
                return Some(candidate);
            }
        }
    }

    None
}

/// Re-pack every widget with a greedy shelf heuristic.
///
/// Widgets are ordered by footprint area, largest first (stable, so equal
/// areas keep their layout order), then placed left to right. A widget
/// that would cross the right edge starts a new row below the tallest
/// widget of the current row. Gaps left in earlier rows are never
/// back-filled.
///
/// Returns the widgets in placement order.
pub fn auto_arrange(layout: &DashboardLayout) -> Vec<DashboardWidget> {
    let mut sorted = layout.widgets.clone();
    sorted.sort_by_key(|w| std::cmp::Reverse(size_to_footprint(w.size).area()));

    let cols = layout.grid_size.cols;
    let mut current_x = 0;
    let mut current_y = 0;
    let mut max_row_height = 0;

    for widget in sorted.iter_mut() {
        let footprint = size_to_footprint(widget.size);

        if current_x + footprint.width > cols {
            current_x = 0;
            current_y += max_row_height;
            max_row_height = 0;
        }

        widget.position = GridPosition::new(current_x, current_y);
        current_x += footprint.width;
        max_row_height = max_row_height.max(footprint.height);
    }

    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use studydash_types::{WidgetSpec, WidgetType};

    fn widget(id: &str, size: WidgetSize, x: i32, y: i32) -> DashboardWidget {
        WidgetSpec::new(WidgetType::Notes, size).into_widget(id.to_string(), GridPosition::new(x, y))
    }

    fn layout_with(widgets: Vec<DashboardWidget>, cols: i32) -> DashboardLayout {
        let mut layout = DashboardLayout::new("l", "Test", GridSize::new(cols, 8));
        layout.widgets = widgets;
        layout
    }

    #[test]
    fn test_size_footprints() {
        assert_eq!(size_to_footprint(WidgetSize::Small), Footprint::new(2, 2));
        assert_eq!(size_to_footprint(WidgetSize::Medium), Footprint::new(4, 3));
        assert_eq!(size_to_footprint(WidgetSize::Large), Footprint::new(6, 4));
        assert_eq!(footprint_for_size_name("gigantic"), Footprint::new(4, 3));
        assert_eq!(footprint_for_size_name("large"), Footprint::new(6, 4));
    }

    #[test]
    fn test_pixel_to_cell() {
        let container = ContainerRect::new(100.0, 50.0, 1200.0, 800.0);
        let grid = GridSize::default();

        assert_eq!(pixel_to_cell(100.0, 50.0, &container, grid), GridPosition::new(0, 0));
        assert_eq!(pixel_to_cell(399.0, 249.0, &container, grid), GridPosition::new(2, 1));
        // Not clamped
        assert_eq!(pixel_to_cell(50.0, 40.0, &container, grid), GridPosition::new(-1, -1));
        assert_eq!(pixel_to_cell(1400.0, 50.0, &container, grid), GridPosition::new(13, 0));
    }

    #[test]
    fn test_cell_to_pixel_is_cell_origin() {
        let container = ContainerRect::new(10.0, 20.0, 600.0, 400.0);
        let grid = GridSize::default();
        let origin = cell_to_pixel(GridPosition::new(3, 2), &container, grid);

        assert_eq!(origin, PixelPoint::new(160.0, 120.0));
        assert_eq!(pixel_to_cell(origin.x, origin.y, &container, grid), GridPosition::new(3, 2));
    }

    #[test]
    fn test_snap_to_grid_pixels() {
        let snapped = snap_to_grid_pixels(PixelPoint::new(130.0, 74.0), GridSize::default(), 1200.0, 800.0);
        assert_eq!(snapped, PixelPoint::new(100.0, 100.0));

        let snapped = snap_to_grid_pixels(PixelPoint::new(149.0, 49.0), GridSize::default(), 1200.0, 800.0);
        assert_eq!(snapped, PixelPoint::new(100.0, 0.0));
    }

    #[test]
    fn test_edge_touching_does_not_overlap() {
        let fp = Footprint::new(2, 2);
        assert!(!rectangles_overlap(GridPosition::new(0, 0), fp, GridPosition::new(2, 0), fp));
        assert!(!rectangles_overlap(GridPosition::new(0, 0), fp, GridPosition::new(0, 2), fp));
        assert!(rectangles_overlap(GridPosition::new(0, 0), fp, GridPosition::new(1, 1), fp));
    }

    #[test]
    fn test_has_collision_excludes_self() {
        let layout = layout_with(
            vec![widget("a", WidgetSize::Medium, 0, 0), widget("b", WidgetSize::Small, 4, 0)],
            12,
        );
        let medium = size_to_footprint(WidgetSize::Medium);

        assert!(!has_collision(&layout, "a", GridPosition::new(0, 0), medium));
        assert!(has_collision(&layout, "a", GridPosition::new(2, 0), medium));
        assert!(!has_collision(&layout, "a", GridPosition::new(6, 0), medium));
    }

    #[test]
    fn test_auto_arrange_single_row() {
        let layout = layout_with(
            vec![
                widget("c", WidgetSize::Small, 5, 5),
                widget("a", WidgetSize::Large, 0, 7),
                widget("b", WidgetSize::Medium, 3, 1),
            ],
            12,
        );

        let arranged = auto_arrange(&layout);
        let placed: Vec<(&str, GridPosition)> =
            arranged.iter().map(|w| (w.id.as_str(), w.position)).collect();

        assert_eq!(
            placed,
            vec![
                ("a", GridPosition::new(0, 0)),
                ("b", GridPosition::new(6, 0)),
                ("c", GridPosition::new(10, 0)),
            ]
        );
    }

    #[test]
    fn test_auto_arrange_wraps_below_tallest() {
        let layout = layout_with(
            vec![
                widget("l1", WidgetSize::Large, 0, 0),
                widget("l2", WidgetSize::Large, 0, 0),
                widget("m1", WidgetSize::Medium, 0, 0),
                widget("s1", WidgetSize::Small, 0, 0),
            ],
            10,
        );

        let arranged = auto_arrange(&layout);
        let pos = |id: &str| arranged.iter().find(|w| w.id == id).unwrap().position;

        assert_eq!(pos("l1"), GridPosition::new(0, 0));
        // 6 + 6 > 10, wraps
        assert_eq!(pos("l2"), GridPosition::new(0, 4));
        assert_eq!(pos("m1"), GridPosition::new(6, 4));
        // 10 + 2 > 10, wraps below the large row; earlier gap at (6,0) stays empty
        assert_eq!(pos("s1"), GridPosition::new(0, 8));
    }

    #[test]
    fn test_auto_arrange_keeps_order_for_equal_areas() {
        let layout = layout_with(
            vec![
                widget("s1", WidgetSize::Small, 0, 0),
                widget("s2", WidgetSize::Small, 0, 0),
                widget("s3", WidgetSize::Small, 0, 0),
            ],
            12,
        );
        let ids: Vec<String> = auto_arrange(&layout).into_iter().map(|w| w.id).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn test_find_available_position() {
        let layout = layout_with(vec![widget("a", WidgetSize::Large, 0, 0)], 12);
        let medium = size_to_footprint(WidgetSize::Medium);

        assert_eq!(find_available_position(&layout, medium, None), Some(GridPosition::new(6, 0)));
        assert_eq!(
            find_available_position(&layout, size_to_footprint(WidgetSize::Large), Some("a")),
            Some(GridPosition::new(0, 0))
        );
        assert_eq!(find_available_position(&layout, Footprint::new(13, 1), None), None);
    }

    #[test]
    fn test_find_available_position_degenerate_grids() {
        let small = size_to_footprint(WidgetSize::Small);
        let mut layout = layout_with(Vec::new(), 12);

        layout.grid_size = GridSize::new(12, i32::MIN);
        assert_eq!(find_available_position(&layout, small, None), None);

        layout.grid_size = GridSize::new(0, 0);
        assert_eq!(find_available_position(&layout, small, None), None);

        layout.grid_size = GridSize::new(i32::MAX, 2);
        assert_eq!(
            find_available_position(&layout, Footprint::new(-5, 1), None),
            Some(GridPosition::ORIGIN)
        );
    }

    #[test]
    fn test_can_place() {
        let layout = layout_with(vec![widget("a", WidgetSize::Large, 0, 0)], 12);
        let large = size_to_footprint(WidgetSize::Large);

        assert!(can_place(&layout, "a", GridPosition::new(6, 4), large));
        assert!(!can_place(&layout, "b", GridPosition::new(3, 0), large));
        // Clear of other widgets but past the right edge
        assert!(!can_place(&layout, "a", GridPosition::new(10, 0), large));
    }

    #[test]
    fn test_fits_in_grid() {
        let grid = GridSize::default();
        let large = size_to_footprint(WidgetSize::Large);
        assert!(fits_in_grid(GridPosition::new(6, 4), large, grid));
        assert!(!fits_in_grid(GridPosition::new(7, 0), large, grid));
        assert!(!fits_in_grid(GridPosition::new(-1, 0), large, grid));
        assert!(!fits_in_grid(GridPosition::new(0, i32::MAX), large, grid));
    }

    fn size_strategy() -> impl Strategy<Value = WidgetSize> {
        prop_oneof![
            Just(WidgetSize::Small),
            Just(WidgetSize::Medium),
            Just(WidgetSize::Large),
        ]
    }

    fn rect_strategy() -> impl Strategy<Value = (GridPosition, Footprint)> {
        (-20i32..20, -20i32..20, 0i32..10, 0i32..10)
            .prop_map(|(x, y, w, h)| (GridPosition::new(x, y), Footprint::new(w, h)))
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(a in rect_strategy(), b in rect_strategy()) {
            prop_assert_eq!(
                rectangles_overlap(a.0, a.1, b.0, b.1),
                rectangles_overlap(b.0, b.1, a.0, a.1)
            );
        }

        #[test]
        fn identical_rects_overlap(x in -20i32..20, y in -20i32..20, w in 1i32..10, h in 1i32..10) {
            let pos = GridPosition::new(x, y);
            let fp = Footprint::new(w, h);
            prop_assert!(rectangles_overlap(pos, fp, pos, fp));
        }

        #[test]
        fn auto_arrange_never_overlaps_or_overflows(
            sizes in prop::collection::vec(size_strategy(), 0..24),
            cols in 6i32..30,
        ) {
            let widgets = sizes
                .into_iter()
                .enumerate()
                .map(|(i, size)| widget(&format!("w{}", i), size, 0, 0))
                .collect();
            let layout = layout_with(widgets, cols);
            let arranged = auto_arrange(&layout);

            prop_assert_eq!(arranged.len(), layout.widgets.len());
            for (i, a) in arranged.iter().enumerate() {
                let fa = size_to_footprint(a.size);
                prop_assert!(a.position.x >= 0 && a.position.y >= 0);
                prop_assert!(a.position.x + fa.width <= cols);
                for b in arranged.iter().skip(i + 1) {
                    let fb = size_to_footprint(b.size);
                    prop_assert!(!rectangles_overlap(a.position, fa, b.position, fb));
                }
            }
        }
    }
}
