//! Layout manager - CRUD over a user's dashboard layouts
//!
//! Every operation loads the user's full layout list from the store,
//! changes it and saves the whole list back. Operations naming a layout or
//! widget that does not exist change nothing, log a warning and report
//! `false` / `None`, so callers holding stale ids are tolerated.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use studydash_core::grid::{self, size_to_footprint};
use studydash_core::{DashboardError, LayoutStore, Result};
use studydash_types::{
    export_filename, generate_id, DashboardLayout, DashboardWidget, GridPosition, GridSize,
    LayoutEnvelope, WidgetConfig, WidgetSize, WidgetSpec, LAYOUT_FORMAT_VERSION,
};

/// Name given to the layout created for a user with none
pub const DEFAULT_LAYOUT_NAME: &str = "Default";

/// Manages one user's layouts in a [`LayoutStore`]
pub struct LayoutManager<S: LayoutStore> {
    store: S,
    user_id: String,
    default_grid: GridSize,
}

impl<S: LayoutStore> LayoutManager<S> {
    pub fn new(store: S, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
            default_grid: GridSize::default(),
        }
    }

    /// Grid size given to newly created layouts
    pub fn with_default_grid(mut self, grid: GridSize) -> Self {
        self.default_grid = grid;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn layouts(&self) -> Result<Vec<DashboardLayout>> {
        self.store.load(&self.user_id)
    }

    pub fn layout(&self, layout_id: &str) -> Result<Option<DashboardLayout>> {
        Ok(self.layouts()?.into_iter().find(|l| l.id == layout_id))
    }

    /// Load the user's layouts, creating a "Default" layout if there are none
    pub fn load_or_initialize(&mut self) -> Result<Vec<DashboardLayout>> {
        let layouts = self.layouts()?;
        if !layouts.is_empty() {
            return Ok(layouts);
        }

        log::info!("No layouts for user {}, creating default", self.user_id);
        let layout = self.new_layout(DEFAULT_LAYOUT_NAME);
        let layouts = vec![layout];
        self.store.save(&self.user_id, &layouts)?;
        Ok(layouts)
    }

    /// Create an empty layout and append it to the user's list
    pub fn create_layout(&mut self, name: &str) -> Result<DashboardLayout> {
        let layout = self.new_layout(name);
        let mut layouts = self.layouts()?;
        layouts.push(layout.clone());
        self.store.save(&self.user_id, &layouts)?;

        log::info!("Created layout {} ({})", layout.name, layout.id);
        Ok(layout)
    }

    pub fn rename_layout(&mut self, layout_id: &str, name: &str) -> Result<bool> {
        self.mutate_layout(layout_id, "rename", |layout| {
            layout.name = name.to_string();
        })
    }

    pub fn delete_layout(&mut self, layout_id: &str) -> Result<bool> {
        let mut layouts = self.layouts()?;
        let before = layouts.len();
        layouts.retain(|l| l.id != layout_id);

        if layouts.len() == before {
            log::warn!("delete: layout {} not found", layout_id);
            return Ok(false);
        }
        self.store.save(&self.user_id, &layouts)?;
        Ok(true)
    }

    /// Copy a layout under a new id; widgets get new ids too
    pub fn duplicate_layout(&mut self, layout_id: &str) -> Result<Option<DashboardLayout>> {
        let mut layouts = self.layouts()?;
        let Some(source) = layouts.iter().find(|l| l.id == layout_id) else {
            log::warn!("duplicate: layout {} not found", layout_id);
            return Ok(None);
        };

        let mut copy = source.clone();
        copy.id = generate_id("layout");
        copy.name = format!("{} (Copy)", source.name);
        for widget in copy.widgets.iter_mut() {
            widget.id = generate_id("widget");
        }
        copy.touch();

        layouts.push(copy.clone());
        self.store.save(&self.user_id, &layouts)?;
        Ok(Some(copy))
    }

    /// Add a widget at (0,0). Placement is left to a later move or auto-arrange.
    pub fn add_widget(&mut self, layout_id: &str, spec: WidgetSpec) -> Result<Option<DashboardWidget>> {
        self.insert_widget(layout_id, spec, |_, _| GridPosition::ORIGIN)
    }

    /// Add a widget at the first free cell, scanning row by row. Falls back
    /// to (0,0) when the grid has no room.
    pub fn place_widget(&mut self, layout_id: &str, spec: WidgetSpec) -> Result<Option<DashboardWidget>> {
        self.insert_widget(layout_id, spec, |layout, size| {
            grid::find_available_position(layout, size_to_footprint(size), None)
                .unwrap_or(GridPosition::ORIGIN)
        })
    }

    pub fn move_widget(&mut self, layout_id: &str, widget_id: &str, position: GridPosition) -> Result<bool> {
        self.mutate_widget(layout_id, widget_id, "move", |widget| {
            widget.position = position;
        })
    }

    pub fn resize_widget(&mut self, layout_id: &str, widget_id: &str, size: WidgetSize) -> Result<bool> {
        self.mutate_widget(layout_id, widget_id, "resize", |widget| {
            widget.size = size;
        })
    }

    pub fn remove_widget(&mut self, layout_id: &str, widget_id: &str) -> Result<bool> {
        let mut layouts = self.layouts()?;
        let Some(layout) = layouts.iter_mut().find(|l| l.id == layout_id) else {
            log::warn!("remove: layout {} not found", layout_id);
            return Ok(false);
        };

        let before = layout.widgets.len();
        layout.widgets.retain(|w| w.id != widget_id);
        if layout.widgets.len() == before {
            log::warn!("remove: widget {} not found in layout {}", widget_id, layout_id);
            return Ok(false);
        }

        layout.touch();
        self.store.save(&self.user_id, &layouts)?;
        Ok(true)
    }

    pub fn set_widget_visibility(&mut self, layout_id: &str, widget_id: &str, visible: bool) -> Result<bool> {
        self.mutate_widget(layout_id, widget_id, "visibility", |widget| {
            widget.is_visible = visible;
        })
    }

    pub fn update_widget_config(
        &mut self,
        layout_id: &str,
        widget_id: &str,
        config: WidgetConfig,
    ) -> Result<bool> {
        self.mutate_widget(layout_id, widget_id, "config", |widget| {
            widget.config = Some(config);
        })
    }

    /// Re-pack all widgets of a layout with [`grid::auto_arrange`]
    pub fn auto_arrange(&mut self, layout_id: &str) -> Result<bool> {
        self.mutate_layout(layout_id, "auto-arrange", |layout| {
            layout.widgets = grid::auto_arrange(layout);
        })
    }

    /// Wrap a layout in a versioned export envelope
    pub fn export_layout(&self, layout_id: &str) -> Result<Option<LayoutEnvelope>> {
        Ok(self.layout(layout_id)?.map(LayoutEnvelope::new))
    }

    /// Write a layout's export envelope into `dir`, named after the layout
    pub fn export_to_dir(&self, layout_id: &str, dir: &Path) -> Result<Option<PathBuf>> {
        let Some(envelope) = self.export_layout(layout_id)? else {
            log::warn!("export: layout {} not found", layout_id);
            return Ok(None);
        };
        let name = envelope.layout.as_ref().map(|l| l.name.as_str()).unwrap_or_default();
        let path = dir.join(export_filename(name));

        std::fs::create_dir_all(dir)?;
        std::fs::write(&path, serde_json::to_string_pretty(&envelope)?)?;
        log::info!("Exported layout {} to {}", layout_id, path.display());
        Ok(Some(path))
    }

    /// Import a layout from the contents of an export file.
    ///
    /// The layout is stored under a new id with " (Imported)" appended to its
    /// name. Nothing is written unless the envelope is valid.
    pub fn import_layout(&mut self, contents: &str) -> Result<DashboardLayout> {
        let envelope: LayoutEnvelope = serde_json::from_str(contents)
            .map_err(|e| DashboardError::InvalidFormat(e.to_string()))?;

        if envelope.version.as_deref() != Some(LAYOUT_FORMAT_VERSION) {
            return Err(DashboardError::InvalidFormat(format!(
                "unsupported version {}, expected {}",
                envelope.version.as_deref().unwrap_or("<none>"),
                LAYOUT_FORMAT_VERSION
            )));
        }
        let Some(mut layout) = envelope.layout else {
            return Err(DashboardError::InvalidFormat("missing layout".to_string()));
        };
        validate_layout(&layout)?;

        layout.id = generate_id("layout");
        layout.name = format!("{} (Imported)", layout.name);
        layout.touch();

        let mut layouts = self.layouts()?;
        layouts.push(layout.clone());
        self.store.save(&self.user_id, &layouts)?;

        log::info!("Imported layout {} ({})", layout.name, layout.id);
        Ok(layout)
    }

    /// Add a widget at a given cell in a single write. No collision check.
    pub fn add_widget_at(
        &mut self,
        layout_id: &str,
        spec: WidgetSpec,
        position: GridPosition,
    ) -> Result<Option<DashboardWidget>> {
        self.insert_widget(layout_id, spec, |_, _| position)
    }

    /// Read an export file and import it
    pub async fn import_from_file(&mut self, path: impl AsRef<Path>) -> Result<DashboardLayout> {
        let contents = tokio::fs::read_to_string(path.as_ref()).await?;
        self.import_layout(&contents)
    }

    fn new_layout(&self, name: &str) -> DashboardLayout {
        DashboardLayout::new(generate_id("layout"), name, self.default_grid)
    }

    fn insert_widget<F>(&mut self, layout_id: &str, spec: WidgetSpec, position: F) -> Result<Option<DashboardWidget>>
    where
        F: FnOnce(&DashboardLayout, WidgetSize) -> GridPosition,
    {
        let mut layouts = self.layouts()?;
        let Some(layout) = layouts.iter_mut().find(|l| l.id == layout_id) else {
            log::warn!("add: layout {} not found", layout_id);
            return Ok(None);
        };

        let position = position(&*layout, spec.size);
        let widget = spec.into_widget(generate_id("widget"), position);
        layout.widgets.push(widget.clone());
        layout.touch();

        self.store.save(&self.user_id, &layouts)?;
        log::debug!("Added widget {} to layout {}", widget.id, layout_id);
        Ok(Some(widget))
    }

    fn mutate_layout<F>(&mut self, layout_id: &str, op: &str, f: F) -> Result<bool>
    where
        F: FnOnce(&mut DashboardLayout),
    {
        let mut layouts = self.layouts()?;
        let Some(layout) = layouts.iter_mut().find(|l| l.id == layout_id) else {
            log::warn!("{}: layout {} not found", op, layout_id);
            return Ok(false);
        };

        f(layout);
        layout.touch();
        self.store.save(&self.user_id, &layouts)?;
        Ok(true)
    }

    fn mutate_widget<F>(&mut self, layout_id: &str, widget_id: &str, op: &str, f: F) -> Result<bool>
    where
        F: FnOnce(&mut DashboardWidget),
    {
        let mut layouts = self.layouts()?;
        let Some(layout) = layouts.iter_mut().find(|l| l.id == layout_id) else {
            log::warn!("{}: layout {} not found", op, layout_id);
            return Ok(false);
        };
        let Some(widget) = layout.widget_mut(widget_id) else {
            log::warn!("{}: widget {} not found in layout {}", op, widget_id, layout_id);
            return Ok(false);
        };

        f(widget);
        layout.touch();
        self.store.save(&self.user_id, &layouts)?;
        Ok(true)
    }
}

/// Shape checks an imported layout must pass before it is stored
fn validate_layout(layout: &DashboardLayout) -> Result<()> {
    let grid = layout.grid_size;
    if grid.cols <= 0 || grid.rows <= 0 {
        return Err(DashboardError::InvalidFormat(format!(
            "grid size must be positive, got {}x{}",
            grid.cols, grid.rows
        )));
    }

    let mut seen = HashSet::new();
    for widget in &layout.widgets {
        if !seen.insert(widget.id.as_str()) {
            return Err(DashboardError::InvalidFormat(format!(
                "duplicate widget id {}",
                widget.id
            )));
        }
    }
    Ok(())
}
