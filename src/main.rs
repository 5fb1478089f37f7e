use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;
use studydash::config::AppConfig;
use studydash::core::LayoutManager;
use studydash::grid::{self, size_to_footprint};
use studydash::types::{DashboardLayout, GridPosition, WidgetSize, WidgetSpec, WidgetType};
use studydash::JsonFileStore;

/// studydash - manage widget dashboard layouts
#[derive(Parser, Debug)]
#[command(name = "studydash")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// User whose layouts to manage (defaults to the configured user)
    #[arg(short = 'u', long = "user", global = true)]
    user: Option<String>,

    /// Config file to use instead of the default location
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0", global = true)]
    debug: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List layouts
    List,
    /// Show the widgets of a layout
    Show { layout: Option<String> },
    /// Create an empty layout
    Create { name: String },
    /// Rename a layout
    Rename { layout: String, name: String },
    /// Delete a layout
    Delete { layout: String },
    /// Copy a layout
    Duplicate { layout: String },
    /// Make a layout the active one
    Use { layout: String },
    /// Add a widget
    Add {
        layout: String,
        #[arg(short = 't', long = "type", value_parser = parse_widget_type)]
        widget_type: WidgetType,
        #[arg(short = 's', long = "size", default_value = "medium", value_parser = parse_widget_size)]
        size: WidgetSize,
        #[arg(long)]
        title: Option<String>,
        /// Put the widget at the first free cell instead of (0,0)
        #[arg(long)]
        place: bool,
    },
    /// Move a widget to a cell
    Move {
        layout: String,
        widget: String,
        x: i32,
        y: i32,
        /// Move even if the widget would overlap another or leave the grid
        #[arg(long)]
        force: bool,
    },
    /// Change a widget's size
    Resize {
        layout: String,
        widget: String,
        #[arg(value_parser = parse_widget_size)]
        size: WidgetSize,
    },
    /// Remove a widget
    Remove { layout: String, widget: String },
    /// Show or hide a widget
    Visibility {
        layout: String,
        widget: String,
        #[arg(action = clap::ArgAction::Set)]
        visible: bool,
    },
    /// Re-pack all widgets of a layout
    Arrange { layout: String },
    /// Export a layout to a JSON file
    Export {
        layout: String,
        /// Directory to write into
        #[arg(short = 'o', long = "out", default_value = ".")]
        out: PathBuf,
    },
    /// Import a layout from an exported file
    Import { file: PathBuf },
}

fn parse_widget_type(s: &str) -> Result<WidgetType, String> {
    s.parse()
}

fn parse_widget_size(s: &str) -> Result<WidgetSize, String> {
    WidgetSize::parse(s).ok_or_else(|| format!("Unknown size: {} (small, medium, large)", s))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Level 0 (default): warn only
    // Level 1: info
    // Level 2: debug
    // Level 3+: trace
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match &cli.config {
        Some(path) if path.exists() => AppConfig::load_from_path(path)?,
        Some(_) => AppConfig::default(),
        None => AppConfig::load()?,
    };
    let user_id = cli.user.clone().unwrap_or_else(|| config.user_id.clone());
    let layouts_dir = config.layouts_dir()?;
    info!("Using layouts in {} for user {}", layouts_dir.display(), user_id);

    let store = JsonFileStore::new(layouts_dir);
    let mut manager = LayoutManager::new(store, user_id.clone()).with_default_grid(config.grid);
    let layouts = manager.load_or_initialize()?;

    match cli.command {
        Command::List => {
            let active = config.active_layout(&user_id);
            for layout in &layouts {
                let marker = if Some(layout.id.as_str()) == active { "*" } else { " " };
                println!(
                    "{} {}  {}  ({} widgets, {}x{}, modified {})",
                    marker,
                    layout.id,
                    layout.name,
                    layout.widgets.len(),
                    layout.grid_size.cols,
                    layout.grid_size.rows,
                    layout.last_modified.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M"),
                );
            }
        }
        Command::Show { layout } => {
            let id = match layout {
                Some(layout) => resolve(&layouts, &layout)?,
                None => config
                    .active_layout(&user_id)
                    .map(str::to_owned)
                    .or_else(|| layouts.first().map(|l| l.id.clone()))
                    .ok_or_else(|| anyhow!("No layouts"))?,
            };
            let layout = manager
                .layout(&id)?
                .ok_or_else(|| anyhow!("Layout {} not found", id))?;
            print_layout(&layout);
        }
        Command::Create { name } => {
            let layout = manager.create_layout(&name)?;
            println!("{}", layout.id);
        }
        Command::Rename { layout, name } => {
            let id = resolve(&layouts, &layout)?;
            manager.rename_layout(&id, &name)?;
        }
        Command::Delete { layout } => {
            let id = resolve(&layouts, &layout)?;
            manager.delete_layout(&id)?;
            if config.active_layout(&user_id) == Some(id.as_str()) {
                config.active_layouts.remove(&user_id);
                save_config(&config, &cli.config)?;
            }
        }
        Command::Duplicate { layout } => {
            let id = resolve(&layouts, &layout)?;
            if let Some(copy) = manager.duplicate_layout(&id)? {
                println!("{}", copy.id);
            }
        }
        Command::Use { layout } => {
            let id = resolve(&layouts, &layout)?;
            config.set_active_layout(&user_id, &id);
            save_config(&config, &cli.config)?;
        }
        Command::Add {
            layout,
            widget_type,
            size,
            title,
            place,
        } => {
            let id = resolve(&layouts, &layout)?;
            let mut spec = WidgetSpec::new(widget_type, size);
            if let Some(title) = title {
                spec = spec.with_title(title);
            }
            let widget = if place {
                manager.place_widget(&id, spec)?
            } else {
                manager.add_widget(&id, spec)?
            };
            if let Some(widget) = widget {
                println!("{} at ({}, {})", widget.id, widget.position.x, widget.position.y);
            }
        }
        Command::Move {
            layout,
            widget,
            x,
            y,
            force,
        } => {
            let id = resolve(&layouts, &layout)?;
            let target = GridPosition::new(x, y);
            if !force {
                check_move(&layouts, &id, &widget, target)?;
            }
            if !manager.move_widget(&id, &widget, target)? {
                warn!("Widget {} not found", widget);
            }
        }
        Command::Resize { layout, widget, size } => {
            let id = resolve(&layouts, &layout)?;
            if !manager.resize_widget(&id, &widget, size)? {
                warn!("Widget {} not found", widget);
            }
        }
        Command::Remove { layout, widget } => {
            let id = resolve(&layouts, &layout)?;
            if !manager.remove_widget(&id, &widget)? {
                warn!("Widget {} not found", widget);
            }
        }
        Command::Visibility {
            layout,
            widget,
            visible,
        } => {
            let id = resolve(&layouts, &layout)?;
            if !manager.set_widget_visibility(&id, &widget, visible)? {
                warn!("Widget {} not found", widget);
            }
        }
        Command::Arrange { layout } => {
            let id = resolve(&layouts, &layout)?;
            manager.auto_arrange(&id)?;
            if let Some(layout) = manager.layout(&id)? {
                print_layout(&layout);
            }
        }
        Command::Export { layout, out } => {
            let id = resolve(&layouts, &layout)?;
            if let Some(path) = manager.export_to_dir(&id, &out)? {
                println!("{}", path.display());
            }
        }
        Command::Import { file } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let layout = runtime.block_on(manager.import_from_file(&file))?;
            println!("{}  {}", layout.id, layout.name);
        }
    }

    Ok(())
}

/// Accept a layout id or an exact layout name
fn resolve(layouts: &[DashboardLayout], reference: &str) -> Result<String> {
    layouts
        .iter()
        .find(|l| l.id == reference)
        .or_else(|| layouts.iter().find(|l| l.name == reference))
        .map(|l| l.id.clone())
        .ok_or_else(|| anyhow!("No layout with id or name '{}'", reference))
}

/// Refuse moves that overlap another widget or leave the grid
fn check_move(layouts: &[DashboardLayout], layout_id: &str, widget_id: &str, target: GridPosition) -> Result<()> {
    let Some(layout) = layouts.iter().find(|l| l.id == layout_id) else {
        return Ok(());
    };
    let Some(widget) = layout.widget(widget_id) else {
        return Ok(());
    };
    let footprint = size_to_footprint(widget.size);

    if !grid::fits_in_grid(target, footprint, layout.grid_size) {
        return Err(anyhow!(
            "Widget would leave the {}x{} grid (use --force to move anyway)",
            layout.grid_size.cols,
            layout.grid_size.rows
        ));
    }
    if grid::has_collision(layout, widget_id, target, footprint) {
        return Err(anyhow!("Widget would overlap another widget (use --force to move anyway)"));
    }
    Ok(())
}

fn save_config(config: &AppConfig, path: &Option<PathBuf>) -> Result<()> {
    match path {
        Some(path) => config.save_to_path(path),
        None => config.save(),
    }
}

fn print_layout(layout: &DashboardLayout) {
    println!(
        "{}  {}  ({}x{})",
        layout.id, layout.name, layout.grid_size.cols, layout.grid_size.rows
    );
    for widget in &layout.widgets {
        let footprint = size_to_footprint(widget.size);
        println!(
            "  {}  {:<12} {:<20} {:<6} ({}, {}) {}x{}{}",
            widget.id,
            widget.widget_type,
            widget.title,
            widget.size,
            widget.position.x,
            widget.position.y,
            footprint.width,
            footprint.height,
            if widget.is_visible { "" } else { "  hidden" },
        );
    }
}
