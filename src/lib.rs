//! studydash: A widget dashboard layout engine
//!
//! This library provides the core functionality for studydash, including:
//! - Drop zone registry and drag coordination for dashboard widgets
//! - Mouse and touch gesture adapters
//! - Per-user layout persistence with export and import
//! - Configuration management

pub mod config;
pub mod core;

// Re-export commonly used types
pub use crate::config::AppConfig;
pub use crate::core::{DragCoordinator, DropZone, DropZoneRegistry, LayoutManager};
pub use studydash_core::{grid, DashboardError, JsonFileStore, LayoutStore, MemoryStore};
pub use studydash_types as types;
