//! studydash-core: Grid layout engine and layout storage for studydash.
//!
//! This crate contains the stateless grid math used by drag-and-drop and
//! auto-arrange, the [`LayoutStore`] abstraction every layout mutation goes
//! through, and the shared error type.

mod error;
pub mod grid;
pub mod store;

pub use error::{DashboardError, Result};
pub use store::{storage_key, JsonFileStore, LayoutStore, MemoryStore, BACKUP_SUFFIX};

// Re-export the data types for convenience
pub use studydash_types as types;
