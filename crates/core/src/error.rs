//! Error type shared by the layout engine and storage

/// Errors raised by layout storage and import
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// An imported file failed version or shape validation
    #[error("Invalid layout format: {0}")]
    InvalidFormat(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
