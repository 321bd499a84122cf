//! Error types for the fallible edges of the crate
//!
//! The simulation itself never fails: misuse is a no-op and configuration
//! problems are logged. These errors cover files and external lookups.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShiftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown item: {0}")]
    UnknownItem(String),
}

/// Why a visual request could not be honoured
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisualError {
    #[error("no asset for item '{0}'")]
    MissingAsset(String),

    #[error("no spawn point configured")]
    NoSpawnPoint,
}
