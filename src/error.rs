//! Error types for quadskip.

use crate::types::{Point, Region};
use thiserror::Error;

/// Errors surfaced by the index and its caller layer.
///
/// Lookups that find nothing are not errors; they return `None` or an empty
/// `Vec`. These variants cover malformed input and rejected mutations.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Coordinates ({x}, {y}) outside the world [0, {world_size})")]
    OutOfBounds { x: i32, y: i32, world_size: i32 },

    #[error("Invalid region: ({0})")]
    InvalidRegion(Region),

    #[error("Duplicate point: {0}")]
    Duplicate(Point),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed command: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "toml")]
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl IndexError {
    /// True for the rejections a caller reports as a refused point rather
    /// than as a failure of the run.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            IndexError::InvalidName(_)
                | IndexError::OutOfBounds { .. }
                | IndexError::InvalidRegion(_)
                | IndexError::Duplicate(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
