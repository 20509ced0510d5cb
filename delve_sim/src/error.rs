// Error types for grid access and configuration loading.
//
// Only construction and strict (non-"try") accessors produce errors. World
// queries degrade to `BlockType::None`, pathfinding reports "no path" as an
// outcome, and room placement shortfalls are logged, so none of those appear
// here.

use crate::types::VoxelCoord;
use std::fmt;

/// Errors from `Grid` construction and strict indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A strict accessor was called with a coordinate outside `[0, size)`.
    OutOfRange { coord: VoxelCoord, size: VoxelCoord },
    /// A grid was constructed with a zero or negative dimension.
    NonPositiveDimension { size: VoxelCoord },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::OutOfRange { coord, size } => {
                write!(f, "cell {coord} is outside grid of size {size}")
            }
            GridError::NonPositiveDimension { size } => {
                write!(f, "grid size {size} has a zero or negative dimension")
            }
        }
    }
}

impl std::error::Error for GridError {}

/// Errors from loading or validating a `WorldConfig`.
#[derive(Debug)]
pub enum ConfigError {
    /// Reading the config file failed.
    Io(std::io::Error),
    /// The config JSON did not parse.
    Json(serde_json::Error),
    /// The config parsed but violates a constraint.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {e}"),
            ConfigError::Json(e) => write!(f, "JSON error: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}
