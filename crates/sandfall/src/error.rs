//! Error types for grid operations and configuration.

use thiserror::Error;

use crate::cell::Position;

pub type Result<T> = std::result::Result<T, GridError>;

/// Precondition failures of the grid store.
///
/// The public grid API panics with these; the `try_*` variants return them.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("position {pos} is outside the {width}x{height} grid")]
    OutOfBounds {
        pos: Position,
        width: usize,
        height: usize,
    },

    #[error("no cell at position {0}")]
    NotFound(Position),

    #[error("position {0} is already occupied")]
    Occupied(Position),

    #[error("cell {id} is not indexed at {pos}")]
    Misplaced { id: usize, pos: Position },

    #[error("cell weight must be positive")]
    ZeroWeight,
}

/// Rejected startup configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("a {width}x{height} grid does not fit in memory")]
    GridTooLarge { width: usize, height: usize },

    #[error("updates_per_second must be positive and finite, got {0}")]
    UpdateRate(f64),

    #[error("{name} must be a non-negative finite number, got {value}")]
    Probability { name: &'static str, value: f64 },

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}
