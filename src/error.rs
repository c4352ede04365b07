//! Error types for world generation
//!
//! Invalid configuration fails before any grid is allocated. Sampling that runs
//! out of valid terrain is not an error; those stages return partial results.

use thiserror::Error;

/// Errors that can occur while generating a world.
#[derive(Error, Debug)]
pub enum WorldGenError {
    /// A generation parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The seed could not be reduced to an integer.
    #[error("invalid seed {0:?}: seeds must be integers or text, not non-finite numbers")]
    InvalidSeed(String),

    /// A grid with zero cells was requested.
    #[error("grid must have at least one cell, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    /// Grids consumed together have different dimensions.
    #[error("grid shape mismatch: expected {expected_width}x{expected_height}, got {width}x{height}")]
    ShapeMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },

    /// A grid cell held NaN where a number was required.
    #[error("non-finite value at ({x}, {y}) entering {stage}")]
    NonFiniteInput {
        stage: &'static str,
        x: usize,
        y: usize,
    },

    /// Generation was cancelled between two stages.
    #[error("generation cancelled before {stage}")]
    Cancelled { stage: &'static str },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WorldGenError>;
