/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for trajectory parsing

use thiserror::Error;

use crate::input::{InputError, UnsupportedFormat};
use crate::utils::MathError;

/// Errors that can occur while reading a trajectory
#[derive(Error, Debug)]
pub enum TrajectoryError {
    #[error("Trajectory parse error: {0}")]
    Parse(String),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported format: {}", .0.format_name)]
    Unsupported(UnsupportedFormat),

    #[error("No frames found: {0}")]
    NoFrames(String),
}

/// Result type for trajectory operations
pub type Result<T> = std::result::Result<T, TrajectoryError>;
