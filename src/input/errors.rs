/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for structure file parsing

use thiserror::Error;

use super::config::StructureFormat;
use super::unsupported::UnsupportedFormat;
use crate::utils::MathError;

/// Errors that can occur while reading a structure file
#[derive(Error, Debug)]
pub enum InputError {
    #[error("{format} parse error{}: {message}", on_line(.line))]
    Parse {
        format: StructureFormat,
        line: Option<usize>,
        message: String,
    },

    #[error("Invalid lattice vector on line {line}: expected 3 coordinates, got {found}")]
    InvalidLatticeVector { line: usize, found: usize },

    #[error("Atom count mismatch: expected {expected} atoms, found {found}")]
    AtomCountMismatch { expected: usize, found: usize },

    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unable to determine file format: {0}")]
    UnknownFormat(String),

    #[error("Unsupported format: {}", .0.format_name)]
    Unsupported(UnsupportedFormat),

    #[error("Empty input: {0}")]
    Empty(String),
}

fn on_line(line: &Option<usize>) -> String {
    line.map(|l| format!(" on line {}", l)).unwrap_or_default()
}

impl InputError {
    /// A parse error tied to a 1-based line number
    pub fn at_line(format: StructureFormat, line: usize, message: impl Into<String>) -> Self {
        InputError::Parse {
            format,
            line: Some(line),
            message: message.into(),
        }
    }

    /// A parse error not tied to a particular line
    pub fn parse(format: StructureFormat, message: impl Into<String>) -> Self {
        InputError::Parse {
            format,
            line: None,
            message: message.into(),
        }
    }
}

/// Result type for input operations
pub type Result<T> = std::result::Result<T, InputError>;
