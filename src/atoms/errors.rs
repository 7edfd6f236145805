/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the atoms module

use crate::utils::MathError;

/// Error types for the structure data model
#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    #[error("Structure has no lattice")]
    MissingLattice,

    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

/// Result type for structure operations
pub type Result<T> = std::result::Result<T, StructureError>;
