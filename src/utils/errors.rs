/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the utils module

use thiserror::Error;

/// Errors raised by the vector / matrix kernel
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// Operands whose lengths or inner dimensions do not agree
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A 3x3 matrix whose determinant is too close to zero to invert
    #[error("Matrix is singular and cannot be inverted (determinant = {determinant:e})")]
    SingularMatrix { determinant: f64 },

    /// Operand combinations that have no defined product (e.g. scalar · vector)
    #[error("Unsupported operands: {0}")]
    UnsupportedOperands(String),

    /// Input that is not the expected tensor / vector shape
    #[error("Invalid shape: {0}")]
    InvalidShape(String),
}

/// A specialized Result type for math operations
pub type Result<T> = std::result::Result<T, MathError>;
