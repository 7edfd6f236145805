/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Utility functions shared across the crate
//!
//! This module provides the vector / matrix kernel and common constants.

pub mod constants;
pub mod errors;
pub mod math;

pub use errors::{MathError, Result};
pub use math::{
    add, cell_to_lattice_matrix, determinant_3x3, dot, euclidean_dist, from_voigt,
    mat3x3_vec3_multiply, matrix_inverse_3x3, norm, scale, tensor_to_flat_array, to_voigt,
    transpose_matrix, vec3_mat3x3_multiply, vec9_to_mat3x3, DotOperand, DotProduct, Matrix3x3,
    Vec3,
};
