/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Fractional and Cartesian coordinate conversions
//!
//! Positions are row vectors: `cart = frac · M` and `frac = cart · M⁻¹`,
//! where `M` holds one lattice vector per row.

use crate::utils::{vec3_mat3x3_multiply, Matrix3x3, Vec3};

/// Convert fractional coordinates to Cartesian
pub fn frac_to_cart(frac: &Vec3, matrix: &Matrix3x3) -> Vec3 {
    vec3_mat3x3_multiply(frac, matrix)
}

/// Convert Cartesian coordinates to fractional with a precomputed inverse
pub fn cart_to_frac_with_inverse(cart: &Vec3, inverse: &Matrix3x3) -> Vec3 {
    vec3_mat3x3_multiply(cart, inverse)
}

/// Wrap a fractional coordinate into [0, 1)
pub fn wrap_fractional(frac: &Vec3) -> Vec3 {
    frac.map(|x| {
        let wrapped = x.rem_euclid(1.0);
        // rem_euclid can round up to exactly 1.0 for tiny negatives
        if wrapped >= 1.0 {
            0.0
        } else {
            wrapped
        }
    })
}
