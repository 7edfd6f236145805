/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Lattice parameters derived from a lattice matrix

use serde::{Deserialize, Serialize};

use crate::utils::constants::RAD_TO_DEG;
use crate::utils::math::{cross3, dot3};
use crate::utils::{norm, Matrix3x3};

/// Cell lengths (Angstrom), angles (degrees) and volume (cubic Angstrom)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatticeParams {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub volume: f64,
}

impl LatticeParams {
    /// `[a, b, c, alpha, beta, gamma]`
    pub fn as_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.alpha, self.beta, self.gamma]
    }
}

fn angle_between(u: &[f64; 3], v: &[f64; 3], len_u: f64, len_v: f64) -> f64 {
    if len_u == 0.0 || len_v == 0.0 {
        return 0.0;
    }
    let cos = (dot3(*u, *v) / (len_u * len_v)).clamp(-1.0, 1.0);
    cos.acos() * RAD_TO_DEG
}

/// Compute lattice parameters from row lattice vectors
///
/// `alpha` is the angle between b and c, `beta` between a and c and
/// `gamma` between a and b. Volume is the absolute triple product.
pub fn calc_lattice_params(matrix: &Matrix3x3) -> LatticeParams {
    let [va, vb, vc] = matrix;
    let (a, b, c) = (norm(va), norm(vb), norm(vc));

    LatticeParams {
        a,
        b,
        c,
        alpha: angle_between(vb, vc, b, c),
        beta: angle_between(va, vc, a, c),
        gamma: angle_between(va, vb, a, b),
        volume: dot3(*va, cross3(*vb, *vc)).abs(),
    }
}
