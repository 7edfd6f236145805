/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Periodic lattice
//!
//! The derived parameters are computed from the matrix on construction and
//! cannot be changed independently of it.

use serde::{Deserialize, Serialize};

use super::coordinates::frac_to_cart;
use crate::geometry::lattice_params::{calc_lattice_params, LatticeParams};
use crate::utils::{cell_to_lattice_matrix, matrix_inverse_3x3, Matrix3x3, Result, Vec3};

/// A crystal lattice with its row lattice vectors and derived parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LatticeRepr")]
pub struct Lattice {
    matrix: Matrix3x3,
    pbc: [bool; 3],
    a: f64,
    b: f64,
    c: f64,
    alpha: f64,
    beta: f64,
    gamma: f64,
    volume: f64,
}

/// Serialized form; only the matrix and periodicity are trusted on input
#[derive(Deserialize)]
struct LatticeRepr {
    matrix: Matrix3x3,
    #[serde(default = "periodic")]
    pbc: [bool; 3],
}

fn periodic() -> [bool; 3] {
    [true; 3]
}

impl From<LatticeRepr> for Lattice {
    fn from(repr: LatticeRepr) -> Self {
        Lattice::with_pbc(repr.matrix, repr.pbc)
    }
}

impl Lattice {
    /// A fully periodic lattice from row lattice vectors
    pub fn from_matrix(matrix: Matrix3x3) -> Self {
        Self::with_pbc(matrix, periodic())
    }

    pub fn with_pbc(matrix: Matrix3x3, pbc: [bool; 3]) -> Self {
        let LatticeParams {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
            volume,
        } = calc_lattice_params(&matrix);
        Self {
            matrix,
            pbc,
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
            volume,
        }
    }

    /// A lattice from cell lengths and angles in degrees
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        Self::from_matrix(cell_to_lattice_matrix(a, b, c, alpha, beta, gamma))
    }

    pub fn matrix(&self) -> &Matrix3x3 {
        &self.matrix
    }

    pub fn pbc(&self) -> [bool; 3] {
        self.pbc
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn params(&self) -> LatticeParams {
        LatticeParams {
            a: self.a,
            b: self.b,
            c: self.c,
            alpha: self.alpha,
            beta: self.beta,
            gamma: self.gamma,
            volume: self.volume,
        }
    }

    /// Inverse of the lattice matrix
    pub fn inverse(&self) -> Result<Matrix3x3> {
        matrix_inverse_3x3(&self.matrix)
    }

    pub fn frac_to_cart(&self, frac: &Vec3) -> Vec3 {
        frac_to_cart(frac, &self.matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::coordinates::cart_to_frac_with_inverse;
    use approx::assert_relative_eq;

    #[test]
    fn test_derived_parameters() {
        let lattice = Lattice::from_matrix([[4.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 6.0]]);
        assert_relative_eq!(lattice.volume(), 120.0);
        assert_relative_eq!(lattice.b(), 5.0);
        assert_eq!(lattice.pbc(), [true; 3]);
    }

    #[test]
    fn test_deserialize_recomputes_parameters() {
        let json = r#"{"matrix": [[2,0,0],[0,2,0],[0,0,2]], "a": 99.0, "volume": 1.0}"#;
        let lattice: Lattice = serde_json::from_str(json).unwrap();
        assert_relative_eq!(lattice.a(), 2.0);
        assert_relative_eq!(lattice.volume(), 8.0);

        let round_trip: Lattice =
            serde_json::from_str(&serde_json::to_string(&lattice).unwrap()).unwrap();
        assert_eq!(round_trip, lattice);
    }

    #[test]
    fn test_inverse_round_trip() {
        let lattice = Lattice::from_parameters(4.0, 4.0, 6.0, 90.0, 90.0, 120.0);
        let cart = lattice.frac_to_cart(&[0.3, 0.4, 0.5]);
        let frac = [cart_to_frac_with_inverse(&cart, &lattice.inverse().unwrap())];
        assert_relative_eq!(frac[0][0], 0.3, epsilon = 1e-12);
        assert_relative_eq!(frac[0][1], 0.4, epsilon = 1e-12);
        assert_relative_eq!(frac[0][2], 0.5, epsilon = 1e-12);
    }
}
