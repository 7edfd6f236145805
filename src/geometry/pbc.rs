/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Minimum-image distances under periodic boundary conditions

use crate::atoms::coordinates::{cart_to_frac_with_inverse, frac_to_cart};
use crate::utils::math::sub3;
use crate::utils::{matrix_inverse_3x3, norm, Matrix3x3, Result, Vec3};

/// Wrap a fractional difference into [-0.5, 0.5)
fn minimum_image(delta: f64) -> f64 {
    let wrapped = delta - delta.floor();
    if wrapped >= 0.5 {
        wrapped - 1.0
    } else {
        wrapped
    }
}

fn minimum_image_distance(pos1: &Vec3, pos2: &Vec3, lattice: &Matrix3x3, inverse: &Matrix3x3) -> f64 {
    let frac1 = cart_to_frac_with_inverse(pos1, inverse);
    let frac2 = cart_to_frac_with_inverse(pos2, inverse);
    let delta = sub3(frac1, frac2).map(minimum_image);
    norm(&frac_to_cart(&delta, lattice))
}

/// Distance between two Cartesian positions under the minimum-image convention
///
/// Pass `lattice_inv` to skip inverting `lattice` on every call.
///
/// # Examples
///
/// ```
/// use structviz::geometry::pbc_dist;
///
/// let cubic = [[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]];
/// let d = pbc_dist(&[1.0, 0.0, 0.0], &[9.0, 0.0, 0.0], &cubic, None).unwrap();
/// assert!((d - 2.0).abs() < 1e-10);
/// ```
pub fn pbc_dist(
    pos1: &Vec3,
    pos2: &Vec3,
    lattice: &Matrix3x3,
    lattice_inv: Option<&Matrix3x3>,
) -> Result<f64> {
    let computed;
    let inverse = match lattice_inv {
        Some(inv) => inv,
        None => {
            computed = matrix_inverse_3x3(lattice)?;
            &computed
        }
    };
    Ok(minimum_image_distance(pos1, pos2, lattice, inverse))
}

/// Repeated minimum-image queries against one lattice
#[derive(Debug, Clone)]
pub struct PbcDistance {
    lattice: Matrix3x3,
    inverse: Matrix3x3,
}

impl PbcDistance {
    /// Fails when the lattice is singular
    pub fn new(lattice: &Matrix3x3) -> Result<Self> {
        Ok(Self {
            lattice: *lattice,
            inverse: matrix_inverse_3x3(lattice)?,
        })
    }

    pub fn distance(&self, pos1: &Vec3, pos2: &Vec3) -> f64 {
        minimum_image_distance(pos1, pos2, &self.lattice, &self.inverse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_minimum_image_wrap() {
        assert_relative_eq!(minimum_image(0.8), -0.2, epsilon = 1e-12);
        assert_relative_eq!(minimum_image(-0.8), 0.2, epsilon = 1e-12);
        assert_relative_eq!(minimum_image(0.5), -0.5);
        assert_relative_eq!(minimum_image(-0.5), -0.5);
        assert_relative_eq!(minimum_image(2.25), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_cached_matches_direct() {
        let lattice = [[5.0, 0.0, 0.0], [1.0, 4.5, 0.0], [0.5, 0.5, 6.0]];
        let cache = PbcDistance::new(&lattice).unwrap();
        let (p1, p2) = ([0.2, 0.1, 0.3], [5.6, 4.4, 5.9]);
        assert_relative_eq!(
            cache.distance(&p1, &p2),
            pbc_dist(&p1, &p2, &lattice, None).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_singular_lattice_fails() {
        let lattice = [[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        assert!(pbc_dist(&[0.0; 3], &[0.5; 3], &lattice, None).is_err());
        assert!(PbcDistance::new(&lattice).is_err());
    }
}
