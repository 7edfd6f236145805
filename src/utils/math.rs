/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Vector and matrix kernel
//!
//! Small, allocation-light helpers for 3-vectors, 3x3 lattice matrices and
//! arbitrary-length numeric vectors. Lattice matrices are row-major with one
//! lattice vector per row.

use super::constants::{DEG_TO_RAD, SINGULAR_DETERMINANT};
use super::errors::{MathError, Result};

/// A 3-component vector (Cartesian or fractional coordinates)
pub type Vec3 = [f64; 3];

/// A 3x3 matrix stored as three row vectors
pub type Matrix3x3 = [Vec3; 3];

/// Euclidean norm of a vector of any length
pub fn norm(vec: &[f64]) -> f64 {
    vec.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Multiply every component of a vector by `factor`
pub fn scale(vec: &[f64], factor: f64) -> Vec<f64> {
    vec.iter().map(|v| v * factor).collect()
}

/// Add up any number of equal-length vectors
///
/// Returns an empty vector when called without operands.
pub fn add(vecs: &[&[f64]]) -> Result<Vec<f64>> {
    let Some(first) = vecs.first() else {
        return Ok(Vec::new());
    };
    let length = first.len();

    if let Some(bad) = vecs.iter().find(|v| v.len() != length) {
        return Err(MathError::DimensionMismatch(format!(
            "All vectors must have the same length (expected {}, got {})",
            length,
            bad.len()
        )));
    }

    let mut result = vec![0.0; length];
    for vec in vecs {
        for (acc, val) in result.iter_mut().zip(vec.iter()) {
            *acc += val;
        }
    }
    Ok(result)
}

/// Component-wise sum of two 3-vectors
pub fn add3(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// Component-wise difference `a - b` of two 3-vectors
pub fn sub3(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Scale a 3-vector
pub fn scale3(a: Vec3, factor: f64) -> Vec3 {
    [a[0] * factor, a[1] * factor, a[2] * factor]
}

/// Dot product of two 3-vectors
pub fn dot3(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Cross product of two 3-vectors
pub fn cross3(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Straight-line distance between two points
pub fn euclidean_dist(a: &Vec3, b: &Vec3) -> f64 {
    norm(&sub3(*a, *b))
}

/// An operand of [`dot`]
#[derive(Debug, Clone, PartialEq)]
pub enum DotOperand {
    Scalar(f64),
    Vector(Vec<f64>),
    Matrix(Vec<Vec<f64>>),
}

/// The result of [`dot`], typed by the shapes that produced it
#[derive(Debug, Clone, PartialEq)]
pub enum DotProduct {
    /// vector · vector
    Scalar(f64),
    /// matrix · vector
    Vector(Vec<f64>),
    /// matrix · matrix
    Matrix(Vec<Vec<f64>>),
}

impl From<f64> for DotOperand {
    fn from(value: f64) -> Self {
        DotOperand::Scalar(value)
    }
}

impl From<Vec<f64>> for DotOperand {
    fn from(value: Vec<f64>) -> Self {
        DotOperand::Vector(value)
    }
}

impl From<&[f64]> for DotOperand {
    fn from(value: &[f64]) -> Self {
        DotOperand::Vector(value.to_vec())
    }
}

impl From<Vec3> for DotOperand {
    fn from(value: Vec3) -> Self {
        DotOperand::Vector(value.to_vec())
    }
}

impl From<Vec<Vec<f64>>> for DotOperand {
    fn from(value: Vec<Vec<f64>>) -> Self {
        DotOperand::Matrix(value)
    }
}

impl From<Matrix3x3> for DotOperand {
    fn from(value: Matrix3x3) -> Self {
        DotOperand::Matrix(value.iter().map(|row| row.to_vec()).collect())
    }
}

impl DotProduct {
    /// The scalar result, if this was a vector · vector product
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            DotProduct::Scalar(s) => Some(*s),
            _ => None,
        }
    }

    /// The vector result, if this was a matrix · vector product
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            DotProduct::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// The matrix result, if this was a matrix · matrix product
    pub fn as_matrix(&self) -> Option<&[Vec<f64>]> {
        match self {
            DotProduct::Matrix(m) => Some(m),
            _ => None,
        }
    }
}

/// Dot product dispatched on operand shape
///
/// Supported combinations are vector · vector, matrix · vector and
/// matrix · matrix. Any scalar operand is rejected, as is vector · matrix.
pub fn dot(x1: impl Into<DotOperand>, x2: impl Into<DotOperand>) -> Result<DotProduct> {
    match (x1.into(), x2.into()) {
        (DotOperand::Scalar(_), DotOperand::Scalar(_)) => Err(MathError::UnsupportedOperands(
            "Scalar and scalar multiplication is not supported".to_string(),
        )),
        (DotOperand::Scalar(_), _) => Err(MathError::UnsupportedOperands(
            "Scalar and vector multiplication is not supported".to_string(),
        )),
        (_, DotOperand::Scalar(_)) => Err(MathError::UnsupportedOperands(
            "Vector and scalar multiplication is not supported".to_string(),
        )),
        (DotOperand::Vector(a), DotOperand::Vector(b)) => dot_vectors(&a, &b).map(DotProduct::Scalar),
        (DotOperand::Matrix(m), DotOperand::Vector(v)) => {
            matrix_vector_product(&m, &v).map(DotProduct::Vector)
        }
        (DotOperand::Matrix(a), DotOperand::Matrix(b)) => {
            matrix_matrix_product(&a, &b).map(DotProduct::Matrix)
        }
        (DotOperand::Vector(_), DotOperand::Matrix(_)) => Err(MathError::UnsupportedOperands(
            "Vector and matrix multiplication is not supported".to_string(),
        )),
    }
}

/// Inner product of two equal-length vectors
pub fn dot_vectors(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(MathError::DimensionMismatch(format!(
            "Vectors must be of same length ({} vs {})",
            a.len(),
            b.len()
        )));
    }
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

fn column_count(matrix: &[Vec<f64>]) -> Result<usize> {
    let cols = matrix.first().map_or(0, Vec::len);
    if matrix.iter().any(|row| row.len() != cols) {
        return Err(MathError::InvalidShape(
            "Matrix rows must all have the same length".to_string(),
        ));
    }
    Ok(cols)
}

fn matrix_vector_product(matrix: &[Vec<f64>], vector: &[f64]) -> Result<Vec<f64>> {
    let cols = column_count(matrix)?;
    if cols != vector.len() {
        return Err(MathError::DimensionMismatch(format!(
            "Number of columns in matrix ({}) must be equal to number of elements in vector ({})",
            cols,
            vector.len()
        )));
    }
    Ok(matrix
        .iter()
        .map(|row| row.iter().zip(vector).map(|(a, b)| a * b).sum())
        .collect())
}

fn matrix_matrix_product(a: &[Vec<f64>], b: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let inner = column_count(a)?;
    let cols = column_count(b)?;
    if inner != b.len() {
        return Err(MathError::DimensionMismatch(format!(
            "Number of columns in first matrix ({}) must be equal to number of rows in second matrix ({})",
            inner,
            b.len()
        )));
    }
    Ok(a.iter()
        .map(|row| {
            (0..cols)
                .map(|j| row.iter().enumerate().map(|(k, val)| val * b[k][j]).sum())
                .collect()
        })
        .collect())
}

/// Determinant of a 3x3 matrix
pub fn determinant_3x3(m: &Matrix3x3) -> f64 {
    let [[a, b, c], [d, e, f], [g, h, i]] = *m;
    a * (e * i - f * h) - b * (d * i - f * g) + c * (d * h - e * g)
}

/// Inverse of a 3x3 matrix via the adjugate
///
/// Fails with [`MathError::SingularMatrix`] when `|det| < 1e-10`.
pub fn matrix_inverse_3x3(matrix: &Matrix3x3) -> Result<Matrix3x3> {
    let [[a, b, c], [d, e, f], [g, h, i]] = *matrix;
    let det = determinant_3x3(matrix);

    if det.abs() < SINGULAR_DETERMINANT {
        return Err(MathError::SingularMatrix { determinant: det });
    }

    let inv_det = 1.0 / det;
    Ok([
        [
            (e * i - f * h) * inv_det,
            (c * h - b * i) * inv_det,
            (b * f - c * e) * inv_det,
        ],
        [
            (f * g - d * i) * inv_det,
            (a * i - c * g) * inv_det,
            (c * d - a * f) * inv_det,
        ],
        [
            (d * h - e * g) * inv_det,
            (b * g - a * h) * inv_det,
            (a * e - b * d) * inv_det,
        ],
    ])
}

/// Transpose of a 3x3 matrix
pub fn transpose_matrix(m: &Matrix3x3) -> Matrix3x3 {
    [
        [m[0][0], m[1][0], m[2][0]],
        [m[0][1], m[1][1], m[2][1]],
        [m[0][2], m[1][2], m[2][2]],
    ]
}

/// Matrix times column vector, `M · v`
pub fn mat3x3_vec3_multiply(m: &Matrix3x3, v: &Vec3) -> Vec3 {
    [dot3(m[0], *v), dot3(m[1], *v), dot3(m[2], *v)]
}

/// Row vector times matrix, `v · M`
///
/// With a row-major lattice this maps fractional to Cartesian coordinates.
pub fn vec3_mat3x3_multiply(v: &Vec3, m: &Matrix3x3) -> Vec3 {
    [
        v[0] * m[0][0] + v[1] * m[1][0] + v[2] * m[2][0],
        v[0] * m[0][1] + v[1] * m[1][1] + v[2] * m[2][1],
        v[0] * m[0][2] + v[1] * m[1][2] + v[2] * m[2][2],
    ]
}

fn check_3x3<R: AsRef<[f64]>>(tensor: &[R]) -> Result<()> {
    if tensor.len() != 3 || tensor.iter().any(|row| row.as_ref().len() != 3) {
        return Err(MathError::InvalidShape(format!(
            "Expected 3x3 tensor, got {} rows",
            tensor.len()
        )));
    }
    Ok(())
}

/// Convert a symmetric 3x3 tensor to Voigt notation
///
/// Component order is `[s11, s22, s33, s23, s13, s12]`.
pub fn to_voigt<R: AsRef<[f64]>>(tensor: &[R]) -> Result<[f64; 6]> {
    check_3x3(tensor)?;
    let t = |i: usize, j: usize| tensor[i].as_ref()[j];
    Ok([t(0, 0), t(1, 1), t(2, 2), t(1, 2), t(0, 2), t(0, 1)])
}

/// Expand a 6-component Voigt vector back to a symmetric 3x3 tensor
pub fn from_voigt(voigt: &[f64]) -> Result<Matrix3x3> {
    let [s11, s22, s33, s23, s13, s12] = voigt else {
        return Err(MathError::InvalidShape(format!(
            "Expected 6-element Voigt vector, got {} elements",
            voigt.len()
        )));
    };
    Ok([[*s11, *s12, *s13], [*s12, *s22, *s23], [*s13, *s23, *s33]])
}

/// Reshape a flat row-major 9-element array to a 3x3 matrix
pub fn vec9_to_mat3x3(flat: &[f64]) -> Result<Matrix3x3> {
    if flat.len() != 9 {
        return Err(MathError::InvalidShape(format!(
            "Expected 9-element array, got {} elements",
            flat.len()
        )));
    }
    Ok([
        [flat[0], flat[1], flat[2]],
        [flat[3], flat[4], flat[5]],
        [flat[6], flat[7], flat[8]],
    ])
}

/// Flatten a 3x3 tensor to a row-major 9-element array
pub fn tensor_to_flat_array<R: AsRef<[f64]>>(tensor: &[R]) -> Result<[f64; 9]> {
    check_3x3(tensor)?;
    let mut flat = [0.0; 9];
    for (i, row) in tensor.iter().enumerate() {
        flat[i * 3..i * 3 + 3].copy_from_slice(row.as_ref());
    }
    Ok(flat)
}

/// Lattice matrix from cell lengths (Angstrom) and angles (degrees)
///
/// `a` lies along x, `b` in the xy-plane, `c` completes the cell.
pub fn cell_to_lattice_matrix(
    a: f64,
    b: f64,
    c: f64,
    alpha: f64,
    beta: f64,
    gamma: f64,
) -> Matrix3x3 {
    let (cos_a, cos_b) = ((alpha * DEG_TO_RAD).cos(), (beta * DEG_TO_RAD).cos());
    let (sin_g, cos_g) = (gamma * DEG_TO_RAD).sin_cos();

    let volume_factor =
        (1.0 - cos_a * cos_a - cos_b * cos_b - cos_g * cos_g + 2.0 * cos_a * cos_b * cos_g).sqrt();

    [
        [a, 0.0, 0.0],
        [b * cos_g, b * sin_g, 0.0],
        [
            c * cos_b,
            c * (cos_a - cos_b * cos_g) / sin_g,
            c * volume_factor / sin_g,
        ],
    ]
}
