/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Physical and numerical constants

/// Unified atomic mass units per cubic Angstrom to grams per cubic centimetre
pub const AMU_PER_A3_TO_G_PER_CM3: f64 = 1.66053907;

/// Determinant magnitude below which a 3x3 matrix is treated as singular
pub const SINGULAR_DETERMINANT: f64 = 1e-10;

/// Conversion factor from degrees to radians
pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// Conversion factor from radians to degrees
pub const RAD_TO_DEG: f64 = 180.0 / std::f64::consts::PI;
