/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! # structviz
//!
//! Structure-file parsing and periodic-boundary geometry for crystal and
//! molecule visualization.
//!
//! The crate reads POSCAR, XYZ / extended XYZ, CIF and pymatgen JSON into a
//! common [`atoms::Structure`] model, computes minimum-image distances and
//! lattice parameters, infers bonds, generates image atoms at cell
//! boundaries, and reads multi-frame trajectories into plot-ready property
//! series. All library functions work on in-memory text and never touch
//! the file system.

pub mod atoms;
pub mod bonding;
pub mod cli;
pub mod geometry;
pub mod input;
pub mod trajectory;
pub mod utils;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
