/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Lattice geometry under periodic boundary conditions

pub mod images;
pub mod lattice_params;
pub mod pbc;

pub use images::{find_image_atoms, get_pbc_image_sites, is_trajectory_like, ImageAtom, ImageAtomOptions};
pub use lattice_params::{calc_lattice_params, LatticeParams};
pub use pbc::{pbc_dist, PbcDistance};
