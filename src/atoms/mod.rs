/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Structure data model
//!
//! Species, sites, lattices and structures, the element data table, and
//! coordinate conversions between fractional and Cartesian space.

pub mod coordinates;
pub mod database;
pub mod errors;
pub mod lattice;
pub mod site;
pub mod structure;

pub use coordinates::{cart_to_frac_with_inverse, frac_to_cart, wrap_fractional};
pub use database::{ElementData, ElementTable, RadiusKind};
pub use errors::{Result, StructureError};
pub use lattice::Lattice;
pub use site::{Site, Species};
pub use structure::Structure;
