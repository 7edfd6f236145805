/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Bond inference
//!
//! Three distance-based strategies over a structure's Cartesian site
//! positions. Every strategy returns pairs with `from_index < to_index`,
//! each unordered pair at most once, in increasing order.

pub mod max_dist;
pub mod nearest_neighbor;
pub mod vdw;

use serde::{Deserialize, Serialize};

use crate::atoms::Structure;
use crate::utils::Vec3;

pub use crate::atoms::RadiusKind;
pub use max_dist::{max_dist, MaxDistOptions};
pub use nearest_neighbor::{nearest_neighbor, NearestNeighborOptions};
pub use vdw::{vdw_radius_based, VdwOptions};

/// A bond between two sites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondPair {
    pub from_xyz: Vec3,
    pub to_xyz: Vec3,
    pub from_index: usize,
    pub to_index: usize,
    pub distance: f64,
}

impl BondPair {
    fn between(structure: &Structure, from_index: usize, to_index: usize, distance: f64) -> Self {
        Self {
            from_xyz: structure.sites[from_index].xyz,
            to_xyz: structure.sites[to_index].xyz,
            from_index,
            to_index,
            distance,
        }
    }
}

/// Bonding strategy together with its options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum BondingAlgorithm {
    MaxDist(MaxDistOptions),
    NearestNeighbor(NearestNeighborOptions),
    #[serde(rename = "vdw")]
    VdwRadius(VdwOptions),
}

impl Default for BondingAlgorithm {
    fn default() -> Self {
        BondingAlgorithm::NearestNeighbor(NearestNeighborOptions::default())
    }
}

impl BondingAlgorithm {
    /// Run the strategy against a structure
    pub fn bonds(&self, structure: &Structure) -> Vec<BondPair> {
        match self {
            BondingAlgorithm::MaxDist(opts) => max_dist(structure, opts),
            BondingAlgorithm::NearestNeighbor(opts) => nearest_neighbor(structure, opts),
            BondingAlgorithm::VdwRadius(opts) => vdw_radius_based(structure, opts),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BondingAlgorithm::MaxDist(_) => "max_dist",
            BondingAlgorithm::NearestNeighbor(_) => "nearest_neighbor",
            BondingAlgorithm::VdwRadius(_) => "vdw",
        }
    }
}

fn squared_distance(a: &Vec3, b: &Vec3) -> f64 {
    let (dx, dy, dz) = (b[0] - a[0], b[1] - a[1], b[2] - a[2]);
    dx * dx + dy * dy + dz * dz
}

/// Visit every unordered pair `(i, j)` with `i < j` in row order
fn for_each_pair(structure: &Structure, mut visit: impl FnMut(usize, usize, f64)) {
    let sites = &structure.sites;
    for i in 0..sites.len() {
        for j in (i + 1)..sites.len() {
            visit(i, j, squared_distance(&sites[i].xyz, &sites[j].xyz));
        }
    }
}
