/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Bonding relative to each atom's nearest neighbor

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{squared_distance, BondPair};
use crate::atoms::Structure;

/// Site count from which distance matrix rows are computed in parallel
const PARALLEL_THRESHOLD: usize = 256;

/// Options for [`nearest_neighbor`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NearestNeighborOptions {
    /// Multiple of the nearest-neighbor distance still counted as bonded
    pub scaling_factor: f64,
    /// Distances at or below this are ignored, in Angstrom
    pub min_bond_dist: f64,
}

impl Default for NearestNeighborOptions {
    fn default() -> Self {
        Self {
            scaling_factor: 1.3,
            min_bond_dist: 0.1,
        }
    }
}

fn distance_row(structure: &Structure, i: usize) -> Vec<f64> {
    let origin = &structure.sites[i].xyz;
    structure
        .sites
        .iter()
        .map(|site| squared_distance(origin, &site.xyz).sqrt())
        .collect()
}

/// Full symmetric distance matrix
pub fn distance_matrix(structure: &Structure) -> Vec<Vec<f64>> {
    let n = structure.sites.len();
    if n >= PARALLEL_THRESHOLD {
        (0..n).into_par_iter().map(|i| distance_row(structure, i)).collect()
    } else {
        (0..n).map(|i| distance_row(structure, i)).collect()
    }
}

/// Bond each atom to neighbors within `scaling_factor` times its nearest distance
///
/// A pair is bonded when its distance is within the scaled nearest-neighbor
/// distance of either atom.
pub fn nearest_neighbor(structure: &Structure, options: &NearestNeighborOptions) -> Vec<BondPair> {
    let n = structure.sites.len();
    if n < 2 {
        return Vec::new();
    }

    let distances = distance_matrix(structure);
    let nearest: Vec<f64> = distances
        .iter()
        .map(|row| {
            row.iter()
                .copied()
                .filter(|&d| d > options.min_bond_dist)
                .fold(f64::INFINITY, f64::min)
        })
        .collect();

    let mut bonds = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let d = distances[i][j];
            if d <= options.min_bond_dist {
                continue;
            }
            if d <= options.scaling_factor * nearest[i] || d <= options.scaling_factor * nearest[j] {
                bonds.push(BondPair::between(structure, i, j, d));
            }
        }
    }
    bonds
}
