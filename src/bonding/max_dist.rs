/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Fixed distance window bonding

use serde::{Deserialize, Serialize};

use super::{for_each_pair, BondPair};
use crate::atoms::Structure;

/// Options for [`max_dist`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaxDistOptions {
    /// Exclusive lower bound in Angstrom
    pub min_bond_dist: f64,
    /// Exclusive upper bound in Angstrom
    pub max_bond_dist: f64,
}

impl Default for MaxDistOptions {
    fn default() -> Self {
        Self {
            min_bond_dist: 0.1,
            max_bond_dist: 3.0,
        }
    }
}

/// Bond every pair whose distance lies strictly between the two bounds
pub fn max_dist(structure: &Structure, options: &MaxDistOptions) -> Vec<BondPair> {
    let min_sq = options.min_bond_dist * options.min_bond_dist;
    let max_sq = options.max_bond_dist * options.max_bond_dist;

    let mut bonds = Vec::new();
    for_each_pair(structure, |i, j, dist_sq| {
        if dist_sq > min_sq && dist_sq < max_sq {
            bonds.push(BondPair::between(structure, i, j, dist_sq.sqrt()));
        }
    });
    bonds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::Site;

    #[test]
    fn test_window_is_open() {
        let structure = Structure::molecule(vec![
            Site::single("C", [0.0; 3], [0.0, 0.0, 0.0], "C1"),
            Site::single("C", [0.0; 3], [3.0, 0.0, 0.0], "C2"),
            Site::single("C", [0.0; 3], [1.5, 0.0, 0.0], "C3"),
            Site::single("C", [0.0; 3], [1.55, 0.0, 0.0], "C4"),
        ]);
        let bonds = max_dist(&structure, &MaxDistOptions::default());
        let pairs: Vec<_> = bonds.iter().map(|b| (b.from_index, b.to_index)).collect();
        // 0-1 sits exactly on the upper bound and 2-3 is below 0.1
        assert_eq!(pairs, vec![(0, 2), (0, 3), (1, 2), (1, 3)]);
    }
}
