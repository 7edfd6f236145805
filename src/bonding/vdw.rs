/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Bonding from tabulated atomic radii

use serde::{Deserialize, Serialize};

use super::{for_each_pair, BondPair};
use crate::atoms::{ElementTable, RadiusKind, Structure};

/// Options for [`vdw_radius_based`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VdwOptions {
    /// Relative slack around the radius sum
    pub tolerance: f64,
    pub radius_kind: RadiusKind,
}

impl Default for VdwOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.3,
            radius_kind: RadiusKind::Covalent,
        }
    }
}

/// Bond pairs whose distance is within `(1 ± tolerance)` of their radius sum
///
/// Uses the global element table; see [`vdw_radius_based_with`] to pass one.
pub fn vdw_radius_based(structure: &Structure, options: &VdwOptions) -> Vec<BondPair> {
    vdw_radius_based_with(structure, options, ElementTable::global())
}

/// [`vdw_radius_based`] against an explicit element table
///
/// Sites are typed by their first species; unknown elements get
/// [`crate::atoms::database::FALLBACK_RADIUS`].
pub fn vdw_radius_based_with(
    structure: &Structure,
    options: &VdwOptions,
    table: &ElementTable,
) -> Vec<BondPair> {
    let radii: Vec<f64> = structure
        .sites
        .iter()
        .map(|site| table.radius_or_default(site.element().unwrap_or(""), options.radius_kind))
        .collect();

    let mut bonds = Vec::new();
    for_each_pair(structure, |i, j, dist_sq| {
        let distance = dist_sq.sqrt();
        let sum = radii[i] + radii[j];
        let lower = (1.0 - options.tolerance) * sum;
        let upper = (1.0 + options.tolerance) * sum;
        if distance > 0.0 && distance >= lower && distance <= upper {
            bonds.push(BondPair::between(structure, i, j, distance));
        }
    });
    bonds
}
