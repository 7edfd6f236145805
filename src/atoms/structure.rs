/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Structures: crystals (with a lattice) and molecules (without)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::database::ElementTable;
use super::errors::{Result, StructureError};
use super::lattice::Lattice;
use super::site::Site;
use crate::utils::constants::AMU_PER_A3_TO_G_PER_CM3;
use crate::utils::Vec3;

/// Tolerance when checking that site occupancies sum to at most one
const OCCUPANCY_TOLERANCE: f64 = 1e-6;

/// A set of sites with an optional periodic lattice
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Structure {
    pub sites: Vec<Site>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lattice: Option<Lattice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl Structure {
    /// A molecule: sites without a lattice
    pub fn molecule(sites: Vec<Site>) -> Self {
        Self {
            sites,
            ..Self::default()
        }
    }

    /// A periodic structure
    pub fn crystal(lattice: Lattice, sites: Vec<Site>) -> Self {
        Self {
            sites,
            lattice: Some(lattice),
            ..Self::default()
        }
    }

    pub fn is_periodic(&self) -> bool {
        self.lattice.is_some()
    }

    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// The lattice, or an error for molecules
    pub fn require_lattice(&self) -> Result<&Lattice> {
        self.lattice.as_ref().ok_or(StructureError::MissingLattice)
    }

    /// Cartesian positions of all sites
    pub fn cart_coords(&self) -> Vec<Vec3> {
        self.sites.iter().map(|site| site.xyz).collect()
    }

    /// Occupancy-weighted element amounts, keyed by symbol
    pub fn composition(&self) -> BTreeMap<String, f64> {
        let mut composition = BTreeMap::new();
        for species in self.sites.iter().flat_map(|site| &site.species) {
            *composition.entry(species.element.clone()).or_insert(0.0) += species.occu;
        }
        composition
    }

    /// Unreduced formula such as `Fe2 O3`, elements in alphabetical order
    pub fn formula(&self) -> String {
        self.composition()
            .iter()
            .map(|(element, amount)| {
                if (amount - 1.0).abs() < 1e-8 {
                    element.clone()
                } else if (amount - amount.round()).abs() < 1e-8 {
                    format!("{}{}", element, amount.round())
                } else {
                    format!("{}{:.3}", element, amount)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Total mass in atomic mass units
    ///
    /// Elements missing from the table contribute nothing.
    pub fn total_mass(&self, table: &ElementTable) -> f64 {
        self.composition()
            .iter()
            .filter_map(|(element, amount)| table.atomic_weight(element).map(|w| w * amount))
            .sum()
    }

    /// Density in g/cm³, `None` for molecules and zero-volume cells
    pub fn density(&self, table: &ElementTable) -> Option<f64> {
        let volume = self.lattice.as_ref()?.volume();
        if volume <= 0.0 {
            return None;
        }
        Some(AMU_PER_A3_TO_G_PER_CM3 * self.total_mass(table) / volume)
    }

    /// Indices and occupancy sums of sites whose species overfill them
    ///
    /// Overfilled sites are not rejected anywhere; this reports them.
    pub fn overfilled_sites(&self) -> Vec<(usize, f64)> {
        let overfilled: Vec<(usize, f64)> = self
            .sites
            .iter()
            .enumerate()
            .map(|(idx, site)| (idx, site.total_occupancy()))
            .filter(|(_, total)| *total > 1.0 + OCCUPANCY_TOLERANCE)
            .collect();
        if !overfilled.is_empty() {
            log::debug!("{} site(s) with occupancy sum above 1", overfilled.len());
        }
        overfilled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::site::Species;
    use approx::assert_relative_eq;

    fn rocksalt_pair() -> Structure {
        let lattice = Lattice::from_matrix([[2.82, 0.0, 0.0], [0.0, 2.82, 0.0], [0.0, 0.0, 2.82]]);
        let sites = vec![
            Site::single("Na", [0.0; 3], [0.0; 3], "Na1"),
            Site::single("Cl", [0.5; 3], [1.41; 3], "Cl1"),
        ];
        Structure::crystal(lattice, sites)
    }

    #[test]
    fn test_composition_and_formula() {
        let mut structure = rocksalt_pair();
        structure.sites.push(Site::single("Cl", [0.0; 3], [0.0; 3], "Cl2"));
        assert_eq!(structure.formula(), "Cl2 Na");
        assert_relative_eq!(structure.composition()["Cl"], 2.0);
    }

    #[test]
    fn test_density() {
        let structure = rocksalt_pair();
        let table = ElementTable::global();
        let expected = AMU_PER_A3_TO_G_PER_CM3 * (22.99 + 35.45) / 2.82_f64.powi(3);
        assert_relative_eq!(structure.density(table).unwrap(), expected, epsilon = 1e-2);
        assert!(Structure::molecule(structure.sites).density(table).is_none());
    }

    #[test]
    fn test_overfilled_sites() {
        let mut structure = rocksalt_pair();
        structure.sites[1].species.push(Species::with_occupancy("Br", 0.5));
        assert_eq!(structure.overfilled_sites(), vec![(1, 1.5)]);
    }

    #[test]
    fn test_missing_lattice() {
        let molecule = Structure::molecule(vec![]);
        assert!(matches!(
            molecule.require_lattice(),
            Err(StructureError::MissingLattice)
        ));
    }
}
