/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Species and sites
//!
//! Field names follow pymatgen's JSON so structures round-trip through
//! `serde_json`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::utils::Vec3;

/// An element occupying (part of) a site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub element: String,
    /// Fractional occupancy in (0, 1]
    #[serde(default = "full_occupancy")]
    pub occu: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub oxidation_state: f64,
}

fn full_occupancy() -> f64 {
    1.0
}

fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Species {
    /// A fully occupied, neutral species
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            occu: 1.0,
            oxidation_state: 0.0,
        }
    }

    pub fn with_occupancy(element: impl Into<String>, occu: f64) -> Self {
        Self {
            occu,
            ..Self::new(element)
        }
    }
}

/// A position in a structure occupied by one or more species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub species: Vec<Species>,
    /// Fractional coordinates; all zero for molecules
    #[serde(default)]
    pub abc: Vec3,
    /// Cartesian coordinates in Angstrom
    #[serde(default)]
    pub xyz: Vec3,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub label: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl Site {
    pub fn new(species: Vec<Species>, abc: Vec3, xyz: Vec3, label: impl Into<String>) -> Self {
        Self {
            species,
            abc,
            xyz,
            label: label.into(),
            properties: Map::new(),
        }
    }

    /// A fully occupied single-element site
    pub fn single(element: &str, abc: Vec3, xyz: Vec3, label: impl Into<String>) -> Self {
        Self::new(vec![Species::new(element)], abc, xyz, label)
    }

    /// Element of the first (majority by convention) species
    pub fn element(&self) -> Option<&str> {
        self.species.first().map(|sp| sp.element.as_str())
    }

    /// Sum of the species occupancies on this site
    pub fn total_occupancy(&self) -> f64 {
        self.species.iter().map(|sp| sp.occu).sum()
    }

    /// Whether more than one species shares this site or occupancy is partial
    pub fn is_disordered(&self) -> bool {
        self.species.len() > 1 || self.species.iter().any(|sp| sp.occu < 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_occupancy() {
        let site = Site::new(
            vec![
                Species::with_occupancy("Fe", 0.6),
                Species::with_occupancy("Ni", 0.4),
            ],
            [0.0; 3],
            [0.0; 3],
            "FeNi",
        );
        assert_eq!(site.element(), Some("Fe"));
        assert!((site.total_occupancy() - 1.0).abs() < 1e-12);
        assert!(site.is_disordered());
        assert!(!Site::single("O", [0.0; 3], [0.0; 3], "O1").is_disordered());
    }

    #[test]
    fn test_species_defaults_from_json() {
        let sp: Species = serde_json::from_str(r#"{"element": "Cu"}"#).unwrap();
        assert_eq!(sp.occu, 1.0);
        assert_eq!(sp.oxidation_state, 0.0);

        let sp: Species =
            serde_json::from_str(r#"{"element": "O", "occu": 0.5, "oxidation_state": null}"#)
                .unwrap();
        assert_eq!(sp.occu, 0.5);
        assert_eq!(sp.oxidation_state, 0.0);
    }
}
