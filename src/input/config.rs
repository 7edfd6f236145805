/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Configuration for the structure file parsers

use std::fmt;

use serde::{Deserialize, Serialize};

/// Text formats the parsers understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureFormat {
    Poscar,
    Xyz,
    Cif,
    Json,
}

impl fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StructureFormat::Poscar => "POSCAR",
            StructureFormat::Xyz => "XYZ",
            StructureFormat::Cif => "CIF",
            StructureFormat::Json => "JSON",
        };
        f.write_str(name)
    }
}

/// Structure parser configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Skip detection and parse as this format
    pub format: Option<StructureFormat>,
    /// Expand CIF asymmetric units with their symmetry operations
    pub apply_cif_symmetry: bool,
    /// Fractional distance under which generated CIF positions are merged
    pub symmetry_tolerance: f64,
    /// Reject structures without sites and report overfilled sites
    pub validate: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            format: None,
            apply_cif_symmetry: true,
            symmetry_tolerance: 1e-3,
            validate: true,
        }
    }
}
