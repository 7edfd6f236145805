/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! pymatgen-style JSON structures
//!
//! The structure may sit anywhere in the document; the first object with a
//! `sites` array is used.

use serde_json::Value;

use super::config::StructureFormat;
use super::errors::{InputError, Result};
use crate::atoms::coordinates::{cart_to_frac_with_inverse, frac_to_cart};
use crate::atoms::Structure;

/// Parse a JSON document holding a structure
pub fn parse_json_structure(content: &str) -> Result<Structure> {
    read_json(content).inspect_err(|err| log::error!("Error parsing JSON structure: {}", err))
}

fn looks_like_structure(value: &Value) -> bool {
    value.get("sites").is_some_and(Value::is_array)
}

/// Depth-first search for the first structure-shaped object
pub fn find_structure_value(value: &Value) -> Option<&Value> {
    if looks_like_structure(value) {
        return Some(value);
    }
    match value {
        Value::Object(map) => map.values().find_map(find_structure_value),
        Value::Array(items) => items.iter().find_map(find_structure_value),
        _ => None,
    }
}

/// Deserialize a structure value and fill in whichever coordinate set is absent
pub fn structure_from_value(value: &Value) -> Result<Structure> {
    let mut structure: Structure = serde_json::from_value(value.clone())?;
    let raw_sites = value
        .get("sites")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    if let Some(lattice) = &structure.lattice {
        let matrix = *lattice.matrix();
        let inverse = lattice.inverse()?;
        for (site, raw) in structure.sites.iter_mut().zip(raw_sites) {
            let has_abc = raw.get("abc").is_some();
            let has_xyz = raw.get("xyz").is_some();
            match (has_abc, has_xyz) {
                (true, false) => site.xyz = frac_to_cart(&site.abc, &matrix),
                (false, true) => site.abc = cart_to_frac_with_inverse(&site.xyz, &inverse),
                _ => {}
            }
        }
    }
    Ok(structure)
}

fn read_json(content: &str) -> Result<Structure> {
    let document: Value = serde_json::from_str(content)?;
    let value = find_structure_value(&document).ok_or_else(|| {
        InputError::parse(StructureFormat::Json, "No structure with a 'sites' array found")
    })?;
    structure_from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_nested_structure() {
        let json = r#"{
            "meta": {"source": "test"},
            "results": [{"structure": {
                "lattice": {"matrix": [[2,0,0],[0,2,0],[0,0,2]]},
                "sites": [
                    {"species": [{"element": "Cu", "occu": 1}], "abc": [0.5, 0.5, 0.5], "label": "Cu"},
                    {"species": [{"element": "O", "occu": 1}], "xyz": [1.0, 0.0, 0.0], "label": "O"}
                ]
            }}]
        }"#;
        let structure = parse_json_structure(json).unwrap();
        assert_eq!(structure.sites.len(), 2);
        assert_eq!(structure.sites[0].xyz, [1.0, 1.0, 1.0]);
        assert_relative_eq!(structure.sites[1].abc[0], 0.5);
        assert_relative_eq!(structure.lattice.unwrap().volume(), 8.0);
    }

    #[test]
    fn test_missing_sites() {
        assert!(matches!(
            parse_json_structure(r#"{"foo": [1, 2, 3]}"#),
            Err(InputError::Parse { .. })
        ));
        assert!(matches!(parse_json_structure("{not json"), Err(InputError::Json(_))));
    }
}
