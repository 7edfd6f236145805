/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Display labels and units for trajectory properties

use std::collections::BTreeMap;

/// Known properties as `(key, label, unit)`
const PROPERTY_LABELS: &[(&str, &str, Option<&str>)] = &[
    ("energy", "Energy", Some("eV")),
    ("energy_per_atom", "Energy per Atom", Some("eV/atom")),
    ("potential_energy", "Potential Energy", Some("eV")),
    ("kinetic_energy", "Kinetic Energy", Some("eV")),
    ("total_energy", "Total Energy", Some("eV")),
    ("force_max", "F<sub>max</sub>", Some("eV/Å")),
    ("force_norm", "F<sub>norm</sub>", Some("eV/Å")),
    ("force_rms", "F<sub>RMS</sub>", Some("eV/Å")),
    ("stress_max", "σ<sub>max</sub>", Some("GPa")),
    ("stress_frobenius", "‖σ‖<sub>F</sub>", Some("GPa")),
    ("stress_trace", "Tr(σ)", Some("GPa")),
    ("pressure", "Pressure", Some("GPa")),
    ("volume", "Volume", Some("Å³")),
    ("density", "Density", Some("g/cm³")),
    ("temperature", "Temperature", Some("K")),
    ("bandgap", "Band Gap", Some("eV")),
    ("a", "a", Some("Å")),
    ("b", "b", Some("Å")),
    ("c", "c", Some("Å")),
    ("alpha", "α", Some("°")),
    ("beta", "β", Some("°")),
    ("gamma", "γ", Some("°")),
];

fn lookup(key: &str) -> Option<&'static (&'static str, &'static str, Option<&'static str>)> {
    let lower = key.to_lowercase();
    PROPERTY_LABELS.iter().find(|(k, _, _)| *k == lower)
}

/// Human-readable label; unknown keys are title-cased
pub fn property_label(key: &str) -> String {
    match lookup(key) {
        Some((_, label, _)) => label.to_string(),
        None => key
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                chars
                    .next()
                    .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

pub fn property_unit(key: &str) -> Option<&'static str> {
    lookup(key).and_then(|(_, _, unit)| *unit)
}

/// Label with the unit in parentheses
///
/// Entries in `labels` and `units` override the built-in table.
pub fn label_with_unit(
    key: &str,
    labels: &BTreeMap<String, String>,
    units: &BTreeMap<String, String>,
) -> String {
    let label = labels.get(key).cloned().unwrap_or_else(|| property_label(key));
    let unit = units.get(key).map(String::as_str).or_else(|| property_unit(key));
    match unit {
        Some(unit) if !unit.is_empty() => format!("{} ({})", label, unit),
        _ => label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("energy", "Energy (eV)")]
    #[case("force_max", "F<sub>max</sub> (eV/Å)")]
    #[case("alpha", "α (°)")]
    #[case("Volume", "Volume (Å³)")]
    #[case("band_offset", "Band Offset")]
    fn test_default_labels(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(label_with_unit(key, &BTreeMap::new(), &BTreeMap::new()), expected);
    }

    #[test]
    fn test_overrides() {
        let labels = BTreeMap::from([("energy".to_string(), "E".to_string())]);
        let units = BTreeMap::from([("energy".to_string(), "Ha".to_string())]);
        assert_eq!(label_with_unit("energy", &labels, &units), "E (Ha)");
    }
}
