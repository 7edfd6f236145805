/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Per-frame property extraction
//!
//! Extractors turn a frame into a map of named scalars. Any function with the
//! signature `Fn(&TrajectoryFrame, &Trajectory) -> PropertyMap` is an
//! extractor, so callers can pass closures alongside the built-in ones.

use std::collections::BTreeMap;

use serde_json::Value;

use super::model::{Trajectory, TrajectoryFrame};
use crate::atoms::{ElementTable, Lattice};
use crate::utils::{norm, to_voigt, Vec3};

/// Named scalars for one frame
pub type PropertyMap = BTreeMap<String, f64>;

/// Key under which every extractor reports the frame's step
pub const STEP_KEY: &str = "Step";

/// Marker set by [`full_data_extractor`] when no lattice parameter changes
pub const CONSTANT_LATTICE_MARKER: &str = "_constant_lattice_params";

/// Tolerance used when deciding whether a property varies across frames
pub const VARIATION_TOLERANCE: f64 = 1e-10;

const ENERGY_KEYS: [&str; 5] = [
    "energy",
    "energy_per_atom",
    "potential_energy",
    "kinetic_energy",
    "total_energy",
];

const STRESS_KEYS: [&str; 4] = ["stress_max", "stress_trace", "stress_frobenius", "pressure"];

const LATTICE_KEYS: [&str; 7] = ["volume", "a", "b", "c", "alpha", "beta", "gamma"];

/// Something that pulls scalars out of a trajectory frame
pub trait DataExtractor {
    fn extract(&self, frame: &TrajectoryFrame, trajectory: &Trajectory) -> PropertyMap;
}

impl<F> DataExtractor for F
where
    F: Fn(&TrajectoryFrame, &Trajectory) -> PropertyMap,
{
    fn extract(&self, frame: &TrajectoryFrame, trajectory: &Trajectory) -> PropertyMap {
        self(frame, trajectory)
    }
}

/// Maximum and RMS magnitude of a set of force vectors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceSummary {
    pub max: f64,
    pub rms: f64,
}

impl ForceSummary {
    /// `None` for an empty force array
    pub fn from_forces(forces: &[Vec3]) -> Option<Self> {
        if forces.is_empty() {
            return None;
        }
        let magnitudes: Vec<f64> = forces.iter().map(|f| norm(f)).collect();
        let max = magnitudes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let rms = (magnitudes.iter().map(|m| m * m).sum::<f64>() / magnitudes.len() as f64).sqrt();
        Some(Self { max, rms })
    }
}

/// Scalar measures of a stress tensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressSummary {
    /// Von Mises equivalent stress
    pub von_mises: f64,
    pub frobenius: f64,
    pub trace: f64,
    /// `-trace / 3`
    pub pressure: f64,
}

impl StressSummary {
    /// `None` unless `tensor` is 3x3
    pub fn from_tensor<R: AsRef<[f64]>>(tensor: &[R]) -> Option<Self> {
        let [s11, s22, s33, s23, s13, s12] = to_voigt(tensor).ok()?;
        let von_mises = (0.5 * ((s11 - s22).powi(2) + (s22 - s33).powi(2) + (s33 - s11).powi(2))
            + 3.0 * (s12 * s12 + s13 * s13 + s23 * s23))
            .sqrt();
        let frobenius = tensor
            .iter()
            .flat_map(|row| row.as_ref().iter())
            .map(|v| v * v)
            .sum::<f64>()
            .sqrt();
        let trace = s11 + s22 + s33;
        Some(Self {
            von_mises,
            frobenius,
            trace,
            pressure: -trace / 3.0,
        })
    }
}

/// The numeric payload of a metadata entry, unwrapping `{"data": ...}`
fn payload(value: &Value) -> &Value {
    value.get("data").unwrap_or(value)
}

fn number_rows(value: &Value) -> Option<Vec<Vec<f64>>> {
    payload(value)
        .as_array()?
        .iter()
        .map(|row| -> Option<Vec<f64>> { row.as_array()?.iter().map(Value::as_f64).collect() })
        .collect()
}

/// An N x 3 force array from frame metadata
pub fn forces_from_value(value: &Value) -> Option<Vec<Vec3>> {
    number_rows(value)?
        .into_iter()
        .map(|row| (row.len() >= 3).then(|| [row[0], row[1], row[2]]))
        .collect()
}

/// A stress tensor from frame metadata, as 3x3 rows or 9 flat numbers
pub fn stress_from_value(value: &Value) -> Option<Vec<Vec<f64>>> {
    let flat: Option<Vec<f64>> = payload(value)
        .as_array()
        .and_then(|items| items.iter().map(Value::as_f64).collect());
    match flat {
        Some(values) if values.len() == 9 => Some(values.chunks(3).map(<[f64]>::to_vec).collect()),
        Some(_) => None,
        None => number_rows(value),
    }
}

fn with_step(frame: &TrajectoryFrame) -> PropertyMap {
    let mut data = PropertyMap::new();
    if let Some(step) = frame.step {
        data.insert(STEP_KEY.to_string(), step);
    }
    data
}

fn copy_numbers(frame: &TrajectoryFrame, keys: &[&str], data: &mut PropertyMap) {
    for key in keys {
        if let Some(value) = frame.metadata_number(key) {
            data.insert(key.to_string(), value);
        }
    }
}

/// Energy terms from frame metadata
pub fn energy_data_extractor(frame: &TrajectoryFrame, _trajectory: &Trajectory) -> PropertyMap {
    let mut data = with_step(frame);
    copy_numbers(frame, &ENERGY_KEYS, &mut data);
    data
}

/// Force and stress scalars
///
/// A `forces` array takes precedence over reported aggregates. A `stress`
/// tensor fills in whichever stress scalars the metadata does not report.
pub fn force_stress_data_extractor(frame: &TrajectoryFrame, _trajectory: &Trajectory) -> PropertyMap {
    let mut data = with_step(frame);

    let forces = frame
        .metadata
        .get("forces")
        .and_then(forces_from_value)
        .and_then(|forces| ForceSummary::from_forces(&forces));
    match forces {
        Some(summary) => {
            data.insert("force_max".to_string(), summary.max);
            data.insert("force_norm".to_string(), summary.rms);
        }
        None => {
            if let Some(max) = frame.metadata_number("force_max") {
                data.insert("force_max".to_string(), max);
            }
            let norm = frame
                .metadata_number("force_norm")
                .or_else(|| frame.metadata_number("force_rms"));
            if let Some(norm) = norm {
                data.insert("force_norm".to_string(), norm);
            }
        }
    }

    copy_numbers(frame, &STRESS_KEYS, &mut data);
    let stress = frame
        .metadata
        .get("stress")
        .and_then(stress_from_value)
        .and_then(|tensor| StressSummary::from_tensor(&tensor));
    if let Some(stress) = stress {
        data.entry("stress_max".to_string()).or_insert(stress.von_mises);
        data.entry("stress_frobenius".to_string()).or_insert(stress.frobenius);
        data.entry("stress_trace".to_string()).or_insert(stress.trace);
        data.entry("pressure".to_string()).or_insert(stress.pressure);
    }
    data
}

fn lattice_value(lattice: &Lattice, key: &str) -> Option<f64> {
    match key {
        "volume" => Some(lattice.volume()),
        "a" => Some(lattice.a()),
        "b" => Some(lattice.b()),
        "c" => Some(lattice.c()),
        "alpha" => Some(lattice.alpha()),
        "beta" => Some(lattice.beta()),
        "gamma" => Some(lattice.gamma()),
        _ => None,
    }
}

/// Lattice parameters, volume, density and temperature
///
/// Metadata `volume` is used only for frames without a lattice; density is
/// computed from the composition when not reported.
pub fn structural_data_extractor(frame: &TrajectoryFrame, _trajectory: &Trajectory) -> PropertyMap {
    let mut data = with_step(frame);
    let lattice = frame.structure.as_ref().and_then(|s| s.lattice.as_ref());

    match lattice {
        Some(lattice) => {
            for key in LATTICE_KEYS {
                if let Some(value) = lattice_value(lattice, key) {
                    data.insert(key.to_string(), value);
                }
            }
        }
        None => copy_numbers(frame, &["volume"], &mut data),
    }
    copy_numbers(frame, &["density", "temperature"], &mut data);

    if !data.contains_key("density") {
        if let Some(density) = frame
            .structure
            .as_ref()
            .and_then(|s| s.density(ElementTable::global()))
        {
            data.insert("density".to_string(), density);
        }
    }
    data
}

/// Energy, force/stress and structural properties combined
///
/// Adds [`CONSTANT_LATTICE_MARKER`] when no lattice parameter varies across
/// the trajectory.
pub fn full_data_extractor(frame: &TrajectoryFrame, trajectory: &Trajectory) -> PropertyMap {
    let mut data = energy_data_extractor(frame, trajectory);
    data.extend(force_stress_data_extractor(frame, trajectory));
    data.extend(structural_data_extractor(frame, trajectory));

    let lattice_varies = LATTICE_KEYS
        .iter()
        .any(|key| property_varies(trajectory, key, VARIATION_TOLERANCE));
    if !lattice_varies {
        data.insert(CONSTANT_LATTICE_MARKER.to_string(), 1.0);
    }
    data
}

/// Whether a lattice or metadata property changes across frames
///
/// Lattice values are preferred over metadata. Fewer than two values never
/// count as varying.
pub fn property_varies(trajectory: &Trajectory, property: &str, tolerance: f64) -> bool {
    let values: Vec<f64> = trajectory
        .frames
        .iter()
        .filter_map(|frame| {
            frame
                .structure
                .as_ref()
                .and_then(|s| s.lattice.as_ref())
                .and_then(|lattice| lattice_value(lattice, property))
                .or_else(|| frame.metadata_number(property))
        })
        .collect();

    match values.split_first() {
        Some((first, rest)) if !rest.is_empty() => rest.iter().any(|v| (v - first).abs() > tolerance),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::{Site, Structure};
    use approx::assert_relative_eq;
    use serde_json::json;

    fn frame_with(metadata: Value, lattice: Option<f64>) -> TrajectoryFrame {
        let sites = vec![Site::single("Si", [0.0; 3], [0.0; 3], "Si1")];
        let structure = match lattice {
            Some(a) => Structure::crystal(
                Lattice::from_matrix([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]]),
                sites,
            ),
            None => Structure::molecule(sites),
        };
        let metadata = metadata.as_object().cloned().unwrap_or_default();
        TrajectoryFrame::new(structure, 1.0).with_metadata(metadata)
    }

    #[test]
    fn test_energy_extractor() {
        let frame = frame_with(json!({"energy": -10.5, "kinetic_energy": 0.3, "label": "x"}), None);
        let data = energy_data_extractor(&frame, &Trajectory::default());
        assert_eq!(data.get(STEP_KEY), Some(&1.0));
        assert_eq!(data.get("energy"), Some(&-10.5));
        assert_eq!(data.get("kinetic_energy"), Some(&0.3));
        assert!(!data.contains_key("label"));
    }

    #[test]
    fn test_forces_array() {
        let frame = frame_with(json!({"forces": [[3.0, 4.0, 0.0], [0.0, 0.0, 0.0]], "force_max": 99.0}), None);
        let data = force_stress_data_extractor(&frame, &Trajectory::default());
        assert_relative_eq!(data["force_max"], 5.0);
        assert_relative_eq!(data["force_norm"], 12.5_f64.sqrt());
    }

    #[test]
    fn test_force_rms_fallback() {
        let frame = frame_with(json!({"force_max": 0.4, "force_rms": 0.2}), None);
        let data = force_stress_data_extractor(&frame, &Trajectory::default());
        assert_eq!(data.get("force_max"), Some(&0.4));
        assert_eq!(data.get("force_norm"), Some(&0.2));
    }

    #[test]
    fn test_stress_tensor() {
        let frame = frame_with(
            json!({"stress": [[1.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 3.0]], "pressure": 7.0}),
            None,
        );
        let data = force_stress_data_extractor(&frame, &Trajectory::default());
        assert_relative_eq!(data["stress_max"], 3.0_f64.sqrt());
        assert_relative_eq!(data["stress_frobenius"], 14.0_f64.sqrt());
        assert_relative_eq!(data["stress_trace"], 6.0);
        assert_eq!(data["pressure"], 7.0);
    }

    #[test]
    fn test_flat_stress_in_data_wrapper() {
        let value = json!({"data": [1, 0, 0, 0, 1, 0, 0, 0, 1]});
        let tensor = stress_from_value(&value).unwrap();
        let summary = StressSummary::from_tensor(&tensor).unwrap();
        assert_relative_eq!(summary.von_mises, 0.0);
        assert_relative_eq!(summary.pressure, -1.0);
    }

    #[test]
    fn test_structural_extractor() {
        let frame = frame_with(json!({"volume": 1.0, "temperature": 300.0}), Some(3.0));
        let data = structural_data_extractor(&frame, &Trajectory::default());
        assert_relative_eq!(data["volume"], 27.0, epsilon = 1e-10);
        assert_relative_eq!(data["alpha"], 90.0, epsilon = 1e-10);
        assert_eq!(data["temperature"], 300.0);
        assert!(data["density"] > 0.0);

        let molecule = frame_with(json!({"volume": 12.0}), None);
        let data = structural_data_extractor(&molecule, &Trajectory::default());
        assert_eq!(data["volume"], 12.0);
        assert!(!data.contains_key("density"));
    }

    #[test]
    fn test_constant_lattice_marker() {
        let constant = Trajectory::new(vec![
            frame_with(json!({"energy": 1.0}), Some(3.0)),
            frame_with(json!({"energy": 2.0}), Some(3.0)),
        ]);
        let data = full_data_extractor(&constant.frames[0], &constant);
        assert_eq!(data.get(CONSTANT_LATTICE_MARKER), Some(&1.0));
        assert_eq!(data.get("energy"), Some(&1.0));

        let varying = Trajectory::new(vec![
            frame_with(json!({}), Some(3.0)),
            frame_with(json!({}), Some(3.1)),
        ]);
        let data = full_data_extractor(&varying.frames[0], &varying);
        assert!(!data.contains_key(CONSTANT_LATTICE_MARKER));
    }

    #[test]
    fn test_closure_extractor() {
        let extractor = |frame: &TrajectoryFrame, _: &Trajectory| {
            PropertyMap::from([("sites".to_string(), frame.num_sites() as f64)])
        };
        let frame = frame_with(json!({}), None);
        assert_eq!(extractor.extract(&frame, &Trajectory::default())["sites"], 1.0);
    }
}
