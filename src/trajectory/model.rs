/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Trajectory data model and summary statistics

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::atoms::Structure;

/// One snapshot of a trajectory
///
/// Fields are optional so that deserialized data can be checked with
/// [`validate_trajectory`](super::validate_trajectory) instead of being
/// rejected outright.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrajectoryFrame {
    #[serde(default)]
    pub structure: Option<Structure>,
    #[serde(default, deserialize_with = "number_or_none")]
    pub step: Option<f64>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Accept any JSON value for a step, keeping only numbers
fn number_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| v.as_f64()))
}

impl TrajectoryFrame {
    pub fn new(structure: Structure, step: f64) -> Self {
        Self {
            structure: Some(structure),
            step: Some(step),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// A finite numeric metadata value
    pub fn metadata_number(&self, key: &str) -> Option<f64> {
        self.metadata
            .get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
    }

    /// Number of sites, zero without a structure
    pub fn num_sites(&self) -> usize {
        self.structure.as_ref().map_or(0, Structure::num_sites)
    }
}

/// An ordered sequence of frames with trajectory-level metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trajectory {
    #[serde(default)]
    pub frames: Vec<TrajectoryFrame>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Trajectory {
    pub fn new(frames: Vec<TrajectoryFrame>) -> Self {
        Self {
            frames,
            metadata: Map::new(),
        }
    }

    /// A one-frame trajectory at step 0
    pub fn from_structure(structure: Structure) -> Self {
        Self::new(vec![TrajectoryFrame::new(structure, 0.0)])
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Summary of a trajectory's steps and atom counts
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TrajectoryStats {
    pub frame_count: usize,
    pub steps: Vec<f64>,
    /// `(min, max)` over all steps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_range: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constant_atom_count: Option<bool>,
    /// Atoms per frame, reported only when constant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_atoms: Option<usize>,
    /// `(min, max)` atoms per frame, reported only when not constant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atom_count_range: Option<(usize, usize)>,
}

/// Compute frame, step and atom-count statistics
pub fn get_trajectory_stats(trajectory: &Trajectory) -> TrajectoryStats {
    let steps: Vec<f64> = trajectory.frames.iter().filter_map(|f| f.step).collect();
    let step_range = steps.iter().copied().fold(None, |range, step| match range {
        None => Some((step, step)),
        Some((lo, hi)) => Some((f64::min(lo, step), f64::max(hi, step))),
    });

    let counts: Vec<usize> = trajectory
        .frames
        .iter()
        .filter_map(|f| f.structure.as_ref().map(Structure::num_sites))
        .collect();

    let mut stats = TrajectoryStats {
        frame_count: trajectory.frames.len(),
        steps,
        step_range,
        ..TrajectoryStats::default()
    };

    if let (Some(&min), Some(&max)) = (counts.iter().min(), counts.iter().max()) {
        let constant = min == max;
        stats.constant_atom_count = Some(constant);
        if constant {
            stats.total_atoms = Some(min);
        } else {
            stats.atom_count_range = Some((min, max));
        }
    }
    stats
}
