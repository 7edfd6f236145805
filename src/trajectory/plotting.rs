/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Plot series generation for trajectory properties
//!
//! Properties are collected across frames and turned into series. Constant
//! properties are dropped. The rest get a label, an axis and a default
//! visibility.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::extract::{DataExtractor, STEP_KEY};
use super::labels::label_with_unit;
use super::model::Trajectory;

/// Default tolerance for [`should_hide_plot`]
pub const DEFAULT_HIDE_TOLERANCE: f64 = 1e-10;

const DEFAULT_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Series that fall back to visible when nothing else is
const FALLBACK_VISIBLE: [&str; 2] = ["volume", "density"];

/// Below this many points, series are drawn with markers
const MARKER_THRESHOLD: usize = 30;

const MEAN_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YAxis {
    Y1,
    Y2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerStyle {
    #[serde(rename = "line")]
    Line,
    #[serde(rename = "line+points")]
    LinePoints,
}

/// One plottable property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSeries {
    /// Property key as reported by the extractor
    pub key: String,
    pub label: String,
    /// Frame indices
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub y_axis: YAxis,
    pub visible: bool,
    pub markers: MarkerStyle,
    pub color: String,
}

/// Options for [`generate_plot_series`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSeriesOptions {
    /// Label overrides by property key
    pub property_labels: BTreeMap<String, String>,
    /// Unit overrides by property key
    pub units: BTreeMap<String, String>,
    pub colors: Vec<String>,
    /// Properties always drawn on the secondary axis
    pub y2_properties: BTreeSet<String>,
    pub default_visible_properties: BTreeSet<String>,
    /// Coefficient of variation below which a property counts as constant
    pub constant_threshold: f64,
    /// Relative range above which volume moves to the secondary axis
    pub volume_variation_threshold: f64,
    /// Magnitude ratio to the primary series that forces the secondary axis
    pub magnitude_ratio: f64,
}

fn string_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for PlotSeriesOptions {
    fn default() -> Self {
        Self {
            property_labels: BTreeMap::new(),
            units: BTreeMap::new(),
            colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
            y2_properties: string_set(&[
                "force_max",
                "force_norm",
                "stress_max",
                "stress_frobenius",
                "stress_trace",
                "pressure",
                "temperature",
                "density",
            ]),
            default_visible_properties: string_set(&["energy", "force_max", "stress_frobenius"]),
            constant_threshold: 1e-6,
            volume_variation_threshold: 0.01,
            magnitude_ratio: 10.0,
        }
    }
}

#[derive(Default)]
struct Collected {
    x: Vec<f64>,
    y: Vec<f64>,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Coefficient of variation, or the plain standard deviation near zero mean
fn coefficient_of_variation(values: &[f64]) -> f64 {
    let mean = mean(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    let std = variance.sqrt();
    if mean.abs() > MEAN_EPSILON {
        std / mean.abs()
    } else {
        std
    }
}

fn relative_range(values: &[f64]) -> f64 {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = mean(values).abs();
    if mean > MEAN_EPSILON {
        (max - min) / mean
    } else {
        max - min
    }
}

fn magnitude(values: &[f64]) -> f64 {
    values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64
}

fn is_fallback(key: &str) -> bool {
    let lower = key.to_lowercase();
    FALLBACK_VISIBLE.iter().any(|k| *k == lower)
}

/// Turn the properties reported by `extractor` into plot series
pub fn generate_plot_series(
    trajectory: &Trajectory,
    extractor: &impl DataExtractor,
    options: &PlotSeriesOptions,
) -> Vec<DataSeries> {
    if trajectory.frames.is_empty() {
        return Vec::new();
    }

    let mut order: Vec<String> = Vec::new();
    let mut collected: HashMap<String, Collected> = HashMap::new();
    for (idx, frame) in trajectory.frames.iter().enumerate() {
        for (key, value) in extractor.extract(frame, trajectory) {
            if key == STEP_KEY || key.starts_with("_constant_") || !value.is_finite() {
                continue;
            }
            let entry = collected.entry(key.clone()).or_insert_with(|| {
                order.push(key.clone());
                Collected::default()
            });
            entry.x.push(idx as f64);
            entry.y.push(value);
        }
    }

    let mut series: Vec<DataSeries> = Vec::new();
    for key in order {
        let Some(Collected { x, y }) = collected.remove(&key) else {
            continue;
        };
        if y.len() <= 1 || coefficient_of_variation(&y) < options.constant_threshold {
            log::debug!("Dropping constant property '{}'", key);
            continue;
        }

        let lower = key.to_lowercase();
        let y_axis = if lower == "volume" {
            if relative_range(&y) > options.volume_variation_threshold {
                YAxis::Y2
            } else {
                YAxis::Y1
            }
        } else if options.y2_properties.contains(&lower) {
            YAxis::Y2
        } else {
            YAxis::Y1
        };
        let visible = options.default_visible_properties.contains(&lower)
            || options.default_visible_properties.contains(&key);
        let color = match options.colors.len() {
            0 => String::new(),
            n => options.colors[series.len() % n].clone(),
        };

        series.push(DataSeries {
            label: label_with_unit(&key, &options.property_labels, &options.units),
            markers: if y.len() < MARKER_THRESHOLD {
                MarkerStyle::LinePoints
            } else {
                MarkerStyle::Line
            },
            key,
            x,
            y,
            y_axis,
            visible,
            color,
        });
    }

    separate_scales(&mut series, options.magnitude_ratio);

    let has_visible_priority = series.iter().any(|s| s.visible && !is_fallback(&s.key));
    if !has_visible_priority {
        for s in series.iter_mut().filter(|s| is_fallback(&s.key)) {
            s.visible = true;
        }
    }

    series.sort_by_key(|s| !s.visible);
    series
}

/// Move primary-axis series whose magnitude is far from the anchor to y2
///
/// The anchor is the energy series when it is on the primary axis, else the
/// first primary series. Volume is never moved here.
fn separate_scales(series: &mut [DataSeries], ratio: f64) {
    let anchor = series
        .iter()
        .position(|s| s.y_axis == YAxis::Y1 && s.key.eq_ignore_ascii_case("energy"))
        .or_else(|| series.iter().position(|s| s.y_axis == YAxis::Y1));
    let Some(anchor) = anchor else {
        return;
    };
    let reference = magnitude(&series[anchor].y);
    if reference <= MEAN_EPSILON {
        return;
    }

    for (idx, s) in series.iter_mut().enumerate() {
        // Volume placement follows its variation alone
        if idx == anchor || s.y_axis == YAxis::Y2 || s.key.eq_ignore_ascii_case("volume") {
            continue;
        }
        let own = magnitude(&s.y);
        if own <= MEAN_EPSILON {
            continue;
        }
        if own.max(reference) / own.min(reference) >= ratio {
            log::debug!("Moving '{}' to the secondary axis", s.key);
            s.y_axis = YAxis::Y2;
        }
    }
}

/// Whether a trajectory plot has nothing worth showing
///
/// Single-frame trajectories are never hidden. Otherwise the plot is hidden
/// when there are no series or when every visible series (volume and
/// density if none are visible) is constant within `tolerance`.
pub fn should_hide_plot(trajectory: &Trajectory, series: &[DataSeries], tolerance: f64) -> bool {
    if trajectory.frames.len() <= 1 {
        return false;
    }
    if series.is_empty() {
        return true;
    }

    let mut considered: Vec<&DataSeries> = series.iter().filter(|s| s.visible).collect();
    if considered.is_empty() {
        considered = series.iter().filter(|s| is_fallback(&s.key)).collect();
    }

    !considered.iter().any(|s| match s.y.split_first() {
        Some((first, rest)) => rest.iter().any(|v| (v - first).abs() > tolerance),
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::{Site, Structure};
    use crate::trajectory::extract::{full_data_extractor, PropertyMap};
    use crate::trajectory::{Trajectory, TrajectoryFrame};
    use serde_json::{json, Value};

    fn trajectory(metadata: Vec<Value>) -> Trajectory {
        let frames = metadata
            .into_iter()
            .enumerate()
            .map(|(i, m)| {
                let structure = Structure::molecule(vec![Site::single("H", [0.0; 3], [0.0; 3], "H1")]);
                TrajectoryFrame::new(structure, i as f64)
                    .with_metadata(m.as_object().cloned().unwrap_or_default())
            })
            .collect();
        Trajectory::new(frames)
    }

    fn metadata_extractor(frame: &TrajectoryFrame, _: &Trajectory) -> PropertyMap {
        frame
            .metadata
            .iter()
            .filter_map(|(k, v)| v.as_f64().map(|v| (k.clone(), v)))
            .collect()
    }

    #[test]
    fn test_constant_properties_dropped() {
        let traj = trajectory(vec![
            json!({"energy": -10.0, "volume": 50.0, "temperature": 300.0}),
            json!({"energy": -10.1, "volume": 50.0, "temperature": 300.000001}),
            json!({"energy": -10.2, "volume": 50.0, "temperature": 300.0}),
        ]);
        let series = generate_plot_series(&traj, &metadata_extractor, &PlotSeriesOptions::default());
        let keys: Vec<&str> = series.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["energy"]);
        assert_eq!(series[0].x, vec![0.0, 1.0, 2.0]);
        assert_eq!(series[0].label, "Energy (eV)");
        assert_eq!(series[0].markers, MarkerStyle::LinePoints);
    }

    #[test]
    fn test_axes_and_visibility() {
        let traj = trajectory(vec![
            json!({"energy": -10.0, "force_max": 0.5, "bandgap": 2.0, "volume": 50.0}),
            json!({"energy": -11.0, "force_max": 0.2, "bandgap": 2.1, "volume": 55.0}),
        ]);
        let series = generate_plot_series(&traj, &metadata_extractor, &PlotSeriesOptions::default());
        let by_key = |k: &str| series.iter().find(|s| s.key == k).unwrap();

        assert_eq!(by_key("energy").y_axis, YAxis::Y1);
        assert_eq!(by_key("force_max").y_axis, YAxis::Y2);
        assert_eq!(by_key("volume").y_axis, YAxis::Y2);
        assert_eq!(by_key("bandgap").y_axis, YAxis::Y1);
        assert!(by_key("energy").visible);
        assert!(!by_key("volume").visible);
        assert!(series[0].visible && series[1].visible);
        assert!(!series[2].visible && !series[3].visible);
    }

    #[test]
    fn test_magnitude_separation() {
        let traj = trajectory(vec![
            json!({"energy": -100.0, "bandgap": 1.0}),
            json!({"energy": -101.0, "bandgap": 1.2}),
        ]);
        let series = generate_plot_series(&traj, &metadata_extractor, &PlotSeriesOptions::default());
        let bandgap = series.iter().find(|s| s.key == "bandgap").unwrap();
        assert_eq!(bandgap.y_axis, YAxis::Y2);
    }

    #[test]
    fn test_volume_axis_follows_variation_only() {
        // Three orders of magnitude above energy but nearly constant
        let traj = trajectory(vec![
            json!({"energy": -1.0, "volume": 1000.000}),
            json!({"energy": -1.2, "volume": 1000.004}),
        ]);
        let series = generate_plot_series(&traj, &metadata_extractor, &PlotSeriesOptions::default());
        let volume = series.iter().find(|s| s.key == "volume").unwrap();
        assert_eq!(volume.y_axis, YAxis::Y1);
    }

    #[test]
    fn test_volume_fallback_visibility() {
        let traj = trajectory(vec![json!({"volume": 50.0}), json!({"volume": 50.1})]);
        let series = generate_plot_series(&traj, &metadata_extractor, &PlotSeriesOptions::default());
        assert_eq!(series.len(), 1);
        assert!(series[0].visible);
        assert_eq!(series[0].y_axis, YAxis::Y1);
    }

    #[test]
    fn test_full_extractor_skips_markers() {
        let traj = trajectory(vec![json!({"energy": 1.0}), json!({"energy": 2.0})]);
        let series = generate_plot_series(&traj, &full_data_extractor, &PlotSeriesOptions::default());
        assert!(series.iter().all(|s| !s.key.starts_with('_') && s.key != "Step"));
    }

    #[test]
    fn test_should_hide_plot() {
        let single = trajectory(vec![json!({"energy": 1.0})]);
        assert!(!should_hide_plot(&single, &[], DEFAULT_HIDE_TOLERANCE));

        let traj = trajectory(vec![json!({"energy": 1.0}), json!({"energy": 2.0})]);
        assert!(should_hide_plot(&traj, &[], DEFAULT_HIDE_TOLERANCE));

        let mut series = generate_plot_series(&traj, &metadata_extractor, &PlotSeriesOptions::default());
        assert!(!should_hide_plot(&traj, &series, DEFAULT_HIDE_TOLERANCE));

        series[0].visible = false;
        assert!(should_hide_plot(&traj, &series, DEFAULT_HIDE_TOLERANCE));
    }
}
