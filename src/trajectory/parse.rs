/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Trajectory readers
//!
//! Supported inputs are multi-frame (extended) XYZ, VASP XDATCAR, pymatgen
//! `Trajectory` JSON, JSON frame lists, and any single structure the
//! structure parsers accept.

use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::errors::{Result, TrajectoryError};
use super::extract::{forces_from_value, stress_from_value, ForceSummary, StressSummary};
use super::model::{Trajectory, TrajectoryFrame};
use crate::atoms::coordinates::frac_to_cart;
use crate::atoms::{Lattice, Site, Structure};
use crate::input::json::{find_structure_value, structure_from_value};
use crate::input::numeric::{clean_element_symbol, parse_count, parse_coordinate_line, parse_number};
use crate::input::xyz::{frame_to_structure, parse_comment_properties, split_frames};
use crate::input::{
    detect_unsupported_format, format_from_filename, parse_structure_file, InputError, StructureFormat,
    UNNAMED_INPUT,
};
use crate::utils::{determinant_3x3, vec9_to_mat3x3, Matrix3x3, Vec3};

/// Comment keys holding the step, in order of preference
const STEP_KEYS: [&str; 3] = ["step", "frame", "ionic_step"];

/// Canonical metadata names and the (lowercase) comment keys that map onto them
const PROPERTY_ALIASES: &[(&str, &[&str])] = &[
    ("energy", &["energy", "e", "total_energy", "etot", "total_e"]),
    ("energy_per_atom", &["energy_per_atom", "e_per_atom", "energy/atom", "epa"]),
    ("volume", &["volume", "vol", "v", "cell_volume"]),
    ("pressure", &["pressure", "p", "press"]),
    ("temperature", &["temperature", "temp", "t", "kelvin"]),
    ("bandgap", &["bandgap", "e_gap", "gap", "band_gap", "egap", "bg"]),
    ("force_max", &["force_max", "max_force", "fmax", "maximum_force"]),
    ("stress_max", &["stress_max", "max_stress", "maximum_stress"]),
    ("stress_frobenius", &["stress_frobenius", "frobenius_stress", "stress_frob"]),
];

fn canonical_property(key: &str) -> Option<&'static str> {
    let lower = key.to_lowercase();
    PROPERTY_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&lower.as_str()))
        .map(|(name, _)| *name)
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn insert_stress(metadata: &mut Map<String, Value>, tensor: &[Vec<f64>]) {
    if let Some(summary) = StressSummary::from_tensor(tensor) {
        metadata.insert("stress".to_string(), json!(tensor));
        metadata.insert("stress_max".to_string(), json!(summary.von_mises));
        metadata.insert("stress_frobenius".to_string(), json!(summary.frobenius));
        metadata.insert("pressure".to_string(), json!(summary.pressure));
    }
}

/// Step and metadata from an extended XYZ comment line
fn comment_metadata(comment: &str, frame_idx: usize) -> (f64, Map<String, Value>) {
    let mut steps: [Option<f64>; 3] = [None; 3];
    let mut metadata = Map::new();

    for (key, value) in parse_comment_properties(comment) {
        let lower = key.to_lowercase();
        if let Some(slot) = STEP_KEYS.iter().position(|k| *k == lower) {
            steps[slot] = parse_number(&value);
            continue;
        }
        match lower.as_str() {
            "lattice" | "pbc" | "properties" => {}
            "stress" => {
                let values: Option<Vec<f64>> = value.split_whitespace().map(parse_number).collect();
                match values.as_deref().map(vec9_to_mat3x3) {
                    Some(Ok(matrix)) => {
                        let rows: Vec<Vec<f64>> = matrix.iter().map(|r| r.to_vec()).collect();
                        insert_stress(&mut metadata, &rows);
                    }
                    _ => log::warn!("Ignoring stress value that is not 9 numbers: '{}'", value),
                }
            }
            _ => {
                if let Some(number) = parse_number(&value) {
                    let name = canonical_property(&lower).unwrap_or(key.as_str());
                    metadata.insert(name.to_string(), json!(number));
                }
            }
        }
    }

    let step = steps
        .iter()
        .find_map(|s| *s)
        .unwrap_or(frame_idx as f64);
    (step, metadata)
}

/// Parse concatenated XYZ frames into a trajectory
///
/// The step comes from a `step`, `frame` or `ionic_step` comment key,
/// falling back to the frame index. Numeric comment values become frame
/// metadata under canonical names (`E` and `etot` become `energy`, `fmax`
/// becomes `force_max`). Frames with a `Lattice` get fractional coordinates
/// and a `volume` entry.
pub fn parse_xyz_trajectory(content: &str) -> Result<Trajectory> {
    let frames = split_frames(content)?;
    let mut parsed = Vec::with_capacity(frames.len());

    for (idx, frame) in frames.iter().enumerate() {
        let structure = frame_to_structure(frame)?;
        let (step, mut metadata) = comment_metadata(frame.comment, idx);
        if let Some(lattice) = &structure.lattice {
            metadata
                .entry("volume".to_string())
                .or_insert_with(|| json!(lattice.volume()));
        }
        parsed.push(TrajectoryFrame::new(structure, step).with_metadata(metadata));
    }

    let Some(first) = parsed.first() else {
        return Err(TrajectoryError::NoFrames("No valid frames found in XYZ trajectory".to_string()));
    };
    let total_atoms = first.num_sites();
    let has_lattice_info = parsed
        .iter()
        .any(|f| f.structure.as_ref().is_some_and(Structure::is_periodic));

    let mut trajectory = Trajectory::new(parsed);
    trajectory.metadata = into_object(json!({
        "source_format": "xyz_trajectory",
        "frame_count": trajectory.frames.len(),
        "total_atoms": total_atoms,
        "has_lattice_info": has_lattice_info,
    }));
    Ok(trajectory)
}

/// Whether content holds at least two XYZ frames
///
/// With a file name, only `.xyz` and `.extxyz` files qualify.
pub fn is_xyz_trajectory(content: &str, filename: Option<&str>) -> bool {
    if filename.is_some_and(|name| format_from_filename(name) != Some(StructureFormat::Xyz)) {
        return false;
    }
    let Ok(frames) = split_frames(content) else {
        return false;
    };
    frames.len() >= 2
        && frames.iter().all(|frame| {
            frame.atom_lines.iter().take(5).all(|line| {
                let parts: Vec<&str> = line.split_whitespace().collect();
                parts.len() >= 4
                    && parts[0].len() <= 3
                    && parts[1..4].iter().all(|t| parse_number(t).is_some())
            })
        })
}

fn xdatcar_error(message: impl Into<String>) -> TrajectoryError {
    TrajectoryError::Parse(message.into())
}

fn lattice_row(line: &str) -> Option<Vec3> {
    let values: Vec<f64> = line
        .split_whitespace()
        .map(parse_number)
        .collect::<Option<Vec<f64>>>()?;
    <Vec3>::try_from(values).ok()
}

/// Step number of a `Direct configuration= N` header line
fn configuration_header(line: &str) -> Option<Option<f64>> {
    let (_, rest) = line.split_once("configuration=")?;
    Some(rest.split_whitespace().next().and_then(parse_count).map(|n| n as f64))
}

/// Parse a VASP XDATCAR file
///
/// Every `Direct configuration= N` block becomes a frame sharing the header
/// lattice. Incomplete blocks are skipped.
pub fn parse_vasp_xdatcar(content: &str) -> Result<Trajectory> {
    let lines: Vec<&str> = content.trim().lines().collect();
    if lines.len() < 10 {
        return Err(xdatcar_error("XDATCAR file too short"));
    }

    let title = lines[0].trim();
    let scale = lines[1]
        .split_whitespace()
        .next()
        .and_then(parse_number)
        .ok_or_else(|| xdatcar_error("Invalid scale factor in XDATCAR"))?;

    let mut raw: Matrix3x3 = [[0.0; 3]; 3];
    for (i, row) in raw.iter_mut().enumerate() {
        *row = lattice_row(lines[2 + i]).ok_or(InputError::InvalidLatticeVector {
            line: i + 3,
            found: lines[2 + i].split_whitespace().count(),
        })?;
    }
    let factor = if scale < 0.0 {
        let volume = determinant_3x3(&raw).abs();
        if volume == 0.0 {
            return Err(xdatcar_error("Cannot rescale a zero-volume cell"));
        }
        (-scale / volume).cbrt()
    } else {
        scale
    };
    let matrix = raw.map(|row| row.map(|x| x * factor));
    let lattice = Lattice::from_matrix(matrix);

    let name_tokens: Vec<&str> = lines[5].split_whitespace().collect();
    let vasp4_counts: Option<Vec<usize>> = name_tokens.iter().map(|t| parse_count(t)).collect();
    let (names, counts, mut idx): (Vec<&str>, Vec<usize>, usize) = match vasp4_counts {
        Some(counts) => (title.split_whitespace().collect(), counts, 6),
        None => {
            let counts = lines[6]
                .split_whitespace()
                .map(parse_count)
                .collect::<Option<Vec<usize>>>()
                .filter(|c| c.len() == name_tokens.len())
                .ok_or_else(|| xdatcar_error("Element names and counts don't match"))?;
            (name_tokens, counts, 7)
        }
    };

    let mut species: Vec<String> = Vec::new();
    for (i, &count) in counts.iter().enumerate() {
        let element = clean_element_symbol(names.get(i).copied().unwrap_or(""), i);
        species.extend(std::iter::repeat(element).take(count));
    }
    let total_atoms = species.len();

    let mut frames: Vec<TrajectoryFrame> = Vec::new();
    while idx < lines.len() {
        let header = lines[idx];
        idx += 1;
        let Some(step) = configuration_header(header) else {
            continue;
        };
        let step = step.unwrap_or((frames.len() + 1) as f64);

        let mut sites = Vec::with_capacity(total_atoms);
        for (atom_idx, default_element) in species.iter().enumerate() {
            let Some(line) = lines.get(idx) else {
                break;
            };
            if configuration_header(line).is_some() {
                break;
            }
            idx += 1;

            let Some(abc) = parse_coordinate_line(line) else {
                log::warn!("Invalid coordinate line: {}", line.trim());
                continue;
            };
            let element = line
                .split_whitespace()
                .nth(3)
                .filter(|token| parse_number(token).is_none())
                .map(|token| clean_element_symbol(token, atom_idx))
                .unwrap_or_else(|| default_element.clone());
            let xyz = frac_to_cart(&abc, &matrix);
            let label = format!("{}{}", element, atom_idx + 1);
            sites.push(Site::single(&element, abc, xyz, label));
        }

        if sites.len() == total_atoms {
            let metadata = into_object(json!({ "volume": lattice.volume() }));
            frames.push(
                TrajectoryFrame::new(Structure::crystal(lattice.clone(), sites), step).with_metadata(metadata),
            );
        } else {
            log::warn!("Skipping incomplete XDATCAR configuration {}", step);
        }
    }

    if frames.is_empty() {
        return Err(TrajectoryError::NoFrames(
            "No valid configurations found in XDATCAR".to_string(),
        ));
    }

    let mut trajectory = Trajectory::new(frames);
    trajectory.metadata = into_object(json!({
        "title": title,
        "source_format": "vasp_xdatcar",
        "frame_count": trajectory.frames.len(),
        "total_atoms": total_atoms,
        "elements": names,
        "element_counts": counts,
    }));
    Ok(trajectory)
}

/// Whether content looks like an XDATCAR file
pub fn is_vasp_xdatcar(content: &str, filename: Option<&str>) -> bool {
    let named = filename
        .and_then(|name| Path::new(name).file_name())
        .is_some_and(|base| base.to_string_lossy().to_lowercase().starts_with("xdatcar"));
    if named {
        return true;
    }

    let lines: Vec<&str> = content.trim().lines().collect();
    if lines.len() < 10 {
        return false;
    }
    let has_configuration = lines.iter().any(|l| l.contains("Direct configuration="));
    let has_scale = lines[1].split_whitespace().next().and_then(parse_number).is_some();
    let has_lattice = lines[2..5].iter().all(|l| lattice_row(l).is_some());
    has_configuration && has_scale && has_lattice
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SpeciesEntry {
    Symbol(String),
    Named { element: String },
}

impl SpeciesEntry {
    fn element(&self) -> &str {
        match self {
            SpeciesEntry::Symbol(symbol) => symbol,
            SpeciesEntry::Named { element } => element,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LatticeField {
    Shared(Matrix3x3),
    PerFrame(Vec<Matrix3x3>),
}

impl LatticeField {
    fn for_frame(&self, idx: usize) -> Option<&Matrix3x3> {
        match self {
            LatticeField::Shared(matrix) => Some(matrix),
            LatticeField::PerFrame(matrices) => matrices.get(idx),
        }
    }
}

#[derive(Deserialize)]
struct PymatgenTrajectory {
    species: Vec<SpeciesEntry>,
    /// Fractional coordinates as `[frame][site][xyz]`
    coords: Vec<Vec<Vec3>>,
    lattice: LatticeField,
    #[serde(default)]
    frame_properties: Option<Vec<Option<Map<String, Value>>>>,
    #[serde(default)]
    charge: Option<f64>,
    #[serde(default)]
    constant_lattice: Option<bool>,
}

/// Whether a JSON object is a pymatgen `Trajectory`
pub fn is_pymatgen_trajectory(value: &Value) -> bool {
    let class_ok = value
        .get("@class")
        .map_or(true, |class| class.as_str() == Some("Trajectory"));
    class_ok
        && value.get("species").is_some_and(Value::is_array)
        && value.get("coords").is_some_and(Value::is_array)
        && value.get("lattice").is_some_and(Value::is_array)
}

/// Replace wrapped force and stress entries with plain arrays and derive scalars
fn pymatgen_frame_metadata(mut metadata: Map<String, Value>) -> Map<String, Value> {
    if let Some(forces) = metadata.get("forces").and_then(forces_from_value) {
        if let Some(summary) = ForceSummary::from_forces(&forces) {
            metadata.insert("force_max".to_string(), json!(summary.max));
            metadata.insert("force_rms".to_string(), json!(summary.rms));
        }
        metadata.insert("forces".to_string(), json!(forces));
    }
    if let Some(stress) = metadata.get("stress").and_then(stress_from_value) {
        insert_stress(&mut metadata, &stress);
    }
    metadata
}

/// Parse a pymatgen `Trajectory` JSON object
///
/// Coordinates are fractional. The lattice may be shared or given per frame.
/// The step is the frame index.
pub fn parse_pymatgen_trajectory(value: &Value, filename: Option<&str>) -> Result<Trajectory> {
    let data: PymatgenTrajectory = serde_json::from_value(value.clone())?;
    let properties = data.frame_properties.unwrap_or_default();

    let mut frames = Vec::with_capacity(data.coords.len());
    for (frame_idx, frame_coords) in data.coords.iter().enumerate() {
        if frame_coords.len() != data.species.len() {
            return Err(InputError::AtomCountMismatch {
                expected: data.species.len(),
                found: frame_coords.len(),
            }
            .into());
        }
        let matrix = data
            .lattice
            .for_frame(frame_idx)
            .ok_or_else(|| TrajectoryError::Parse(format!("No lattice for frame {}", frame_idx)))?;

        let sites = frame_coords
            .iter()
            .zip(&data.species)
            .map(|(abc, species)| {
                let element = species.element();
                Site::single(element, *abc, frac_to_cart(abc, matrix), element)
            })
            .collect();
        let mut structure = Structure::crystal(Lattice::from_matrix(*matrix), sites);
        structure.charge = data.charge;

        let metadata = properties.get(frame_idx).cloned().flatten().unwrap_or_default();
        frames.push(
            TrajectoryFrame::new(structure, frame_idx as f64).with_metadata(pymatgen_frame_metadata(metadata)),
        );
    }

    if frames.is_empty() {
        return Err(TrajectoryError::NoFrames("pymatgen trajectory has no coordinates".to_string()));
    }

    let species_list: Vec<&str> = data.species.iter().map(SpeciesEntry::element).collect();
    let mut trajectory = Trajectory::new(frames);
    trajectory.metadata = into_object(json!({
        "source_format": "pymatgen_trajectory",
        "species_list": species_list,
        "constant_lattice": data.constant_lattice,
        "frame_count": trajectory.frames.len(),
    }));
    if let Some(name) = filename {
        trajectory.metadata.insert("filename".to_string(), json!(name));
    }
    Ok(trajectory)
}

const FRAME_STRUCTURE_KEYS: [&str; 5] = ["structure", "sites", "lattice", "step", "charge"];

fn frames_from_array(items: &[Value]) -> Result<Vec<TrajectoryFrame>> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| -> Result<TrajectoryFrame> {
            let object = item
                .as_object()
                .ok_or_else(|| TrajectoryError::Parse(format!("Invalid frame data at index {}", idx)))?;
            let structure = match object.get("structure") {
                Some(value) if value.is_object() => structure_from_value(value)?,
                _ if object.contains_key("sites") => structure_from_value(item)?,
                _ => return Err(TrajectoryError::Parse(format!("No structure found in frame {}", idx))),
            };
            let step = object.get("step").and_then(Value::as_f64).unwrap_or(idx as f64);
            let metadata = match object.get("metadata") {
                Some(Value::Object(map)) => map.clone(),
                _ => object
                    .iter()
                    .filter(|(key, _)| !FRAME_STRUCTURE_KEYS.contains(&key.as_str()))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            };
            Ok(TrajectoryFrame::new(structure, step).with_metadata(metadata))
        })
        .collect()
}

fn trajectory_from_json(value: &Value, filename: Option<&str>) -> Result<Trajectory> {
    if let Value::Array(items) = value {
        let mut trajectory = Trajectory::new(frames_from_array(items)?);
        trajectory.metadata = into_object(json!({
            "source_format": "array",
            "frame_count": trajectory.frames.len(),
        }));
        return Ok(trajectory);
    }

    if is_pymatgen_trajectory(value) {
        return parse_pymatgen_trajectory(value, filename);
    }

    if let Some(Value::Array(items)) = value.get("frames") {
        let mut trajectory = Trajectory::new(frames_from_array(items)?);
        trajectory.metadata = value
            .get("metadata")
            .cloned()
            .map(into_object)
            .unwrap_or_default();
        trajectory
            .metadata
            .insert("source_format".to_string(), json!("object_with_frames"));
        return Ok(trajectory);
    }

    if let Some(found) = find_structure_value(value) {
        let mut trajectory = Trajectory::from_structure(structure_from_value(found)?);
        trajectory
            .metadata
            .insert("source_format".to_string(), json!("single_structure"));
        return Ok(trajectory);
    }

    Err(TrajectoryError::Parse(
        "Unrecognized trajectory format: expected an array of frames, an object with frames, \
         a pymatgen trajectory or a single structure"
            .to_string(),
    ))
}

/// Parse trajectory data of any supported format
///
/// Detection order: JSON (frame lists, pymatgen trajectories, objects with
/// `frames`), multi-frame XYZ, XDATCAR, then a single structure wrapped as a
/// one-frame trajectory. Recognised but unsupported files give
/// [`TrajectoryError::Unsupported`].
pub fn parse_trajectory_data(content: &str, filename: Option<&str>) -> Result<Trajectory> {
    let name = filename.unwrap_or(UNNAMED_INPUT);
    if let Some(unsupported) = detect_unsupported_format(name, content.as_bytes()) {
        log::error!("{}", unsupported.message);
        return Err(TrajectoryError::Unsupported(unsupported));
    }

    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(TrajectoryError::NoFrames("Empty trajectory content".to_string()));
    }

    let mut trajectory = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        let value: Value = serde_json::from_str(trimmed)?;
        trajectory_from_json(&value, filename)?
    } else if is_xyz_trajectory(trimmed, filename) {
        parse_xyz_trajectory(trimmed)?
    } else if is_vasp_xdatcar(trimmed, filename) {
        parse_vasp_xdatcar(trimmed)?
    } else {
        let mut trajectory = Trajectory::from_structure(parse_structure_file(content, filename)?);
        trajectory
            .metadata
            .insert("source_format".to_string(), json!("single_structure"));
        trajectory
    };

    if let Some(name) = filename {
        trajectory
            .metadata
            .entry("filename".to_string())
            .or_insert_with(|| json!(name));
    }
    log::info!(
        "Parsed {} trajectory with {} frame(s)",
        trajectory
            .metadata
            .get("source_format")
            .and_then(Value::as_str)
            .unwrap_or("unknown"),
        trajectory.len()
    );
    Ok(trajectory)
}
