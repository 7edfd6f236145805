/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! XYZ and extended XYZ reader
//!
//! A file may hold several concatenated frames; [`parse_xyz`] returns the
//! last one. The comment line of extended XYZ carries `key=value` pairs,
//! among them `Lattice="ax ay az bx by bz cx cy cz"` and `pbc="T T T"`.

use serde_json::{Map, Value};

use super::config::StructureFormat;
use super::errors::{InputError, Result};
use super::numeric::{clean_element_symbol, parse_count, parse_number};
use crate::atoms::coordinates::cart_to_frac_with_inverse;
use crate::atoms::database::element_symbol;
use crate::atoms::{Lattice, Site, Structure};
use crate::utils::{matrix_inverse_3x3, vec9_to_mat3x3};

const FORMAT: StructureFormat = StructureFormat::Xyz;

/// One frame of an XYZ file, borrowed from the source text
#[derive(Debug, Clone, PartialEq)]
pub struct XyzFrame<'a> {
    /// 0-based index of the atom-count line in the source
    pub start_line: usize,
    pub comment: &'a str,
    pub atom_lines: Vec<&'a str>,
}

/// Parse XYZ content, returning its last frame as a structure
pub fn parse_xyz(content: &str) -> Result<Structure> {
    read_last_frame(content).inspect_err(|err| log::error!("Error parsing XYZ file: {}", err))
}

fn read_last_frame(content: &str) -> Result<Structure> {
    let frames = split_frames(content)?;
    let last = frames
        .last()
        .ok_or_else(|| InputError::Empty("XYZ file contains no frames".to_string()))?;
    if frames.len() > 1 {
        log::debug!("XYZ file holds {} frames, using the last", frames.len());
    }
    frame_to_structure(last)
}

fn count_line(line: &str) -> Option<usize> {
    parse_count(line.trim())
}

/// Split XYZ text into frames, checking every declared atom count
pub fn split_frames(content: &str) -> Result<Vec<XyzFrame<'_>>> {
    if content.trim().is_empty() {
        return Err(InputError::Empty("Empty XYZ file".to_string()));
    }
    let lines: Vec<&str> = content.lines().collect();
    let mut frames: Vec<XyzFrame<'_>> = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        if lines[idx].trim().is_empty() {
            idx += 1;
            continue;
        }

        let Some(count) = count_line(lines[idx]).filter(|&n| n > 0) else {
            return Err(match frames.last() {
                Some(prev) => {
                    let extra = lines[idx..]
                        .iter()
                        .take_while(|l| count_line(l).is_none())
                        .filter(|l| !l.trim().is_empty())
                        .count();
                    InputError::AtomCountMismatch {
                        expected: prev.atom_lines.len(),
                        found: prev.atom_lines.len() + extra,
                    }
                }
                None => InputError::at_line(FORMAT, idx + 1, "Invalid number of atoms"),
            });
        };

        let comment = lines
            .get(idx + 1)
            .ok_or_else(|| InputError::at_line(FORMAT, idx + 2, "Missing comment line"))?;
        let end = (idx + 2 + count).min(lines.len());
        let atom_lines = lines[(idx + 2).min(end)..end].to_vec();
        if atom_lines.len() < count {
            return Err(InputError::AtomCountMismatch {
                expected: count,
                found: atom_lines.len(),
            });
        }

        frames.push(XyzFrame {
            start_line: idx,
            comment,
            atom_lines,
        });
        idx += count + 2;
    }

    Ok(frames)
}

/// `key=value` pairs of an extended XYZ comment line
///
/// Values may be double- or single-quoted to include spaces. Bare words
/// without `=` are skipped.
pub fn parse_comment_properties(comment: &str) -> Vec<(String, String)> {
    let chars: Vec<char> = comment.chars().collect();
    let mut pairs = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        let key_start = i;
        while i < chars.len() && chars[i] != '=' && !chars[i].is_whitespace() {
            i += 1;
        }
        let key: String = chars[key_start..i].iter().collect();
        if i >= chars.len() || chars[i] != '=' {
            continue;
        }
        i += 1;

        let value: String = match chars.get(i) {
            Some(&quote) if quote == '"' || quote == '\'' => {
                let start = i + 1;
                let end = chars[start..]
                    .iter()
                    .position(|&c| c == quote)
                    .map_or(chars.len(), |p| start + p);
                i = end + 1;
                chars[start..end].iter().collect()
            }
            _ => {
                let start = i;
                while i < chars.len() && !chars[i].is_whitespace() {
                    i += 1;
                }
                chars[start..i].iter().collect()
            }
        };
        if !key.is_empty() {
            pairs.push((key, value));
        }
    }
    pairs
}

/// Parse the nine numbers of a `Lattice="..."` value
pub fn parse_lattice_value(value: &str) -> Result<Lattice> {
    let numbers = value
        .split_whitespace()
        .map(|t| parse_number(t).ok_or_else(|| InputError::parse(FORMAT, format!("Invalid lattice value '{}'", t))))
        .collect::<Result<Vec<f64>>>()?;
    let matrix = vec9_to_mat3x3(&numbers)
        .map_err(|_| InputError::parse(FORMAT, format!("Lattice needs 9 values, got {}", numbers.len())))?;
    Ok(Lattice::from_matrix(matrix))
}

fn parse_pbc(value: &str) -> Option<[bool; 3]> {
    let flags: Vec<bool> = value
        .split_whitespace()
        .map(|t| matches!(t.to_ascii_uppercase().as_str(), "T" | "TRUE" | "1"))
        .collect();
    <[bool; 3]>::try_from(flags).ok()
}

fn element_from_token(token: &str, index: usize) -> String {
    match token.parse::<i32>().ok().and_then(element_symbol) {
        Some(symbol) => symbol.to_string(),
        None => clean_element_symbol(token, index),
    }
}

/// Convert one frame into a structure
///
/// Cartesian positions are kept as given; with a lattice, fractional
/// coordinates come from one inversion of the lattice matrix.
pub fn frame_to_structure(frame: &XyzFrame<'_>) -> Result<Structure> {
    let mut lattice: Option<Lattice> = None;
    let mut pbc: Option<[bool; 3]> = None;
    let mut properties = Map::new();

    for (key, value) in parse_comment_properties(frame.comment) {
        match key.to_ascii_lowercase().as_str() {
            "lattice" => lattice = Some(parse_lattice_value(&value)?),
            "pbc" => pbc = parse_pbc(&value),
            "properties" => {}
            _ => {
                let parsed = parse_number(&value).map_or(Value::String(value), Value::from);
                properties.insert(key, parsed);
            }
        }
    }
    if let (Some(lat), Some(flags)) = (&lattice, pbc) {
        lattice = Some(Lattice::with_pbc(*lat.matrix(), flags));
    }

    let inverse = lattice.as_ref().map(|l| matrix_inverse_3x3(l.matrix())).transpose()?;

    let mut sites = Vec::with_capacity(frame.atom_lines.len());
    for (atom_idx, line) in frame.atom_lines.iter().enumerate() {
        let line_number = frame.start_line + 3 + atom_idx;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(InputError::at_line(FORMAT, line_number, "Invalid coordinate line"));
        }

        let element = element_from_token(parts[0], atom_idx);
        let mut xyz = [0.0; 3];
        for (slot, token) in xyz.iter_mut().zip(&parts[1..4]) {
            *slot = parse_number(token).ok_or_else(|| {
                InputError::at_line(FORMAT, line_number, format!("Invalid coordinate value '{}'", token))
            })?;
        }
        let abc = inverse
            .as_ref()
            .map_or([0.0; 3], |inv| cart_to_frac_with_inverse(&xyz, inv));

        sites.push(Site::single(&element, abc, xyz, format!("{}{}", element, atom_idx + 1)));
    }

    let mut structure = match lattice {
        Some(lat) => Structure::crystal(lat, sites),
        None => Structure::molecule(sites),
    };
    structure.properties = properties;
    Ok(structure)
}
