/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Format detection and dispatch

use std::path::Path;

use super::cif::parse_cif_with_config;
use super::config::{ParserConfig, StructureFormat};
use super::errors::{InputError, Result};
use super::json::parse_json_structure;
use super::numeric::{parse_count, parse_number};
use super::poscar::parse_poscar;
use super::unsupported::{detect_unsupported_format, UNNAMED_INPUT};
use super::xyz::parse_xyz;
use crate::atoms::Structure;

/// Structure file parser with format auto-detection
#[derive(Debug, Clone, Default)]
pub struct StructureParser {
    config: ParserConfig,
}

impl StructureParser {
    /// Create a new parser with the given configuration
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse `content`, using `filename` as a format hint when given
    pub fn parse(&self, content: &str, filename: Option<&str>) -> Result<Structure> {
        let name = filename.unwrap_or(UNNAMED_INPUT);
        if let Some(unsupported) = detect_unsupported_format(name, content.as_bytes()) {
            log::error!("{}", unsupported.message);
            return Err(InputError::Unsupported(unsupported));
        }

        let format = match self.config.format {
            Some(format) => format,
            None => detect_format(content, filename)?,
        };
        log::debug!("Parsing {} as {}", name, format);

        let structure = match format {
            StructureFormat::Poscar => parse_poscar(content)?,
            StructureFormat::Xyz => parse_xyz(content)?,
            StructureFormat::Cif => parse_cif_with_config(content, &self.config)?,
            StructureFormat::Json => parse_json_structure(content)?,
        };

        if self.config.validate {
            if structure.sites.is_empty() {
                return Err(InputError::parse(format, "Structure has no sites"));
            }
            let overfilled = structure.overfilled_sites();
            if !overfilled.is_empty() {
                log::warn!(
                    "{} site(s) have occupancies summing above 1, first at index {}",
                    overfilled.len(),
                    overfilled[0].0
                );
            }
        }
        Ok(structure)
    }
}

/// Parse a structure file with the default configuration
///
/// # Examples
///
/// ```
/// use structviz::input::parse_structure_file;
///
/// let poscar = "Test\n1.0\n3.0 0.0 0.0\n0.0 3.0 0.0\n0.0 0.0 3.0\nH\n1\nDirect\n0.0 0.0 0.0";
/// let structure = parse_structure_file(poscar, Some("POSCAR")).unwrap();
/// assert_eq!(structure.sites.len(), 1);
/// ```
pub fn parse_structure_file(content: &str, filename: Option<&str>) -> Result<Structure> {
    StructureParser::default().parse(content, filename)
}

/// Format implied by a file name, if any
pub fn format_from_filename(filename: &str) -> Option<StructureFormat> {
    let lower = filename.to_lowercase();
    let name = Path::new(&lower)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| lower.clone());
    let extension = Path::new(&name)
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    match extension.as_str() {
        "xyz" | "extxyz" => return Some(StructureFormat::Xyz),
        "cif" | "mcif" => return Some(StructureFormat::Cif),
        "json" => return Some(StructureFormat::Json),
        "vasp" | "poscar" => return Some(StructureFormat::Poscar),
        _ => {}
    }
    ["poscar", "contcar", "xdatcar"]
        .iter()
        .any(|hint| name.contains(hint))
        .then_some(StructureFormat::Poscar)
}

fn looks_like_xyz(lines: &[&str]) -> bool {
    let Some(count) = parse_count(lines[0].trim()).filter(|&n| n > 0) else {
        return false;
    };
    if lines.len() < count + 2 {
        return false;
    }
    let Some(atom_line) = lines.get(2) else {
        return false;
    };
    let parts: Vec<&str> = atom_line.split_whitespace().collect();
    if parts.len() < 4 {
        return false;
    }
    let is_symbol = parts[0].parse::<i64>().is_err() && parts[0].len() <= 3;
    is_symbol && parts[1..4].iter().all(|t| parse_number(t).is_some())
}

fn looks_like_cif(lines: &[&str]) -> bool {
    lines.iter().any(|line| {
        line.starts_with("data_")
            || line.contains("_cell_length_")
            || line.contains("_atom_site_")
            || line.trim() == "loop_"
    })
}

/// Work out the format from the file name, falling back to the content
pub fn detect_format(content: &str, filename: Option<&str>) -> Result<StructureFormat> {
    if let Some(format) = filename.and_then(format_from_filename) {
        return Ok(format);
    }

    let trimmed = content.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(StructureFormat::Json);
    }

    let lines: Vec<&str> = trimmed.lines().collect();
    if lines.len() < 2 {
        return Err(InputError::UnknownFormat(
            "File too short to determine format".to_string(),
        ));
    }

    if looks_like_xyz(&lines) {
        return Ok(StructureFormat::Xyz);
    }
    if lines.len() >= 8 && parse_number(lines[1].trim()).is_some() {
        return Ok(StructureFormat::Poscar);
    }
    if looks_like_cif(&lines) {
        return Ok(StructureFormat::Cif);
    }

    log::error!("Unable to determine file format");
    Err(InputError::UnknownFormat(
        filename.unwrap_or("content").to_string(),
    ))
}
