/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Detection of trajectory formats that are not parsed
//!
//! Binary and simulation-package formats are recognised by extension or
//! content and reported with suggested conversions to a supported format.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// A suggested way to convert a file into a supported format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionHint {
    /// Python package providing the conversion
    pub tool: String,
    /// Snippet performing it
    pub code: String,
}

/// A recognised but unsupported file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsupportedFormat {
    pub format_name: String,
    pub filename: String,
    pub message: String,
    pub conversions: Vec<ConversionHint>,
}

impl UnsupportedFormat {
    fn new(format_name: &str, filename: &str, conversions: Vec<ConversionHint>) -> Self {
        Self {
            format_name: format_name.to_string(),
            filename: filename.to_string(),
            message: format!(
                "The file {} appears to be a {} file, which is not directly supported.",
                filename,
                format_name.to_lowercase()
            ),
            conversions,
        }
    }
}

fn hint(tool: &str, code: String) -> ConversionHint {
    ConversionHint {
        tool: tool.to_string(),
        code,
    }
}

/// `filename` with its extension replaced
fn with_extension(filename: &str, extension: &str) -> String {
    Path::new(filename)
        .with_extension(extension)
        .to_string_lossy()
        .into_owned()
}

/// Name reported for content parsed without a file name
pub const UNNAMED_INPUT: &str = "<content>";

/// Whether a byte buffer looks like binary rather than text
///
/// Binary means a NUL byte, more than 10 % control or high bytes, or less
/// than 70 % printable ASCII.
pub fn is_binary(content: &[u8]) -> bool {
    if content.is_empty() {
        return false;
    }
    if content.contains(&0) {
        return true;
    }
    let total = content.len() as f64;
    let control = content
        .iter()
        .filter(|&&b| matches!(b, 0x00..=0x08 | 0x0E..=0x1F | 0x7F..=0xFF))
        .count();
    let printable = content.iter().filter(|&&b| (0x20..=0x7E).contains(&b)).count();

    control as f64 / total > 0.1 || (printable as f64 / total) < 0.7
}

/// Classify a file the parsers cannot read
///
/// Returns `None` when the file may be parseable.
pub fn detect_unsupported_format(filename: &str, content: &[u8]) -> Option<UnsupportedFormat> {
    let lower = filename.to_lowercase();

    if lower.ends_with(".traj") {
        let xyz = with_extension(filename, "xyz");
        let json = with_extension(filename, "json");
        return Some(UnsupportedFormat::new(
            "ASE Binary Trajectory",
            filename,
            vec![
                hint(
                    "ASE",
                    format!(
                        "from ase.io import read, write\n\
                         traj = read('{filename}', index=':')\n\
                         write('{xyz}', traj)"
                    ),
                ),
                hint(
                    "pymatgen",
                    format!(
                        "from pymatgen.io.ase import AseAtomsAdaptor\n\
                         from ase.io import read\n\
                         import json\n\n\
                         traj = read('{filename}', index=':')\n\
                         structures = [AseAtomsAdaptor.get_structure(atoms) for atoms in traj]\n\
                         data = {{\"frames\": [{{\"structure\": s.as_dict(), \"step\": i}} for i, s in enumerate(structures)]}}\n\
                         with open('{json}', 'w') as file:\n    json.dump(data, file)"
                    ),
                ),
            ],
        ));
    }

    if lower.ends_with(".dump") || lower.ends_with(".lammpstrj") {
        return Some(UnsupportedFormat::new(
            "LAMMPS Trajectory",
            filename,
            vec![hint(
                "ASE",
                format!(
                    "from ase.io import read, write\n\
                     traj = read('{filename}', index=':', format='lammps-dump-text')\n\
                     write('{}', traj)",
                    with_extension(filename, "xyz")
                ),
            )],
        ));
    }

    if lower.ends_with(".nc") || lower.ends_with(".netcdf") {
        return Some(UnsupportedFormat::new(
            "NetCDF Trajectory",
            filename,
            vec![hint(
                "MDAnalysis",
                format!(
                    "import MDAnalysis as mda\n\
                     u = mda.Universe('topology.pdb', '{filename}')\n\
                     u.atoms.write('{}', frames='all')",
                    with_extension(filename, "xyz")
                ),
            )],
        ));
    }

    if lower.ends_with(".dcd") {
        return Some(UnsupportedFormat::new(
            "DCD Trajectory",
            filename,
            vec![hint(
                "MDAnalysis",
                format!(
                    "import MDAnalysis as mda\n\
                     u = mda.Universe('topology.psf', '{filename}')\n\
                     u.atoms.write('{}', frames='all')",
                    with_extension(filename, "xyz")
                ),
            )],
        ));
    }

    if is_binary(content) {
        let mut format = UnsupportedFormat::new("Binary File", filename, Vec::new());
        format.message = format!(
            "The file {} appears to be a binary file and cannot be parsed as text. \
             Convert it to multi-frame XYZ, pymatgen trajectory JSON or VASP XDATCAR.",
            filename
        );
        return Some(format);
    }

    None
}

/// Whether a file name suggests trajectory data
///
/// Compressed `.gz` names are judged by their inner name.
pub fn is_trajectory_file(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    let name = lower.strip_suffix(".gz").unwrap_or(&lower);

    const EXTENSIONS: [&str; 5] = ["traj", "xyz", "extxyz", "h5", "hdf5"];
    const KEYWORDS: [&str; 5] = ["xdatcar", "trajectory", "traj", "md", "relax"];

    let has_extension = name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| EXTENSIONS.contains(&ext));
    has_extension || KEYWORDS.iter().any(|kw| name.contains(kw))
}
