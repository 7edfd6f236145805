/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Structure file input
//!
//! Text parsers for POSCAR, XYZ / extended XYZ, CIF and pymatgen JSON, a
//! format-detecting dispatcher, and detection of trajectory formats that
//! are recognised but not parsed. Parsers take already-decoded text and
//! never touch the file system.

pub mod cif;
pub mod config;
pub mod errors;
pub mod json;
pub mod numeric;
pub mod parser;
pub mod poscar;
pub mod unsupported;
pub mod xyz;

pub use cif::{parse_cif, parse_cif_with_config, SymmetryOperation};
pub use config::{ParserConfig, StructureFormat};
pub use errors::{InputError, Result};
pub use json::parse_json_structure;
pub use parser::{detect_format, format_from_filename, parse_structure_file, StructureParser};
pub use poscar::parse_poscar;
pub use unsupported::{
    detect_unsupported_format, is_binary, is_trajectory_file, ConversionHint, UnsupportedFormat, UNNAMED_INPUT,
};
pub use xyz::parse_xyz;
