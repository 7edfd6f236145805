/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! VASP POSCAR / CONTCAR reader

use serde_json::Value;

use super::config::StructureFormat;
use super::errors::{InputError, Result};
use super::numeric::{clean_element_symbol, parse_coordinate_line, parse_count, parse_number};
use crate::atoms::coordinates::{cart_to_frac_with_inverse, frac_to_cart};
use crate::atoms::{Lattice, Site, Structure};
use crate::utils::{determinant_3x3, matrix_inverse_3x3, Matrix3x3};

const FORMAT: StructureFormat = StructureFormat::Poscar;

/// Maximum number of lines element symbols may be spread over
const MAX_SYMBOL_LINES: usize = 10;

/// Parse POSCAR content into a periodic structure
///
/// Supports VASP 4 (counts only) and VASP 5+ (symbols and counts) headers,
/// negative scale factors (target volume), selective dynamics, and both
/// direct and Cartesian coordinates.
pub fn parse_poscar(content: &str) -> Result<Structure> {
    read_poscar(content).inspect_err(|err| log::error!("Error parsing POSCAR file: {}", err))
}

fn first_token(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}

fn starts_with_digit(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn parse_lattice_vector(line: &str, line_number: usize) -> Result<[f64; 3]> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 3 {
        return Err(InputError::InvalidLatticeVector {
            line: line_number,
            found: tokens.len(),
        });
    }
    let mut vector = [0.0; 3];
    for (slot, token) in vector.iter_mut().zip(&tokens) {
        *slot = parse_number(token).ok_or_else(|| {
            InputError::at_line(FORMAT, line_number, format!("Invalid lattice component '{}'", token))
        })?;
    }
    Ok(vector)
}

fn parse_counts(line: &str, line_number: usize) -> Result<Vec<usize>> {
    line.split_whitespace()
        .map(|token| {
            parse_count(token).ok_or_else(|| {
                InputError::at_line(FORMAT, line_number, format!("Invalid atom count '{}'", token))
            })
        })
        .collect()
}

/// Element symbols and counts, plus the index of the line after them
fn read_species_header(lines: &[&str], start: usize) -> Result<(Vec<String>, Vec<usize>, usize)> {
    let line = lines
        .get(start)
        .ok_or_else(|| InputError::at_line(FORMAT, start + 1, "Missing element/count line"))?;

    if starts_with_digit(first_token(line)) {
        // VASP 4: counts only
        let counts = parse_counts(line, start + 1)?;
        let symbols = (0..counts.len())
            .map(|idx| clean_element_symbol(&format!("Element{}", idx), idx))
            .collect();
        return Ok((symbols, counts, start + 1));
    }

    let symbol_lines = (1..MAX_SYMBOL_LINES)
        .take_while(|offset| start + offset < lines.len())
        .find(|offset| starts_with_digit(first_token(lines[start + offset])))
        .unwrap_or(1);

    let symbols: Vec<String> = lines[start..start + symbol_lines]
        .iter()
        .flat_map(|line| line.split_whitespace().map(str::to_string))
        .collect();

    let mut counts = Vec::new();
    for idx in start + symbol_lines..start + 2 * symbol_lines {
        let line = lines
            .get(idx)
            .ok_or_else(|| InputError::at_line(FORMAT, idx + 1, "Missing atom count line"))?;
        counts.extend(parse_counts(line, idx + 1)?);
    }

    Ok((symbols, counts, start + 2 * symbol_lines))
}

fn selective_flags(line: &str) -> Option<Value> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 6 {
        return None;
    }
    Some(Value::Array(
        tokens[3..6].iter().map(|t| Value::Bool(*t == "T")).collect(),
    ))
}

/// Lines from the comment onwards
///
/// Leading blank lines are dropped unless the scale factor directly follows
/// a blank first line, in which case that line is an empty comment.
fn poscar_lines(content: &str) -> Vec<&str> {
    let lines: Vec<&str> = content.lines().collect();
    let blank_comment = lines.len() > 1
        && lines[0].trim().is_empty()
        && parse_number(first_token(lines[1])).is_some();
    if blank_comment {
        return lines;
    }
    let start = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());
    lines[start..].to_vec()
}

fn read_poscar(content: &str) -> Result<Structure> {
    let lines = poscar_lines(content);
    if lines.len() < 8 {
        return Err(InputError::parse(FORMAT, "POSCAR file too short"));
    }

    let mut scale = parse_number(first_token(lines[1]))
        .ok_or_else(|| InputError::at_line(FORMAT, 2, "Invalid scaling factor"))?;

    let raw: Matrix3x3 = [
        parse_lattice_vector(lines[2], 3)?,
        parse_lattice_vector(lines[3], 4)?,
        parse_lattice_vector(lines[4], 5)?,
    ];

    if scale < 0.0 {
        let volume = determinant_3x3(&raw).abs();
        if volume == 0.0 {
            return Err(InputError::at_line(FORMAT, 2, "Cannot rescale a zero-volume cell"));
        }
        scale = (-scale / volume).cbrt();
    }
    let matrix = raw.map(|row| row.map(|x| x * scale));

    let (symbols, counts, mut line_index) = read_species_header(&lines, 5)?;
    if symbols.len() != counts.len() {
        return Err(InputError::parse(
            FORMAT,
            format!(
                "Mismatch between element symbols ({}) and atom counts ({})",
                symbols.len(),
                counts.len()
            ),
        ));
    }

    let mut mode = lines
        .get(line_index)
        .map(|l| l.trim().to_uppercase())
        .ok_or_else(|| InputError::parse(FORMAT, "Missing coordinate mode line"))?;

    let selective = mode.starts_with('S');
    if selective {
        line_index += 1;
        mode = lines
            .get(line_index)
            .map(|l| l.trim().to_uppercase())
            .ok_or_else(|| InputError::parse(FORMAT, "Missing coordinate mode after selective dynamics"))?;
    }

    let direct = mode.starts_with('D');
    if !direct && !(mode.starts_with('C') || mode.starts_with('K')) {
        return Err(InputError::at_line(
            FORMAT,
            line_index + 1,
            format!("Unknown coordinate mode '{}'", mode),
        ));
    }

    let inverse = if direct {
        None
    } else {
        Some(matrix_inverse_3x3(&matrix)?)
    };

    let total: usize = counts.iter().sum();
    let mut sites = Vec::with_capacity(total);

    for (elem_idx, (symbol, &count)) in symbols.iter().zip(&counts).enumerate() {
        let element = clean_element_symbol(symbol, elem_idx);

        for _ in 0..count {
            let atom_index = sites.len();
            let line_number = line_index + 2 + atom_index;
            let line = lines.get(line_number - 1).ok_or(InputError::AtomCountMismatch {
                expected: total,
                found: atom_index,
            })?;
            let coords = parse_coordinate_line(line).ok_or_else(|| {
                InputError::at_line(FORMAT, line_number, format!("Invalid coordinates '{}'", line.trim()))
            })?;

            let (abc, xyz) = match &inverse {
                None => (coords, frac_to_cart(&coords, &matrix)),
                Some(inv) => {
                    let xyz = coords.map(|x| x * scale);
                    (cart_to_frac_with_inverse(&xyz, inv), xyz)
                }
            };

            let mut site = Site::single(&element, abc, xyz, format!("{}{}", element, atom_index + 1));
            if selective {
                if let Some(flags) = selective_flags(line) {
                    site.properties.insert("selective_dynamics".to_string(), flags);
                }
            }
            sites.push(site);
        }
    }

    log::debug!("Parsed POSCAR with {} sites", sites.len());
    Ok(Structure::crystal(Lattice::from_matrix(matrix), sites))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_minimal_direct() {
        let content = "Test\n1.0\n3.0 0.0 0.0\n0.0 3.0 0.0\n0.0 0.0 3.0\nH\n1\nDirect\n0.0 0.0 0.0";
        let structure = parse_poscar(content).unwrap();
        assert_eq!(structure.sites.len(), 1);
        assert_eq!(structure.sites[0].element(), Some("H"));
        assert_eq!(structure.sites[0].label, "H1");
        assert_relative_eq!(structure.lattice.as_ref().unwrap().volume(), 27.0);
    }

    #[test]
    fn test_vasp4_counts_only() {
        let content = "old\n1.0\n2 0 0\n0 2 0\n0 0 2\n1 1\nDirect\n0 0 0\n0.5 0.5 0.5\n";
        let structure = parse_poscar(content).unwrap();
        let elements: Vec<_> = structure.sites.iter().filter_map(|s| s.element()).collect();
        assert_eq!(elements, vec!["H", "He"]);
    }

    #[test]
    fn test_multiline_symbols() {
        let content = "split\n1.0\n4 0 0\n0 4 0\n0 0 4\nFe Co\nNi\n1 1\n1\nDirect\n0 0 0\n0.5 0 0\n0 0.5 0\n";
        let structure = parse_poscar(content).unwrap();
        let elements: Vec<_> = structure.sites.iter().filter_map(|s| s.element()).collect();
        assert_eq!(elements, vec!["Fe", "Co", "Ni"]);
    }

    #[test]
    fn test_selective_dynamics() {
        let content = "sd\n1.0\n3 0 0\n0 3 0\n0 0 3\nO\n1\nSelective dynamics\nCartesian\n1.5 1.5 1.5 T F T\n";
        let structure = parse_poscar(content).unwrap();
        let site = &structure.sites[0];
        assert_relative_eq!(site.abc[0], 0.5, epsilon = 1e-12);
        assert_eq!(
            site.properties["selective_dynamics"],
            serde_json::json!([true, false, true])
        );
    }

    #[test]
    fn test_bad_lattice_line() {
        let content = "bad\n1.0\n3.0 0.0\n0 3 0\n0 0 3\nH\n1\nDirect\n0 0 0";
        assert!(matches!(
            parse_poscar(content),
            Err(InputError::InvalidLatticeVector { line: 3, found: 2 })
        ));
    }

    #[test]
    fn test_blank_comment_line() {
        let content = "\n1.0\n3 0 0\n0 3 0\n0 0 3\nH\n1\nDirect\n0.5 0.5 0.5\n";
        let structure = parse_poscar(content).unwrap();
        assert_eq!(structure.sites.len(), 1);
        assert_eq!(structure.sites[0].xyz, [1.5, 1.5, 1.5]);

        // Blank lines before a real comment are skipped
        let padded = "\n\nHydrogen\n1.0\n3 0 0\n0 3 0\n0 0 3\nH\n1\nDirect\n0 0 0\n";
        assert_eq!(parse_poscar(padded).unwrap().sites.len(), 1);
    }

    #[test]
    fn test_missing_coordinates() {
        let content = "short\n1.0\n3 0 0\n0 3 0\n0 0 3\nH\n2\nDirect\n0 0 0";
        assert!(matches!(
            parse_poscar(content),
            Err(InputError::AtomCountMismatch { expected: 2, found: 1 })
        ));
    }
}
