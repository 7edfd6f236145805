/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! CIF reader
//!
//! Reads the unit cell, the `_atom_site_*` loop and, when present, the
//! symmetry operations used to expand the asymmetric unit.

use super::config::{ParserConfig, StructureFormat};
use super::errors::{InputError, Result};
use super::numeric::{clean_element_symbol, parse_number, strip_uncertainty};
use crate::atoms::coordinates::{frac_to_cart, wrap_fractional};
use crate::atoms::database::extract_element_symbol;
use crate::atoms::{Lattice, Site, Species, Structure};
use crate::utils::{Matrix3x3, Vec3};

const FORMAT: StructureFormat = StructureFormat::Cif;

const SYMOP_TAGS: [&str; 2] = ["_symmetry_equiv_pos_as_xyz", "_space_group_symop_operation_xyz"];

/// Parse CIF content with the default configuration
pub fn parse_cif(content: &str) -> Result<Structure> {
    parse_cif_with_config(content, &ParserConfig::default())
}

/// Parse CIF content
pub fn parse_cif_with_config(content: &str, config: &ParserConfig) -> Result<Structure> {
    read_cif(content, config).inspect_err(|err| log::error!("Error parsing CIF file: {}", err))
}

/// An affine operation on fractional coordinates, `x' = R·x + t`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetryOperation {
    pub rotation: Matrix3x3,
    pub translation: Vec3,
}

impl SymmetryOperation {
    /// Parse an operation written as `-x+1/2, y, z+1/4`
    pub fn parse(text: &str) -> Option<Self> {
        let cleaned = text.replace(['\'', '"', ' '], "").to_lowercase();
        let parts: Vec<&str> = cleaned.split(',').collect();
        if parts.len() != 3 {
            return None;
        }
        let mut op = SymmetryOperation {
            rotation: [[0.0; 3]; 3],
            translation: [0.0; 3],
        };
        for (row, expr) in parts.iter().enumerate() {
            let (coeffs, shift) = parse_affine(expr)?;
            op.rotation[row] = coeffs;
            op.translation[row] = shift;
        }
        Some(op)
    }

    pub fn apply(&self, p: &Vec3) -> Vec3 {
        let mut out = self.translation;
        for (row, value) in out.iter_mut().enumerate() {
            *value += (0..3).map(|k| self.rotation[row][k] * p[k]).sum::<f64>();
        }
        out
    }
}

/// Coefficients of x, y, z and the constant term of one component
fn parse_affine(expr: &str) -> Option<(Vec3, f64)> {
    if expr.is_empty() {
        return None;
    }
    let mut terms = Vec::new();
    let mut current = String::new();
    for c in expr.chars() {
        if (c == '+' || c == '-') && !current.is_empty() {
            terms.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    terms.push(current);

    let mut coeffs = [0.0; 3];
    let mut shift = 0.0;
    for term in terms {
        let (sign, body) = match term.strip_prefix('-') {
            Some(rest) => (-1.0, rest),
            None => (1.0, term.strip_prefix('+').unwrap_or(&term)),
        };
        match body.find(['x', 'y', 'z']) {
            Some(pos) => {
                let axis = match &body[pos..pos + 1] {
                    "x" => 0,
                    "y" => 1,
                    _ => 2,
                };
                let factor = body[..pos].trim_end_matches('*');
                let factor = if factor.is_empty() {
                    1.0
                } else {
                    parse_fraction(factor)?
                };
                coeffs[axis] += sign * factor;
            }
            None => shift += sign * parse_fraction(body)?,
        }
    }
    Some((coeffs, shift))
}

fn parse_fraction(text: &str) -> Option<f64> {
    match text.split_once('/') {
        Some((num, den)) => {
            let den = parse_number(den)?;
            (den != 0.0).then(|| parse_number(num).map(|n| n / den)).flatten()
        }
        None => parse_number(text),
    }
}

/// Split a CIF data line into values, keeping quoted strings whole
fn cif_tokens(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.trim().chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '\'' || c == '"' {
            chars.next();
            let value: String = chars.by_ref().take_while(|&ch| ch != c).collect();
            tokens.push(value);
        } else {
            let mut value = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                value.push(ch);
                chars.next();
            }
            tokens.push(value);
        }
    }
    tokens
}

#[derive(Debug, Default)]
struct CifLoop {
    headers: Vec<String>,
    rows: Vec<(usize, String)>,
}

impl CifLoop {
    fn column(&self, tag: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(tag))
    }
}

/// Cell values and every loop, in file order
fn scan(lines: &[&str]) -> (Vec<(String, String)>, Vec<CifLoop>) {
    let mut items = Vec::new();
    let mut loops: Vec<CifLoop> = Vec::new();
    let mut current: Option<CifLoop> = None;

    for (idx, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if line.starts_with('#') {
            continue;
        }

        let ends_loop = line.is_empty()
            || line.starts_with("loop_")
            || line.starts_with("data_")
            || (line.starts_with('_') && current.as_ref().is_some_and(|l| !l.rows.is_empty()));
        if ends_loop {
            if let Some(done) = current.take() {
                loops.push(done);
            }
        }
        if line.is_empty() || line.starts_with("data_") {
            continue;
        }
        if line.starts_with("loop_") {
            current = Some(CifLoop::default());
            continue;
        }

        match current.as_mut() {
            Some(cif_loop) if line.starts_with('_') => {
                cif_loop.headers.push(line.split_whitespace().next().unwrap_or(line).to_string());
            }
            Some(cif_loop) => cif_loop.rows.push((idx + 1, line.to_string())),
            None if line.starts_with('_') => {
                let mut parts = line.splitn(2, char::is_whitespace);
                let tag = parts.next().unwrap_or("").to_string();
                let value = parts.next().unwrap_or("").trim().to_string();
                items.push((tag, value));
            }
            None => {}
        }
    }
    if let Some(done) = current.take() {
        loops.push(done);
    }
    (items, loops)
}

fn cell_value(items: &[(String, String)], tag: &str, default: f64) -> Result<f64> {
    match items.iter().find(|(t, _)| t == tag) {
        Some((_, value)) => parse_number(strip_uncertainty(value))
            .ok_or_else(|| InputError::parse(FORMAT, format!("Invalid value for {}: '{}'", tag, value))),
        None => {
            log::debug!("{} missing, using {}", tag, default);
            Ok(default)
        }
    }
}

fn symmetry_operations(loops: &[CifLoop]) -> Vec<SymmetryOperation> {
    let Some((sym_loop, column)) = loops
        .iter()
        .find_map(|l| SYMOP_TAGS.iter().find_map(|tag| l.column(tag)).map(|col| (l, col)))
    else {
        return Vec::new();
    };

    sym_loop
        .rows
        .iter()
        .filter_map(|(line_number, row)| {
            let tokens = cif_tokens(row);
            // Unquoted operations with spaces split into several tokens
            let text = if tokens.len() > sym_loop.headers.len() {
                tokens[column..].join("")
            } else {
                tokens.get(column)?.clone()
            };
            let op = SymmetryOperation::parse(&text);
            if op.is_none() {
                log::warn!("Skipping symmetry operation '{}' on line {}", text, line_number);
            }
            op
        })
        .collect()
}

struct AsymmetricSite {
    element: String,
    label: String,
    abc: Vec3,
    occupancy: f64,
}

fn atom_sites(atom_loop: &CifLoop) -> Result<Vec<AsymmetricSite>> {
    let col = |tag: &str| atom_loop.column(tag);
    let (Some(x), Some(y), Some(z)) = (
        col("_atom_site_fract_x"),
        col("_atom_site_fract_y"),
        col("_atom_site_fract_z"),
    ) else {
        return Err(InputError::parse(FORMAT, "Atom site loop lacks fractional coordinates"));
    };
    let label_col = col("_atom_site_label");
    let symbol_col = col("_atom_site_type_symbol");
    let occ_col = col("_atom_site_occupancy");
    if label_col.is_none() && symbol_col.is_none() {
        return Err(InputError::parse(FORMAT, "Atom site loop lacks labels and type symbols"));
    }

    let width = atom_loop.headers.len();
    let mut pending: Vec<String> = Vec::new();
    let mut sites = Vec::new();

    for (line_number, row) in &atom_loop.rows {
        pending.extend(cif_tokens(row));
        while pending.len() >= width {
            let values: Vec<String> = pending.drain(..width).collect();
            let coord = |i: usize| parse_number(strip_uncertainty(&values[i]));
            let (Some(fx), Some(fy), Some(fz)) = (coord(x), coord(y), coord(z)) else {
                log::warn!("Skipping atom site with invalid coordinates on line {}", line_number);
                continue;
            };

            let label = label_col.map(|i| values[i].clone());
            let raw_symbol = symbol_col
                .map(|i| values[i].clone())
                .or_else(|| label.clone())
                .unwrap_or_default();
            let element = match extract_element_symbol(&raw_symbol) {
                Some(symbol) => symbol.to_string(),
                None => clean_element_symbol(&raw_symbol, sites.len()),
            };
            let occupancy = occ_col
                .and_then(|i| parse_number(strip_uncertainty(&values[i])))
                .unwrap_or(1.0);

            sites.push(AsymmetricSite {
                label: label.unwrap_or_else(|| element.clone()),
                element,
                abc: [fx, fy, fz],
                occupancy,
            });
        }
    }
    if !pending.is_empty() {
        log::warn!("Ignoring {} trailing atom site values", pending.len());
    }
    Ok(sites)
}

fn same_periodic_position(p: &Vec3, q: &Vec3, tolerance: f64) -> bool {
    (0..3).all(|k| {
        let d = (p[k] - q[k]).abs();
        d < tolerance || 1.0 - d < tolerance
    })
}

/// The site as written followed by its distinct symmetry images
///
/// Generated images are wrapped to [0, 1); the written position is kept
/// unchanged so operations that map the site onto itself add nothing.
fn expand_site(abc: &Vec3, ops: &[SymmetryOperation], tolerance: f64) -> Vec<Vec3> {
    let mut seen = vec![wrap_fractional(abc)];
    let mut positions = vec![*abc];
    for op in ops {
        let p = wrap_fractional(&op.apply(abc));
        if !seen.iter().any(|q| same_periodic_position(&p, q, tolerance)) {
            seen.push(p);
            positions.push(p);
        }
    }
    positions
}

fn read_cif(content: &str, config: &ParserConfig) -> Result<Structure> {
    let lines: Vec<&str> = content.trim().lines().collect();
    if lines.len() < 2 {
        return Err(InputError::parse(FORMAT, "CIF file too short"));
    }

    let (items, loops) = scan(&lines);
    let lattice = Lattice::from_parameters(
        cell_value(&items, "_cell_length_a", 1.0)?,
        cell_value(&items, "_cell_length_b", 1.0)?,
        cell_value(&items, "_cell_length_c", 1.0)?,
        cell_value(&items, "_cell_angle_alpha", 90.0)?,
        cell_value(&items, "_cell_angle_beta", 90.0)?,
        cell_value(&items, "_cell_angle_gamma", 90.0)?,
    );

    let atom_loop = loops
        .iter()
        .find(|l| l.column("_atom_site_fract_x").is_some())
        .ok_or_else(|| InputError::parse(FORMAT, "No atom site loop found"))?;
    let asymmetric = atom_sites(atom_loop)?;

    let ops = if config.apply_cif_symmetry {
        symmetry_operations(&loops)
    } else {
        Vec::new()
    };
    if !ops.is_empty() {
        log::debug!("Applying {} symmetry operations", ops.len());
    }

    let mut sites = Vec::new();
    for site in &asymmetric {
        let positions = if ops.is_empty() {
            vec![site.abc]
        } else {
            expand_site(&site.abc, &ops, config.symmetry_tolerance)
        };
        for abc in positions {
            sites.push(Site::new(
                vec![Species::with_occupancy(site.element.as_str(), site.occupancy)],
                abc,
                frac_to_cart(&abc, lattice.matrix()),
                site.label.clone(),
            ));
        }
    }

    if sites.is_empty() {
        return Err(InputError::parse(FORMAT, "No atom sites found in CIF file"));
    }
    Ok(Structure::crystal(lattice, sites))
}
