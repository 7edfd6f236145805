/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Element data table
//!
//! Symbols, standard atomic weights, covalent and van der Waals radii for
//! elements 1 to 118. The table is immutable and built once on first use;
//! callers share it through [`ElementTable::global`].

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Radius used when an element has no tabulated value
pub const FALLBACK_RADIUS: f64 = 1.7;

/// Symbols substituted, in turn, for unrecognised element tokens
pub const FALLBACK_ELEMENTS: [&str; 10] = ["H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne"];

/// Properties of a single element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementData {
    pub atomic_number: u8,
    pub symbol: &'static str,
    /// Standard atomic weight in g/mol
    pub atomic_weight: f64,
    /// Covalent radius in Angstrom
    pub covalent_radius: f64,
    /// Van der Waals radius in Angstrom
    pub vdw_radius: f64,
}

impl ElementData {
    const fn new(
        atomic_number: u8,
        symbol: &'static str,
        atomic_weight: f64,
        covalent_radius: f64,
        vdw_radius: f64,
    ) -> Self {
        Self {
            atomic_number,
            symbol,
            atomic_weight,
            covalent_radius,
            vdw_radius,
        }
    }

    /// Radius of the requested kind
    pub fn radius(&self, kind: RadiusKind) -> f64 {
        match kind {
            RadiusKind::Covalent => self.covalent_radius,
            RadiusKind::VanDerWaals => self.vdw_radius,
        }
    }
}

/// Which tabulated radius a caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusKind {
    #[default]
    Covalent,
    VanDerWaals,
}

// Unmeasured superheavy values are approximations.
static ELEMENTS: [ElementData; 118] = [
    ElementData::new(1, "H", 1.008, 0.31, 1.2),
    ElementData::new(2, "He", 4.0026, 0.28, 1.4),
    ElementData::new(3, "Li", 6.94, 1.28, 1.82),
    ElementData::new(4, "Be", 9.0122, 0.96, 1.53),
    ElementData::new(5, "B", 10.81, 0.84, 1.92),
    ElementData::new(6, "C", 12.011, 0.76, 1.7),
    ElementData::new(7, "N", 14.007, 0.71, 1.55),
    ElementData::new(8, "O", 15.999, 0.66, 1.52),
    ElementData::new(9, "F", 18.998, 0.57, 1.47),
    ElementData::new(10, "Ne", 20.180, 0.58, 1.54),
    ElementData::new(11, "Na", 22.990, 1.66, 2.27),
    ElementData::new(12, "Mg", 24.305, 1.41, 1.73),
    ElementData::new(13, "Al", 26.982, 1.21, 1.84),
    ElementData::new(14, "Si", 28.085, 1.11, 2.1),
    ElementData::new(15, "P", 30.974, 1.07, 1.8),
    ElementData::new(16, "S", 32.06, 1.05, 1.8),
    ElementData::new(17, "Cl", 35.45, 1.02, 1.75),
    ElementData::new(18, "Ar", 39.95, 1.06, 1.88),
    ElementData::new(19, "K", 39.098, 2.03, 2.75),
    ElementData::new(20, "Ca", 40.078, 1.76, 2.31),
    ElementData::new(21, "Sc", 44.956, 1.70, 2.11),
    ElementData::new(22, "Ti", 47.867, 1.60, 1.87),
    ElementData::new(23, "V", 50.942, 1.53, 1.79),
    ElementData::new(24, "Cr", 51.996, 1.39, 1.89),
    ElementData::new(25, "Mn", 54.938, 1.39, 1.97),
    ElementData::new(26, "Fe", 55.845, 1.32, 2.04),
    ElementData::new(27, "Co", 58.933, 1.26, 2.0),
    ElementData::new(28, "Ni", 58.693, 1.24, 1.97),
    ElementData::new(29, "Cu", 63.546, 1.32, 1.96),
    ElementData::new(30, "Zn", 65.38, 1.22, 2.01),
    ElementData::new(31, "Ga", 69.723, 1.22, 1.87),
    ElementData::new(32, "Ge", 72.630, 1.20, 2.11),
    ElementData::new(33, "As", 74.922, 1.19, 1.85),
    ElementData::new(34, "Se", 78.971, 1.20, 1.9),
    ElementData::new(35, "Br", 79.904, 1.20, 1.85),
    ElementData::new(36, "Kr", 83.798, 1.16, 2.02),
    ElementData::new(37, "Rb", 85.468, 2.20, 3.03),
    ElementData::new(38, "Sr", 87.62, 1.95, 2.49),
    ElementData::new(39, "Y", 88.906, 1.90, 2.19),
    ElementData::new(40, "Zr", 91.224, 1.75, 1.86),
    ElementData::new(41, "Nb", 92.906, 1.64, 2.07),
    ElementData::new(42, "Mo", 95.95, 1.54, 2.09),
    ElementData::new(43, "Tc", 98.0, 1.47, 2.09),
    ElementData::new(44, "Ru", 101.07, 1.46, 2.07),
    ElementData::new(45, "Rh", 102.91, 1.42, 1.95),
    ElementData::new(46, "Pd", 106.42, 1.39, 2.02),
    ElementData::new(47, "Ag", 107.87, 1.45, 2.11),
    ElementData::new(48, "Cd", 112.41, 1.44, 2.18),
    ElementData::new(49, "In", 114.82, 1.42, 1.93),
    ElementData::new(50, "Sn", 118.71, 1.39, 2.17),
    ElementData::new(51, "Sb", 121.76, 1.39, 2.06),
    ElementData::new(52, "Te", 127.60, 1.38, 2.06),
    ElementData::new(53, "I", 126.90, 1.39, 1.98),
    ElementData::new(54, "Xe", 131.29, 1.40, 2.16),
    ElementData::new(55, "Cs", 132.91, 2.44, 3.43),
    ElementData::new(56, "Ba", 137.33, 2.15, 2.68),
    ElementData::new(57, "La", 138.91, 2.07, 2.0),
    ElementData::new(58, "Ce", 140.12, 2.04, 2.0),
    ElementData::new(59, "Pr", 140.91, 2.03, 2.0),
    ElementData::new(60, "Nd", 144.24, 2.01, 2.0),
    ElementData::new(61, "Pm", 145.0, 1.99, 2.0),
    ElementData::new(62, "Sm", 150.36, 1.98, 2.0),
    ElementData::new(63, "Eu", 151.96, 1.98, 2.0),
    ElementData::new(64, "Gd", 157.25, 1.96, 2.0),
    ElementData::new(65, "Tb", 158.93, 1.94, 2.0),
    ElementData::new(66, "Dy", 162.50, 1.92, 2.0),
    ElementData::new(67, "Ho", 164.93, 1.92, 2.0),
    ElementData::new(68, "Er", 167.26, 1.89, 2.0),
    ElementData::new(69, "Tm", 168.93, 1.90, 2.0),
    ElementData::new(70, "Yb", 173.05, 1.87, 2.0),
    ElementData::new(71, "Lu", 174.97, 1.87, 2.0),
    ElementData::new(72, "Hf", 178.49, 1.75, 2.0),
    ElementData::new(73, "Ta", 180.95, 1.70, 2.0),
    ElementData::new(74, "W", 183.84, 1.62, 2.0),
    ElementData::new(75, "Re", 186.21, 1.51, 2.0),
    ElementData::new(76, "Os", 190.23, 1.44, 2.0),
    ElementData::new(77, "Ir", 192.22, 1.41, 2.0),
    ElementData::new(78, "Pt", 195.08, 1.36, 2.09),
    ElementData::new(79, "Au", 196.97, 1.36, 2.14),
    ElementData::new(80, "Hg", 200.59, 1.32, 2.23),
    ElementData::new(81, "Tl", 204.38, 1.45, 1.96),
    ElementData::new(82, "Pb", 207.2, 1.46, 2.02),
    ElementData::new(83, "Bi", 208.98, 1.48, 2.07),
    ElementData::new(84, "Po", 209.0, 1.40, 1.97),
    ElementData::new(85, "At", 210.0, 1.50, 2.02),
    ElementData::new(86, "Rn", 222.0, 1.50, 2.2),
    ElementData::new(87, "Fr", 223.0, 2.60, 3.48),
    ElementData::new(88, "Ra", 226.0, 2.21, 2.83),
    ElementData::new(89, "Ac", 227.0, 2.15, 2.0),
    ElementData::new(90, "Th", 232.04, 2.06, 2.0),
    ElementData::new(91, "Pa", 231.04, 2.00, 2.0),
    ElementData::new(92, "U", 238.03, 1.96, 1.86),
    ElementData::new(93, "Np", 237.0, 1.90, 2.0),
    ElementData::new(94, "Pu", 244.0, 1.87, 2.0),
    ElementData::new(95, "Am", 243.0, 1.80, 2.0),
    ElementData::new(96, "Cm", 247.0, 1.69, 2.0),
    ElementData::new(97, "Bk", 247.0, 1.65, 2.0),
    ElementData::new(98, "Cf", 251.0, 1.65, 2.0),
    ElementData::new(99, "Es", 252.0, 1.65, 2.0),
    ElementData::new(100, "Fm", 257.0, 1.65, 2.0),
    ElementData::new(101, "Md", 258.0, 1.65, 2.0),
    ElementData::new(102, "No", 259.0, 1.65, 2.0),
    ElementData::new(103, "Lr", 266.0, 1.65, 2.0),
    ElementData::new(104, "Rf", 267.0, 1.65, 2.0),
    ElementData::new(105, "Db", 268.0, 1.65, 2.0),
    ElementData::new(106, "Sg", 269.0, 1.65, 2.0),
    ElementData::new(107, "Bh", 270.0, 1.65, 2.0),
    ElementData::new(108, "Hs", 277.0, 1.65, 2.0),
    ElementData::new(109, "Mt", 278.0, 1.65, 2.0),
    ElementData::new(110, "Ds", 281.0, 1.65, 2.0),
    ElementData::new(111, "Rg", 282.0, 1.65, 2.0),
    ElementData::new(112, "Cn", 285.0, 1.65, 2.0),
    ElementData::new(113, "Nh", 286.0, 1.65, 2.0),
    ElementData::new(114, "Fl", 289.0, 1.65, 2.0),
    ElementData::new(115, "Mc", 290.0, 1.65, 2.0),
    ElementData::new(116, "Lv", 293.0, 1.65, 2.0),
    ElementData::new(117, "Ts", 294.0, 1.65, 2.0),
    ElementData::new(118, "Og", 294.0, 1.65, 2.0),
];

static TABLE: Lazy<ElementTable> = Lazy::new(ElementTable::build);

/// Symbol-indexed view over the element data
#[derive(Debug)]
pub struct ElementTable {
    by_symbol: HashMap<String, usize>,
}

impl ElementTable {
    fn build() -> Self {
        let by_symbol = ELEMENTS
            .iter()
            .enumerate()
            .map(|(idx, el)| (el.symbol.to_ascii_lowercase(), idx))
            .collect();
        Self { by_symbol }
    }

    /// The process-wide table
    pub fn global() -> &'static ElementTable {
        &TABLE
    }

    /// Look up an element by symbol (case-insensitive)
    pub fn get(&self, symbol: &str) -> Option<&'static ElementData> {
        self.by_symbol
            .get(&symbol.trim().to_ascii_lowercase())
            .map(|&idx| &ELEMENTS[idx])
    }

    /// Look up an element by atomic number
    pub fn by_number(&self, atomic_number: u8) -> Option<&'static ElementData> {
        ELEMENTS.get(usize::from(atomic_number).checked_sub(1)?)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    pub fn atomic_weight(&self, symbol: &str) -> Option<f64> {
        self.get(symbol).map(|el| el.atomic_weight)
    }

    /// Radius of the given kind, or [`FALLBACK_RADIUS`] for unknown symbols
    pub fn radius_or_default(&self, symbol: &str, kind: RadiusKind) -> f64 {
        self.get(symbol)
            .map_or(FALLBACK_RADIUS, |el| el.radius(kind))
    }

    /// Iterate over all elements in order of atomic number
    pub fn iter(&self) -> impl Iterator<Item = &'static ElementData> {
        ELEMENTS.iter()
    }
}

/// Provides element symbols for atomic numbers
pub fn element_symbol(atomic_number: i32) -> Option<&'static str> {
    let z = u8::try_from(atomic_number).ok()?;
    ElementTable::global().by_number(z).map(|el| el.symbol)
}

/// Extract an element symbol from a decorated token
///
/// Handles pseudopotential suffixes (`H_pv`), hashes (`O/12345abc`),
/// site labels (`Fe1`, `O2a`) and charges (`Fe2+`). Two-letter symbols
/// win over one-letter ones. Returns the canonical capitalisation.
pub fn extract_element_symbol(raw: &str) -> Option<&'static str> {
    let letters: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .take(2)
        .collect();
    let table = ElementTable::global();

    if letters.len() == 2 {
        if let Some(el) = table.get(&letters) {
            return Some(el.symbol);
        }
    }
    letters
        .get(..1)
        .and_then(|first| table.get(first))
        .map(|el| el.symbol)
}
