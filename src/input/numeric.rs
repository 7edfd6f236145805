/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Number and token helpers shared by the text parsers

use crate::atoms::database::{ElementTable, FALLBACK_ELEMENTS};
use crate::utils::Vec3;

/// Parse a float written in any of the common notations
///
/// Accepts `1.5e-3`, Fortran `1.5D-3` and Mathematica `1.5*^-3`. Non-finite
/// values are rejected.
pub fn parse_number(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    let normalized = token.replace("*^", "e").replace(['d', 'D'], "e");
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a non-negative integer count
pub fn parse_count(token: &str) -> Option<usize> {
    token.trim().parse::<usize>().ok()
}

/// Strip a CIF standard uncertainty suffix: `5.431(2)` becomes `5.431`
pub fn strip_uncertainty(token: &str) -> &str {
    token.split('(').next().unwrap_or(token).trim()
}

/// Split tokens such as `0.1-0.2-0.3` at minus signs that start a new number
///
/// A minus at the start of a token or right after an exponent marker stays.
pub fn split_concatenated(token: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in token.chars() {
        let starts_number = c == '-' && !current.is_empty() && !matches!(prev, Some('e' | 'E'));
        if starts_number {
            parts.push(std::mem::take(&mut current));
        }
        current.push(c);
        prev = Some(c);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// The first three numbers of a coordinate line
///
/// Lines with fewer than three whitespace-separated tokens are re-split
/// at concatenated minus signs first.
pub fn parse_coordinate_line(line: &str) -> Option<Vec3> {
    let mut tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    if tokens.len() < 3 {
        tokens = tokens.iter().flat_map(|t| split_concatenated(t)).collect();
    }
    if tokens.len() < 3 {
        return None;
    }
    Some([
        parse_number(&tokens[0])?,
        parse_number(&tokens[1])?,
        parse_number(&tokens[2])?,
    ])
}

/// Canonical element symbol for a raw token, with a deterministic fallback
///
/// Suffixes after `_` or `/` are dropped (`H_pv`, `O/12345abc`). Unknown
/// symbols map onto the light elements by `index`, with a warning.
pub fn clean_element_symbol(raw: &str, index: usize) -> String {
    let stem = raw.split(['_', '/']).next().unwrap_or(raw).trim();
    if let Some(element) = ElementTable::global().get(stem) {
        return element.symbol.to_string();
    }
    let fallback = FALLBACK_ELEMENTS[index % FALLBACK_ELEMENTS.len()];
    log::warn!("Invalid element symbol '{}', using fallback '{}'", raw, fallback);
    fallback.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.5", 1.5)]
    #[case("-7.22293142224e-6", -7.22293142224e-6)]
    #[case("1.5D-3", 1.5e-3)]
    #[case("2.0d2", 200.0)]
    #[case("3*^2", 300.0)]
    #[case("+4", 4.0)]
    fn test_parse_number(#[case] token: &str, #[case] expected: f64) {
        assert_eq!(parse_number(token), Some(expected));
    }

    #[test]
    fn test_parse_number_rejects() {
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn test_concatenated_coordinates() {
        assert_eq!(split_concatenated("0.1-0.2-0.3"), vec!["0.1", "-0.2", "-0.3"]);
        assert_eq!(split_concatenated("-1e-5-2"), vec!["-1e-5", "-2"]);
        assert_eq!(parse_coordinate_line("0.1-0.2-0.3"), Some([0.1, -0.2, -0.3]));
        assert_eq!(parse_coordinate_line("0.5 0.5-0.25"), Some([0.5, 0.5, -0.25]));
        assert_eq!(parse_coordinate_line("1.0 2.0 3.0 T T F"), Some([1.0, 2.0, 3.0]));
        assert_eq!(parse_coordinate_line("1.0 2.0"), None);
    }

    #[test]
    fn test_strip_uncertainty() {
        assert_eq!(strip_uncertainty("5.431(2)"), "5.431");
        assert_eq!(strip_uncertainty("90"), "90");
    }

    #[test]
    fn test_clean_element_symbol() {
        assert_eq!(clean_element_symbol("H_pv", 0), "H");
        assert_eq!(clean_element_symbol("O/12345abc", 0), "O");
        assert_eq!(clean_element_symbol("Fe", 0), "Fe");
        assert_eq!(clean_element_symbol("Element0", 0), "H");
        assert_eq!(clean_element_symbol("Xx", 11), "He");
    }
}
