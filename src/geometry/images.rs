/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Image atoms on unit-cell boundaries
//!
//! Sites lying on a cell face, edge or corner get periodic copies on the
//! opposite faces so a rendered cell looks complete.

use serde::{Deserialize, Serialize};

use crate::atoms::Structure;
use crate::utils::math::{add3, scale3};
use crate::utils::Vec3;

/// Lower bound of the fractional window a wrapped site should stay in
const CELL_WINDOW_MIN: f64 = -0.1;
/// Upper bound of the fractional window a wrapped site should stay in
const CELL_WINDOW_MAX: f64 = 1.1;
/// Fraction of out-of-window sites above which a structure looks unwrapped
const TRAJECTORY_SITE_FRACTION: f64 = 0.1;

/// Options for image-atom generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageAtomOptions {
    /// Fractional distance from a face within which a site counts as on it
    pub tolerance: f64,
}

impl Default for ImageAtomOptions {
    fn default() -> Self {
        Self { tolerance: 0.05 }
    }
}

/// A periodic copy of an existing site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAtom {
    /// Index of the site this is a copy of
    pub site_index: usize,
    pub xyz: Vec3,
    pub abc: Vec3,
}

fn outside_cell_count(structure: &Structure) -> usize {
    structure
        .sites
        .iter()
        .filter(|site| {
            site.abc
                .iter()
                .any(|&x| !(CELL_WINDOW_MIN..=CELL_WINDOW_MAX).contains(&x))
        })
        .count()
}

/// Whether the sites look like unwrapped trajectory coordinates
///
/// True when more than 10 % of sites have a fractional coordinate outside
/// [-0.1, 1.1].
pub fn is_trajectory_like(structure: &Structure) -> bool {
    let outside = outside_cell_count(structure);
    let trajectory_like = outside as f64 > structure.sites.len() as f64 * TRAJECTORY_SITE_FRACTION;
    if trajectory_like {
        log::info!(
            "{} of {} sites lie outside the unit cell, treating structure as trajectory data",
            outside,
            structure.sites.len()
        );
    }
    trajectory_like
}

/// Translations (axis, +1 / -1) that carry a site onto opposite faces
fn edge_translations(abc: &Vec3, tolerance: f64) -> Vec<(usize, f64)> {
    let mut edges = Vec::with_capacity(3);
    for (axis, &x) in abc.iter().enumerate() {
        if x.abs() < tolerance {
            edges.push((axis, 1.0));
        }
        if (x - 1.0).abs() < tolerance {
            edges.push((axis, -1.0));
        }
    }
    edges
}

/// Image atoms for all sites near a cell boundary
///
/// Returns nothing for molecules and trajectory-like structures. Each
/// non-empty combination of a site's boundary translations yields one
/// image, so a corner site produces seven.
pub fn find_image_atoms(structure: &Structure, options: &ImageAtomOptions) -> Vec<ImageAtom> {
    let Some(lattice) = &structure.lattice else {
        return Vec::new();
    };
    if is_trajectory_like(structure) {
        return Vec::new();
    }
    let vectors = lattice.matrix();

    let mut images = Vec::new();
    for (site_index, site) in structure.sites.iter().enumerate() {
        let edges = edge_translations(&site.abc, options.tolerance);

        for mask in 1u32..(1 << edges.len()) {
            let mut xyz = site.xyz;
            let mut abc = site.abc;
            for (bit, &(axis, direction)) in edges.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    xyz = add3(xyz, scale3(vectors[axis], direction));
                    abc[axis] += direction;
                }
            }
            images.push(ImageAtom {
                site_index,
                xyz,
                abc,
            });
        }
    }

    log::debug!("Generated {} image atoms", images.len());
    images
}

/// A copy of the structure with image atoms appended as extra sites
///
/// Image sites copy species, label and properties from their source site.
/// Trajectory-like structures come back unchanged.
pub fn get_pbc_image_sites(structure: &Structure, options: &ImageAtomOptions) -> Structure {
    let images = find_image_atoms(structure, options);
    let mut result = structure.clone();
    result.sites.reserve(images.len());

    for image in images {
        let mut site = structure.sites[image.site_index].clone();
        site.xyz = image.xyz;
        site.abc = image.abc;
        result.sites.push(site);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_translations() {
        assert_eq!(edge_translations(&[0.5, 0.5, 0.5], 0.05), vec![]);
        assert_eq!(edge_translations(&[0.0, 0.5, 0.98], 0.05), vec![(0, 1.0), (2, -1.0)]);
        // Both flags fire when the tolerance spans the whole cell
        assert_eq!(edge_translations(&[0.5, 0.5, 0.5], 0.6).len(), 6);
    }

    #[test]
    fn test_default_tolerance() {
        assert_eq!(ImageAtomOptions::default().tolerance, 0.05);
        let opts: ImageAtomOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, ImageAtomOptions::default());
    }
}
