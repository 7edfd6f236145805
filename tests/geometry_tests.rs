/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use approx::assert_relative_eq;
use rstest::rstest;
use structviz::atoms::{Lattice, Site, Structure};
use structviz::geometry::{
    calc_lattice_params, find_image_atoms, get_pbc_image_sites, is_trajectory_like, pbc_dist,
    ImageAtomOptions, PbcDistance,
};
use structviz::utils::cell_to_lattice_matrix;

const CUBIC_10: [[f64; 3]; 3] = [[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]];

fn crystal(matrix: [[f64; 3]; 3], fractional: &[[f64; 3]]) -> Structure {
    let lattice = Lattice::from_matrix(matrix);
    let sites = fractional
        .iter()
        .enumerate()
        .map(|(i, abc)| Site::single("Fe", *abc, lattice.frac_to_cart(abc), format!("Fe{}", i + 1)))
        .collect();
    Structure::crystal(lattice, sites)
}

#[rstest]
#[case(5.1, 6.3, 7.7, 78.0, 95.5, 104.2)]
#[case(4.0, 4.0, 4.0, 90.0, 90.0, 90.0)]
#[case(3.2, 3.2, 5.2, 90.0, 90.0, 120.0)]
fn test_lattice_params_round_trip(
    #[case] a: f64,
    #[case] b: f64,
    #[case] c: f64,
    #[case] alpha: f64,
    #[case] beta: f64,
    #[case] gamma: f64,
) {
    let params = calc_lattice_params(&cell_to_lattice_matrix(a, b, c, alpha, beta, gamma));
    assert_relative_eq!(params.a, a, epsilon = 1e-10);
    assert_relative_eq!(params.b, b, epsilon = 1e-10);
    assert_relative_eq!(params.c, c, epsilon = 1e-10);
    assert_relative_eq!(params.alpha, alpha, epsilon = 1e-8);
    assert_relative_eq!(params.beta, beta, epsilon = 1e-8);
    assert_relative_eq!(params.gamma, gamma, epsilon = 1e-8);
}

#[test]
fn test_pbc_half_cell_separation() {
    // Atoms L/2 apart are exactly L/2 apart under minimum image
    let d = pbc_dist(&[0.0, 0.0, 0.0], &[5.0, 0.0, 0.0], &CUBIC_10, None).unwrap();
    assert_relative_eq!(d, 5.0, epsilon = 1e-10);
}

#[test]
fn test_pbc_wraps_across_boundary() {
    // 0.1 and 0.9 fractional are 0.2 L apart through the boundary
    let d = pbc_dist(&[1.0, 1.0, 1.0], &[9.0, 9.0, 9.0], &CUBIC_10, None).unwrap();
    assert_relative_eq!(d, (3.0_f64 * 4.0).sqrt(), epsilon = 1e-10);
}

#[test]
fn test_cached_inverse_matches_direct_call() {
    let lattice = [[5.0, 0.0, 0.0], [2.5, 4.33, 0.0], [1.0, 1.0, 4.0]];
    let cache = PbcDistance::new(&lattice).unwrap();
    let points = [[0.1, 0.2, 0.3], [4.8, 4.0, 3.9], [2.5, 2.0, 2.0], [7.0, 5.0, 4.1]];
    for p in &points {
        for q in &points {
            let wrapped = cache.distance(p, q);
            assert_relative_eq!(wrapped, pbc_dist(p, q, &lattice, None).unwrap(), epsilon = 1e-12);
            assert_relative_eq!(wrapped, cache.distance(q, p), epsilon = 1e-12);
        }
    }
}

#[test]
fn test_singular_lattice_is_an_error() {
    let flat = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]];
    assert!(pbc_dist(&[0.0; 3], &[0.5; 3], &flat, None).is_err());
}

#[test]
fn test_corner_face_and_interior_images() {
    let structure = crystal(CUBIC_10, &[[0.0, 0.0, 0.0], [0.5, 0.5, 0.0], [0.5, 0.5, 0.5]]);
    let images = find_image_atoms(&structure, &ImageAtomOptions::default());

    // corner: 7 images, face: 1, interior: none
    assert_eq!(images.iter().filter(|i| i.site_index == 0).count(), 7);
    assert_eq!(images.iter().filter(|i| i.site_index == 1).count(), 1);
    assert_eq!(images.iter().filter(|i| i.site_index == 2).count(), 0);

    let face = images.iter().find(|i| i.site_index == 1).unwrap();
    assert_relative_eq!(face.xyz[2], 10.0);
    assert_relative_eq!(face.abc[2], 1.0);
}

#[test]
fn test_image_sites_leave_input_untouched() {
    let structure = crystal(CUBIC_10, &[[0.0, 0.0, 0.0], [0.98, 0.5, 0.5], [0.3, 0.3, 0.3]]);
    let before = structure.clone();
    let options = ImageAtomOptions::default();

    let images = find_image_atoms(&structure, &options);
    let with_images = get_pbc_image_sites(&structure, &options);

    assert_eq!(with_images.sites.len(), structure.sites.len() + images.len());
    assert_eq!(structure, before);
    assert_eq!(with_images.sites[..3], structure.sites[..]);
    assert_eq!(with_images.sites[3].label, "Fe1");
}

#[test]
fn test_molecules_have_no_images() {
    let molecule = Structure::molecule(vec![Site::single("O", [0.0; 3], [0.0; 3], "O1")]);
    assert!(find_image_atoms(&molecule, &ImageAtomOptions::default()).is_empty());
    assert_eq!(get_pbc_image_sites(&molecule, &ImageAtomOptions::default()), molecule);
}

#[test]
fn test_trajectory_like_structures_are_skipped() {
    // 2 of 10 sites well outside the cell
    let mut fractional = vec![[0.0, 0.5, 0.5]; 8];
    fractional.push([1.5, 0.5, 0.5]);
    fractional.push([-0.4, 0.5, 0.5]);
    let structure = crystal(CUBIC_10, &fractional);

    assert!(is_trajectory_like(&structure));
    assert!(find_image_atoms(&structure, &ImageAtomOptions::default()).is_empty());

    // exactly 10 % outside is still a crystal
    let mut fractional = vec![[0.0, 0.5, 0.5]; 9];
    fractional.push([1.5, 0.5, 0.5]);
    assert!(!is_trajectory_like(&crystal(CUBIC_10, &fractional)));
}
