/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use approx::assert_relative_eq;
use rstest::rstest;
use structviz::atoms::coordinates::frac_to_cart;
use structviz::input::{
    detect_format, parse_cif, parse_json_structure, parse_poscar, parse_structure_file, parse_xyz,
    InputError, ParserConfig, StructureFormat, StructureParser,
};

const TRICLINIC_POSCAR: &str = "triclinic test
1.0
5.0 0.0 0.0
2.5 4.33 0.0
1.0 1.0 4.0
C N
1 1
Direct
0.1 0.2 0.3
0.6 0.7 0.8
";

const TRICLINIC_XYZ: &str = "2
Lattice=\"5.0 0.0 0.0 2.5 4.33 0.0 1.0 1.0 4.0\" pbc=\"T T T\"
C 1.3 1.166 1.2
N 5.55 3.831 3.2
";

#[test]
fn test_poscar_end_to_end() {
    let structure =
        parse_poscar("Test\n1.0\n3.0 0.0 0.0\n0.0 3.0 0.0\n0.0 0.0 3.0\nH\n1\nDirect\n0.0 0.0 0.0").unwrap();
    assert_eq!(structure.sites.len(), 1);
    assert_eq!(structure.sites[0].element(), Some("H"));
    assert_relative_eq!(structure.lattice.as_ref().unwrap().volume(), 27.0, epsilon = 1e-10);
    assert_eq!(structure.sites[0].abc, [0.0, 0.0, 0.0]);
}

#[test]
fn test_poscar_negative_scale_is_volume() {
    let structure =
        parse_poscar("Test\n-27.0\n1.0 0.0 0.0\n0.0 1.0 0.0\n0.0 0.0 1.0\nH\n1\nDirect\n0.5 0.5 0.5").unwrap();
    let lattice = structure.lattice.as_ref().unwrap();
    assert_relative_eq!(lattice.volume(), 27.0, epsilon = 1e-10);
    assert_relative_eq!(structure.sites[0].xyz[0], 1.5, epsilon = 1e-10);
}

#[test]
fn test_xyz_end_to_end() {
    let structure = parse_xyz(
        "2\nLattice=\"5.0 0.0 0.0 2.5 4.33 0.0 1.0 1.0 4.0\"\nC 1.0 1.0 1.0\nN 3.5 2.5 2.0",
    )
    .unwrap();
    assert_eq!(structure.sites.len(), 2);
    let matrix = *structure.lattice.as_ref().unwrap().matrix();
    for (site, original) in structure.sites.iter().zip([[1.0, 1.0, 1.0], [3.5, 2.5, 2.0]]) {
        let back = frac_to_cart(&site.abc, &matrix);
        for k in 0..3 {
            assert_relative_eq!(back[k], original[k], epsilon = 1e-12);
        }
    }
}

#[test]
fn test_poscar_and_xyz_agree_on_triclinic_cell() {
    let from_poscar = parse_poscar(TRICLINIC_POSCAR).unwrap();
    let from_xyz = parse_xyz(TRICLINIC_XYZ).unwrap();

    assert_eq!(from_poscar.sites.len(), from_xyz.sites.len());
    for (p, x) in from_poscar.sites.iter().zip(&from_xyz.sites) {
        assert_eq!(p.element(), x.element());
        for k in 0..3 {
            assert_relative_eq!(p.abc[k], x.abc[k], epsilon = 1e-10);
            assert_relative_eq!(p.xyz[k], x.xyz[k], epsilon = 1e-10);
        }
    }
    let (lp, lx) = (from_poscar.lattice.unwrap(), from_xyz.lattice.unwrap());
    assert_relative_eq!(lp.volume(), lx.volume(), epsilon = 1e-10);
}

#[test]
fn test_poscar_errors() {
    assert!(parse_poscar("too\nshort").is_err());
    let missing_atoms = "Test\n1.0\n3 0 0\n0 3 0\n0 0 3\nH\n2\nDirect\n0 0 0\n";
    assert!(matches!(
        parse_poscar(missing_atoms),
        Err(InputError::AtomCountMismatch { expected: 2, found: 1 })
    ));
}

#[test]
fn test_xyz_count_mismatch() {
    assert!(matches!(
        parse_xyz("3\ncomment\nH 0 0 0\nH 1 0 0\n"),
        Err(InputError::AtomCountMismatch { expected: 3, found: 2 })
    ));
}

#[test]
fn test_cif_with_symmetry() {
    let cif = "data_NaCl
_cell_length_a 5.64
_cell_length_b 5.64
_cell_length_c 5.64
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 90
loop_
_symmetry_equiv_pos_as_xyz
'x, y, z'
'x+1/2, y+1/2, z'
'x+1/2, y, z+1/2'
'x, y+1/2, z+1/2'
loop_
_atom_site_label
_atom_site_type_symbol
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Na1 Na 0.0 0.0 0.0
Cl1 Cl 0.5 0.5 0.5
";
    let structure = parse_cif(cif).unwrap();
    assert_eq!(structure.sites.len(), 8);
    assert_eq!(structure.formula(), "Cl4 Na4");

    let plain = StructureParser::new(ParserConfig {
        apply_cif_symmetry: false,
        ..ParserConfig::default()
    })
    .parse(cif, Some("nacl.cif"))
    .unwrap();
    assert_eq!(plain.sites.len(), 2);
}

#[test]
fn test_json_structure() {
    let json = r#"{"structure": {"lattice": {"matrix": [[2, 0, 0], [0, 2, 0], [0, 0, 2]]},
        "sites": [{"species": [{"element": "Cu", "occu": 1}], "abc": [0.5, 0.5, 0.5], "label": "Cu"}]}}"#;
    let structure = parse_json_structure(json).unwrap();
    assert_eq!(structure.sites[0].xyz, [1.0, 1.0, 1.0]);
    assert_relative_eq!(structure.lattice.unwrap().volume(), 8.0);
}

#[rstest]
#[case("POSCAR", StructureFormat::Poscar)]
#[case("CONTCAR_relaxed", StructureFormat::Poscar)]
#[case("mol.xyz", StructureFormat::Xyz)]
#[case("crystal.CIF", StructureFormat::Cif)]
#[case("mp-149.json", StructureFormat::Json)]
fn test_detect_format_from_name(#[case] name: &str, #[case] expected: StructureFormat) {
    assert_eq!(detect_format("", Some(name)).unwrap(), expected);
}

#[test]
fn test_detect_format_from_content() {
    assert_eq!(detect_format(TRICLINIC_POSCAR, None).unwrap(), StructureFormat::Poscar);
    assert_eq!(detect_format(TRICLINIC_XYZ, None).unwrap(), StructureFormat::Xyz);
    assert_eq!(detect_format("{\"sites\": []}", None).unwrap(), StructureFormat::Json);
    assert!(matches!(detect_format("x", None), Err(InputError::UnknownFormat(_))));
}

#[test]
fn test_dispatcher_rejects_unsupported_files() {
    let err = parse_structure_file("ITEM: TIMESTEP\n0\n", Some("run.lammpstrj")).unwrap_err();
    match err {
        InputError::Unsupported(format) => {
            assert_eq!(format.format_name, "LAMMPS Trajectory");
            assert!(!format.conversions.is_empty());
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_dispatcher_rejects_unnamed_binary_content() {
    let blob = "\0\u{1}\u{2}\u{3}HDF\0\0\u{7}";
    match parse_structure_file(blob, None).unwrap_err() {
        InputError::Unsupported(format) => assert_eq!(format.format_name, "Binary File"),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_dispatcher_validates_empty_structures() {
    assert!(parse_structure_file("{\"sites\": []}", Some("empty.json")).is_err());
}
