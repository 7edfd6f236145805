/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;
use structviz::cli::{run, Cli};
use tempfile::TempDir;

const POSCAR: &str = "NaCl
1.0
5.64 0.0 0.0
0.0 5.64 0.0
0.0 0.0 5.64
Na Cl
1 1
Direct
0.0 0.0 0.0
0.5 0.5 0.5
";

const WATER: &str = "3
water
O 0.0 0.0 0.0
H 0.96 0.0 0.0
H -0.24 0.93 0.0
";

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run_args(args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::parse_from(std::iter::once("structviz").chain(args.iter().copied()));
    run(&cli)
}

#[test]
fn test_parse_summary() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "POSCAR", POSCAR);
    let out = run_args(&["parse", path.to_str().unwrap()]).unwrap();
    assert!(out.contains("Formula: Cl Na"));
    assert!(out.contains("Sites: 2"));
    assert!(out.contains("Volume: 179.4061"));
}

#[test]
fn test_parse_json_output() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "water.xyz", WATER);
    let out = run_args(&["parse", "--json", path.to_str().unwrap()]).unwrap();
    let value: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["sites"].as_array().unwrap().len(), 3);
}

#[test]
fn test_bonds_command() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "water.xyz", WATER);
    let out = run_args(&["bonds", path.to_str().unwrap()]).unwrap();
    assert!(out.starts_with("2 bond(s) using nearest_neighbor"));

    let out = run_args(&["bonds", "-a", "max-dist", "--json", path.to_str().unwrap()]).unwrap();
    let bonds: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(bonds.as_array().unwrap().len(), 3);
}

#[test]
fn test_config_file_overrides_options() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "water.xyz", WATER);
    let config = write(&dir, "config.json", r#"{"max_dist": {"max_bond_dist": 1.2}}"#);
    let out = run_args(&[
        "--config",
        config.to_str().unwrap(),
        "bonds",
        "-a",
        "max-dist",
        path.to_str().unwrap(),
    ])
    .unwrap();
    assert!(out.starts_with("2 bond(s) using max_dist"));
}

#[test]
fn test_distance_uses_minimum_image() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "POSCAR",
        "pair\n1.0\n10 0 0\n0 10 0\n0 0 10\nAr\n2\nDirect\n0.05 0 0\n0.95 0 0\n",
    );
    let out = run_args(&["distance", path.to_str().unwrap(), "0", "1"]).unwrap();
    assert_eq!(out.trim(), "1.000000");

    assert!(run_args(&["distance", path.to_str().unwrap(), "0", "2"]).is_err());
}

#[test]
fn test_images_command() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "POSCAR", POSCAR);
    let out = run_args(&["images", path.to_str().unwrap()]).unwrap();
    // Na at the origin has seven images, Cl at the center none
    assert_eq!(out.trim(), "2 original site(s), 7 image atom(s), 9 total");
}

#[test]
fn test_trajectory_report() {
    let dir = TempDir::new().unwrap();
    let content = "\
1
step=0 energy=-1.00
Ar 0.0 0.0 0.0
1
step=5 energy=-1.50
Ar 0.0 0.0 0.1
";
    let path = write(&dir, "md.xyz", content);
    let out = run_args(&["trajectory", "--json", path.to_str().unwrap()]).unwrap();
    let report: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(report["stats"]["frame_count"], 2);
    assert_eq!(report["stats"]["step_range"], serde_json::json!([0.0, 5.0]));
    assert_eq!(report["errors"].as_array().unwrap().len(), 0);
    assert_eq!(report["hide_plot"], false);
    assert_eq!(report["series"][0]["key"], "energy");

    let text = run_args(&["trajectory", path.to_str().unwrap()]).unwrap();
    assert!(text.contains("Frames: 2"));
    assert!(text.contains("Steps: 0 to 5"));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.cif");
    let err = run_args(&["parse", missing.to_str().unwrap()]).unwrap_err();
    assert!(err.to_string().contains("Failed to read"));
}
