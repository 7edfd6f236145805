/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Command line interface
//!
//! Argument definitions and command execution for the `structviz` binary.
//! Commands return their report as a string so the binary only prints.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::atoms::{ElementTable, Structure};
use crate::bonding::{BondingAlgorithm, MaxDistOptions, NearestNeighborOptions, VdwOptions};
use crate::geometry::{find_image_atoms, get_pbc_image_sites, pbc_dist, ImageAtomOptions};
use crate::input::{is_trajectory_file, ParserConfig, StructureParser};
use crate::trajectory::{
    full_data_extractor, generate_plot_series, get_trajectory_stats, parse_trajectory_data,
    should_hide_plot, validate_trajectory, PlotSeriesOptions, DEFAULT_HIDE_TOLERANCE,
};
use crate::utils::euclidean_dist;

#[derive(Parser, Debug)]
#[command(name = "structviz")]
#[command(about = "Inspect crystal structures, molecules and trajectories")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON file with parser, bonding, image and plot options
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a structure file and print a summary
    Parse {
        file: PathBuf,
        /// Print the structure as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the bonds found in a structure
    Bonds {
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Algorithm::NearestNeighbor)]
        algorithm: Algorithm,
        #[arg(long)]
        json: bool,
    },
    /// Add periodic image atoms at cell boundaries
    Images {
        file: PathBuf,
        /// Fractional distance from a cell face that counts as on the boundary
        #[arg(short, long)]
        tolerance: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Minimum-image distance between two sites
    Distance {
        file: PathBuf,
        /// 0-based index of the first site
        i: usize,
        /// 0-based index of the second site
        j: usize,
    },
    /// Validate a trajectory and summarize its plottable properties
    Trajectory {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    MaxDist,
    NearestNeighbor,
    Vdw,
}

/// Options loaded from `--config`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub parser: ParserConfig,
    pub max_dist: MaxDistOptions,
    pub nearest_neighbor: NearestNeighborOptions,
    pub vdw: VdwOptions,
    pub images: ImageAtomOptions,
    pub plot: PlotSeriesOptions,
}

impl CliConfig {
    /// Read a JSON configuration file; missing sections keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn bonding(&self, algorithm: Algorithm) -> BondingAlgorithm {
        match algorithm {
            Algorithm::MaxDist => BondingAlgorithm::MaxDist(self.max_dist),
            Algorithm::NearestNeighbor => BondingAlgorithm::NearestNeighbor(self.nearest_neighbor),
            Algorithm::Vdw => BondingAlgorithm::VdwRadius(self.vdw),
        }
    }
}

fn read_input(path: &Path) -> Result<(String, String)> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((String::from_utf8_lossy(&bytes).into_owned(), name))
}

fn load_structure(path: &Path, config: &CliConfig) -> Result<Structure> {
    let (content, name) = read_input(path)?;
    if is_trajectory_file(&name) {
        log::info!("{} looks like trajectory data; the `trajectory` command reads all frames", name);
    }
    StructureParser::new(config.parser.clone())
        .parse(&content, Some(&name))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Execute a parsed command line, returning the text to print
pub fn run(cli: &Cli) -> Result<String> {
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };

    match &cli.command {
        Commands::Parse { file, json } => {
            let structure = load_structure(file, &config)?;
            if *json {
                Ok(serde_json::to_string_pretty(&structure)?)
            } else {
                Ok(structure_summary(&structure))
            }
        }
        Commands::Bonds { file, algorithm, json } => {
            let structure = load_structure(file, &config)?;
            let strategy = config.bonding(*algorithm);
            let bonds = strategy.bonds(&structure);
            log::info!("{} found {} bond(s)", strategy.name(), bonds.len());
            if *json {
                return Ok(serde_json::to_string_pretty(&bonds)?);
            }
            let mut out = format!("{} bond(s) using {}\n", bonds.len(), strategy.name());
            for bond in &bonds {
                let from = structure.sites[bond.from_index].element().unwrap_or("?");
                let to = structure.sites[bond.to_index].element().unwrap_or("?");
                writeln!(
                    out,
                    "{:>5} {:<3} - {:>5} {:<3} {:.4}",
                    bond.from_index, from, bond.to_index, to, bond.distance
                )?;
            }
            Ok(out)
        }
        Commands::Images { file, tolerance, json } => {
            let structure = load_structure(file, &config)?;
            let mut options = config.images;
            if let Some(tolerance) = tolerance {
                options.tolerance = *tolerance;
            }
            let images = find_image_atoms(&structure, &options);
            let with_images = get_pbc_image_sites(&structure, &options);
            if *json {
                return Ok(serde_json::to_string_pretty(&with_images)?);
            }
            Ok(format!(
                "{} original site(s), {} image atom(s), {} total\n",
                structure.sites.len(),
                images.len(),
                with_images.sites.len()
            ))
        }
        Commands::Distance { file, i, j } => {
            let structure = load_structure(file, &config)?;
            let n = structure.sites.len();
            if *i >= n || *j >= n {
                bail!("Site index out of range: structure has {} site(s)", n);
            }
            let (a, b) = (&structure.sites[*i].xyz, &structure.sites[*j].xyz);
            let distance = match &structure.lattice {
                Some(lattice) => pbc_dist(a, b, lattice.matrix(), None)?,
                None => euclidean_dist(a, b),
            };
            Ok(format!("{:.6}\n", distance))
        }
        Commands::Trajectory { file, json } => {
            let (content, name) = read_input(file)?;
            let trajectory = parse_trajectory_data(&content, Some(&name))
                .with_context(|| format!("Failed to read trajectory {}", file.display()))?;
            let errors = validate_trajectory(&trajectory);
            let stats = get_trajectory_stats(&trajectory);
            let series = generate_plot_series(&trajectory, &full_data_extractor, &config.plot);
            let hide = should_hide_plot(&trajectory, &series, DEFAULT_HIDE_TOLERANCE);

            if *json {
                let report = json!({
                    "metadata": trajectory.metadata,
                    "errors": errors,
                    "stats": stats,
                    "hide_plot": hide,
                    "series": series,
                });
                return Ok(serde_json::to_string_pretty(&report)?);
            }

            let mut out = String::new();
            writeln!(out, "Frames: {}", stats.frame_count)?;
            if let Some((lo, hi)) = stats.step_range {
                writeln!(out, "Steps: {} to {}", lo, hi)?;
            }
            match (stats.total_atoms, stats.atom_count_range) {
                (Some(atoms), _) => writeln!(out, "Atoms per frame: {}", atoms)?,
                (None, Some((lo, hi))) => writeln!(out, "Atoms per frame: {} to {}", lo, hi)?,
                _ => {}
            }
            for error in &errors {
                writeln!(out, "Invalid: {}", error)?;
            }
            if hide {
                writeln!(out, "No varying properties to plot")?;
            }
            for s in &series {
                writeln!(
                    out,
                    "{:<24} {:?} {} {} point(s)",
                    s.key,
                    s.y_axis,
                    if s.visible { "shown " } else { "hidden" },
                    s.y.len()
                )?;
            }
            Ok(out)
        }
    }
}

/// Human-readable overview of a structure
pub fn structure_summary(structure: &Structure) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Formula: {}", structure.formula());
    let _ = writeln!(out, "Sites: {}", structure.sites.len());
    match &structure.lattice {
        Some(lattice) => {
            let _ = writeln!(
                out,
                "Lattice: a={:.4} b={:.4} c={:.4} alpha={:.2} beta={:.2} gamma={:.2}",
                lattice.a(),
                lattice.b(),
                lattice.c(),
                lattice.alpha(),
                lattice.beta(),
                lattice.gamma()
            );
            let _ = writeln!(out, "Volume: {:.4}", lattice.volume());
            if let Some(density) = structure.density(ElementTable::global()) {
                let _ = writeln!(out, "Density: {:.4} g/cm^3", density);
            }
        }
        None => {
            let _ = writeln!(out, "Lattice: none (molecule)");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_arguments() {
        let cli = Cli::parse_from(["structviz", "-v", "bonds", "POSCAR", "--algorithm", "max-dist"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Bonds { algorithm, json, .. } => {
                assert_eq!(algorithm, Algorithm::MaxDist);
                assert!(!json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_config_sections_default() {
        let config: CliConfig = serde_json::from_str(r#"{"max_dist": {"max_bond_dist": 2.0}}"#).unwrap();
        assert_eq!(config.max_dist.max_bond_dist, 2.0);
        assert_eq!(config.max_dist.min_bond_dist, MaxDistOptions::default().min_bond_dist);
        assert_eq!(config.nearest_neighbor, NearestNeighborOptions::default());
        assert_eq!(config.bonding(Algorithm::Vdw).name(), "vdw");
    }
}
