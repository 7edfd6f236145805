/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Trajectories
//!
//! The frame model with validation and statistics, readers for multi-frame
//! formats, per-frame property extraction and plot-series generation.

pub mod errors;
pub mod extract;
pub mod labels;
pub mod model;
pub mod parse;
pub mod plotting;
pub mod validation;

pub use errors::{Result, TrajectoryError};
pub use extract::{
    energy_data_extractor, force_stress_data_extractor, full_data_extractor, property_varies,
    structural_data_extractor, DataExtractor, ForceSummary, PropertyMap, StressSummary,
};
pub use labels::{label_with_unit, property_label, property_unit};
pub use model::{get_trajectory_stats, Trajectory, TrajectoryFrame, TrajectoryStats};
pub use parse::{
    is_pymatgen_trajectory, is_vasp_xdatcar, is_xyz_trajectory, parse_pymatgen_trajectory,
    parse_trajectory_data, parse_vasp_xdatcar, parse_xyz_trajectory,
};
pub use plotting::{
    generate_plot_series, should_hide_plot, DataSeries, MarkerStyle, PlotSeriesOptions, YAxis,
    DEFAULT_HIDE_TOLERANCE,
};
pub use validation::validate_trajectory;
