/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Main executable for structviz

use clap::Parser;
use env_logger::Env;

use structviz::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG still wins over the flag
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    log::debug!("structviz v{}", structviz::VERSION);
    let output = run(&cli)?;
    print!("{}", output);
    Ok(())
}
