//! embedkit - compile web assets into embeddable Rust source.

mod cli;
mod config;
mod core;
mod diagnostic;
mod emit;
mod freshness;
mod graph;
mod input;
mod logger;
mod route;
mod transform;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Watch handles Ctrl+C itself, between rebuilds
    core::setup_shutdown_handler(cli.is_watch())?;

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.build_args().verbose);

    match &cli.command {
        Commands::Build { build_args } => cli::build::run_build(&cli.config, build_args),
        Commands::Watch { build_args } => cli::watch::run_watch(&cli.config, build_args),
    }
}
