//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::MANIFEST_NAME;

/// Compile web assets into embeddable Rust source
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Manifest path, searched upward from the current directory (default: embedkit.toml)
    #[arg(short = 'C', long, default_value = MANIFEST_NAME, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate the asset and route sources once
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Regenerate whenever an input or the manifest changes
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        build_args: BuildArgs,
    },
}

/// Shared arguments for Build and Watch.
///
/// Each flag overrides the matching `[build]` property of the manifest.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Generated sources directory (relative to the manifest)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Minify html, css and js assets
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Generate the routes module
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub routes: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    pub const fn build_args(&self) -> &BuildArgs {
        match &self.command {
            Commands::Build { build_args } | Commands::Watch { build_args } => build_args,
        }
    }

    pub const fn is_watch(&self) -> bool {
        matches!(self.command, Commands::Watch { .. })
    }
}
