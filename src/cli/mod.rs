//! Command-line parsing for the S-curve plotter.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline; `app` turns the parsed flags into library configs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_NAMESPACE, DEFAULT_PATTERN, OutputFormat};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "scurves", version, about = "Threshold-scan S-curve fitter and plotter")]
pub struct Cli {
    /// Debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit every group's S-curves and render individual and aggregate views.
    Plots(PlotsArgs),
    /// Render every leaf of the dataset as its own plot.
    Dump(DumpArgs),
    /// Print every leaf key in discovery order.
    Keys(KeysArgs),
    /// Write a synthetic scan dataset.
    Generate(GenerateArgs),
}

/// Where and how views are written.
#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    /// Output root directory.
    #[arg(short, long, env = "SCURVES_OUTPUT", default_value = ".")]
    pub output: PathBuf,

    /// Image format of every view.
    #[arg(long, value_enum, default_value_t = OutputFormat::Svg)]
    pub format: OutputFormat,

    /// View width (pixels).
    #[arg(long, default_value_t = 1024)]
    pub width: u32,

    /// View height (pixels).
    #[arg(long, default_value_t = 768)]
    pub height: u32,

    /// Record views in memory and list them instead of writing files.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args, Clone)]
pub struct PlotsArgs {
    /// Dataset JSON file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Groups to process: ranges and lists with optional per-group caps, e.g. `0-3,5:10`.
    #[arg(short, long, default_value = "0-7")]
    pub groups: String,

    /// Series cap for groups without an explicit one (0 = unbounded).
    #[arg(long, default_value_t = 0)]
    pub cap: usize,

    /// Store folder holding the groups.
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Key prefix template with `{namespace}` and `{group}` placeholders.
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Lower end of the scan range; points below it are ignored by the fit.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub domain_min: f64,

    /// Upper end of the scan range.
    #[arg(long, default_value_t = 254.0, allow_negative_numbers = true)]
    pub domain_max: f64,

    /// Initial shift guess.
    #[arg(long, default_value_t = 120.0, allow_negative_numbers = true)]
    pub init_shift: f64,

    /// Initial width guess.
    #[arg(long, default_value_t = 10.0)]
    pub init_width: f64,

    /// Moving-average window of the smoothed views.
    #[arg(long, default_value_t = 5)]
    pub smooth: usize,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, Args, Clone)]
pub struct DumpArgs {
    /// Dataset JSON file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Only dump leaves under this folder.
    #[arg(long)]
    pub subdir: Option<String>,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, Args, Clone)]
pub struct KeysArgs {
    /// Dataset JSON file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Only list leaves under this folder.
    #[arg(long)]
    pub subdir: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Dataset JSON file to write.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Number of groups (`C0..C{n-1}`).
    #[arg(long, default_value_t = 8)]
    pub groups: u32,

    /// Channel columns per group.
    #[arg(long, default_value_t = 4)]
    pub columns: usize,

    /// Channel rows per group.
    #[arg(long, default_value_t = 4)]
    pub rows: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Gaussian noise sigma added to every sample.
    #[arg(long, default_value_t = 0.02)]
    pub noise: f64,

    /// Fraction of dead (unfittable) channels.
    #[arg(long, default_value_t = 0.1)]
    pub dead_fraction: f64,

    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,
}
