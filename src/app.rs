//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - turns flags into library configs
//! - dispatches to the pipeline and prints results

use chrono::Local;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Command, DumpArgs, GenerateArgs, KeysArgs, PlotsArgs, ViewArgs};
use crate::data::SynthConfig;
use crate::domain::{FitterConfig, PipelineConfig, parse_group_list};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `scurves` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Plots(args) => handle_plots(&args),
        Command::Dump(args) => handle_dump(&args),
        Command::Keys(args) => handle_keys(&args),
        Command::Generate(args) => handle_generate(&args),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(default)
        .parse_env("RUST_LOG")
        .init();
}

fn handle_plots(args: &PlotsArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(args)?;
    let reports = pipeline::run_plots(&config)?;
    println!(
        "{}",
        crate::report::format_run_summary(&reports, &config, Local::now())
    );
    if config.dry_run {
        for path in reports.iter().flat_map(|r| &r.views) {
            println!("would write {}", path.display());
        }
    }
    Ok(())
}

fn handle_dump(args: &DumpArgs) -> Result<(), AppError> {
    let paths = pipeline::run_dump(&args.input, args.subdir.as_deref(), &view_settings(&args.view))?;
    for path in &paths {
        let verb = if args.view.dry_run { "would write" } else { "wrote" };
        println!("{verb} {}", path.display());
    }
    Ok(())
}

fn handle_keys(args: &KeysArgs) -> Result<(), AppError> {
    for key in pipeline::run_keys(&args.input, args.subdir.as_deref())? {
        println!("{key}");
    }
    Ok(())
}

fn handle_generate(args: &GenerateArgs) -> Result<(), AppError> {
    let config = synth_config_from_args(args);
    let leaves = pipeline::run_generate(&args.output, &config)?;
    println!("wrote {leaves} series to {}", args.output.display());
    Ok(())
}

/// Output settings shared by `plots` and `dump`.
pub fn view_settings(view: &ViewArgs) -> pipeline::ViewSettings {
    pipeline::ViewSettings {
        output_dir: view.output.clone(),
        format: view.format,
        size: (view.width, view.height),
        dry_run: view.dry_run,
    }
}

pub fn pipeline_config_from_args(args: &PlotsArgs) -> Result<PipelineConfig, AppError> {
    if !(args.domain_min.is_finite() && args.domain_max.is_finite())
        || args.domain_max <= args.domain_min
    {
        return Err(AppError::new(
            AppError::USAGE,
            format!(
                "Invalid domain [{}, {}]: max must exceed min.",
                args.domain_min, args.domain_max
            ),
        ));
    }
    if !(args.init_width.is_finite() && args.init_width > 0.0) {
        return Err(AppError::new(AppError::USAGE, "Initial width must be > 0."));
    }
    if args.view.width == 0 || args.view.height == 0 {
        return Err(AppError::new(AppError::USAGE, "View size must be non-zero."));
    }

    let mut config = PipelineConfig::with_input(args.input.clone());
    config.namespace = args.namespace.clone();
    config.pattern = args.pattern.clone();
    config.groups = parse_group_list(&args.groups, args.cap)?;
    config.output_dir = args.view.output.clone();
    config.format = args.view.format;
    config.view_size = (args.view.width, args.view.height);
    config.smooth_window = args.smooth;
    config.fitter = FitterConfig {
        domain: (args.domain_min, args.domain_max),
        initial_shift: args.init_shift,
        initial_width: args.init_width,
        ..FitterConfig::default()
    };
    config.dry_run = args.view.dry_run;
    Ok(config)
}

pub fn synth_config_from_args(args: &GenerateArgs) -> SynthConfig {
    SynthConfig {
        namespace: args.namespace.clone(),
        groups: args.groups,
        columns: args.columns,
        rows: args.rows,
        seed: args.seed,
        noise_sigma: args.noise,
        dead_fraction: args.dead_fraction,
        ..SynthConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::domain::{GroupSpec, OutputFormat};

    fn parse(argv: &[&str]) -> Cli {
        Cli::try_parse_from(argv).unwrap()
    }

    fn plots(cli: Cli) -> PlotsArgs {
        match cli.command {
            Command::Plots(args) => args,
            other => panic!("expected plots, got {other:?}"),
        }
    }

    #[test]
    fn plots_defaults() {
        let args = plots(parse(&["scurves", "plots", "scan.json"]));
        let config = pipeline_config_from_args(&args).unwrap();
        assert_eq!(config.groups, (0..8).map(|g| GroupSpec::new(g, 0)).collect::<Vec<_>>());
        assert_eq!(config.namespace, "Final0");
        assert_eq!(config.pattern, "{namespace}/C{group}/");
        assert_eq!(config.format, OutputFormat::Svg);
        assert_eq!(config.view_size, (1024, 768));
        assert_eq!(config.fitter, FitterConfig::default());
        assert!(!config.dry_run);
    }

    #[test]
    fn plots_flags_map_onto_config() {
        let cli = parse(&[
            "scurves", "-v", "plots", "scan.json", "--groups", "0-1,5:3", "--cap", "10",
            "--format", "png", "-o", "out", "--domain-min", "-10", "--init-shift", "90",
            "--dry-run",
        ]);
        assert!(cli.verbose);
        let config = pipeline_config_from_args(&plots(cli)).unwrap();
        assert_eq!(
            config.groups,
            vec![GroupSpec::new(0, 10), GroupSpec::new(1, 10), GroupSpec::new(5, 3)]
        );
        assert_eq!(config.format, OutputFormat::Png);
        assert_eq!(config.output_dir, Path::new("out"));
        assert_eq!(config.fitter.domain, (-10.0, 254.0));
        assert_eq!(config.fitter.initial_shift, 90.0);
        assert!(config.dry_run);
    }

    #[test]
    fn invalid_plots_flags_are_usage_errors() {
        let args = plots(parse(&["scurves", "plots", "x", "--domain-min", "300"]));
        assert_eq!(pipeline_config_from_args(&args).unwrap_err().exit_code(), AppError::USAGE);

        let args = plots(parse(&["scurves", "plots", "x", "--groups", "3-1"]));
        assert_eq!(pipeline_config_from_args(&args).unwrap_err().exit_code(), AppError::USAGE);

        assert!(Cli::try_parse_from(["scurves", "plots", "x", "--format", "pdf"]).is_err());
    }

    #[test]
    fn generate_flags_map_onto_synth_config() {
        let cli = parse(&["scurves", "generate", "scan.json", "--groups", "2", "--seed", "9"]);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let config = synth_config_from_args(&args);
        assert_eq!(config.groups, 2);
        assert_eq!(config.seed, 9);
        assert_eq!(config.namespace, "Final0");
    }
}
