//! Shared pipeline logic behind the CLI subcommands.
//!
//! Each function opens the dataset, wires a surface and an output layout
//! together, and returns what was produced; printing is left to `app`.

use std::path::{Path, PathBuf};

use log::info;

use crate::data::{SynthConfig, generate_store};
use crate::domain::{LeafKey, OutputFormat, PipelineConfig};
use crate::error::AppError;
use crate::io::{read_dataset, write_dataset};
use crate::keys::walk;
use crate::render::{GroupReport, OutputLayout, PlottersSurface, RecordingSurface, RenderOrchestrator};
use crate::store::TreeStore;

/// Output settings for commands that render views.
#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub size: (u32, u32),
    pub dry_run: bool,
}

/// Run the per-group fit and render pipeline.
pub fn run_plots(config: &PipelineConfig) -> Result<Vec<GroupReport>, AppError> {
    let store = open_store(&config.input)?;

    if config.dry_run {
        let layout = OutputLayout::detached(&config.output_dir, config.format);
        let mut surface = RecordingSurface::new();
        let mut orchestrator = RenderOrchestrator::new(&store, &mut surface, &layout, config)?;
        orchestrator.run(&config.groups)
    } else {
        let layout = OutputLayout::create(&config.output_dir, config.format)?;
        let (w, h) = config.view_size;
        let mut surface = PlottersSurface::new(w, h);
        let mut orchestrator = RenderOrchestrator::new(&store, &mut surface, &layout, config)?;
        orchestrator.run(&config.groups)
    }
}

/// Render every leaf under `subdir` (or the whole dataset) as its own view.
pub fn run_dump(input: &Path, subdir: Option<&str>, view: &ViewSettings) -> Result<Vec<PathBuf>, AppError> {
    let store = open_store(input)?;
    let mut config = PipelineConfig::with_input(input.to_path_buf());
    config.output_dir = view.output_dir.clone();
    config.format = view.format;
    config.view_size = view.size;
    config.dry_run = view.dry_run;

    let paths = if view.dry_run {
        let layout = OutputLayout::detached(&view.output_dir, view.format);
        let mut surface = RecordingSurface::new();
        let mut orchestrator = RenderOrchestrator::new(&store, &mut surface, &layout, &config)?;
        orchestrator.dump_all(subdir)?
    } else {
        let layout = OutputLayout::create(&view.output_dir, view.format)?;
        let mut surface = PlottersSurface::new(view.size.0, view.size.1);
        let mut orchestrator = RenderOrchestrator::new(&store, &mut surface, &layout, &config)?;
        orchestrator.dump_all(subdir)?
    };
    info!("dumped {} views", paths.len());
    Ok(paths)
}

/// Every leaf key under `subdir` (or the whole dataset), in discovery order.
pub fn run_keys(input: &Path, subdir: Option<&str>) -> Result<Vec<LeafKey>, AppError> {
    let store = open_store(input)?;
    walk(&store, subdir)?.collect()
}

/// Generate a synthetic dataset and write it to `output`; returns the leaf count.
pub fn run_generate(output: &Path, config: &SynthConfig) -> Result<usize, AppError> {
    let store = generate_store(config)?;
    write_dataset(output, &store)?;
    info!("generated {} series (seed {})", store.leaf_count(), config.seed);
    Ok(store.leaf_count())
}

fn open_store(input: &Path) -> Result<TreeStore, AppError> {
    let store = read_dataset(input)?;
    info!("loaded {} series from {}", store.leaf_count(), input.display());
    Ok(store)
}
