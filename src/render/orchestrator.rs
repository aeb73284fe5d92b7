//! Per-group pipeline: extract → fit → aggregate → render.
//!
//! For every group the orchestrator:
//!
//! 1. selects the group's keys (streaming, capped) and loads their series
//! 2. fits all series in parallel; failures are logged and dropped
//! 3. builds a fresh `Ensemble` from the successes, in discovery order
//! 4. renders a "fit" and a "smoothed" view per fitted series
//! 5. renders the raw / fitted-function / measured-points overlays, each in
//!    linear and log Y, unless the ensemble is empty
//!
//! Store lookups and output failures abort the run; per-series and per-group
//! problems never do.

use std::path::PathBuf;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::domain::{Framing, GroupSpec, LeafKey, PipelineConfig, Series};
use crate::ensemble::{Ensemble, ParameterSummary};
use crate::error::AppError;
use crate::fit::SigmoidFitter;
use crate::keys::{KeyPattern, select, walk};
use crate::render::output::OutputLayout;
use crate::render::surface::{DrawStyle, Drawable, RenderSurface};
use crate::store::ScanStore;
use crate::style::{Marker, Palette, use_compact};

const DATA_COLOR: u16 = 1;
const FIT_COLOR: u16 = 2;
const SMOOTH_COLOR: u16 = 4;
const LINEAR_Y: (f64, f64) = (-0.05, 1.15);
const LOG_Y: (f64, f64) = (1e-3, 1.5);
const X_LABEL: &str = "DAC units";
const Y_LABEL: &str = "response";

/// Where the orchestrator is in its per-group cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Extracting,
    Fitting,
    Aggregating,
    RenderingIndividual,
    RenderingAggregate,
}

/// Aggregate overlay kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Raw,
    Fits,
    Points,
}

impl Overlay {
    pub const ALL: [Overlay; 3] = [Overlay::Raw, Overlay::Fits, Overlay::Points];

    pub fn view_name(self) -> &'static str {
        match self {
            Overlay::Raw => "raw",
            Overlay::Fits => "fits",
            Overlay::Points => "points",
        }
    }

    pub fn framing(self) -> Framing {
        match self {
            Overlay::Raw => Framing::Wide,
            Overlay::Fits | Overlay::Points => Framing::Narrow,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Overlay::Raw => "measured curves",
            Overlay::Fits => "fitted sigmoids",
            Overlay::Points => "measured points",
        }
    }
}

/// What happened to one group.
#[derive(Debug, Clone)]
pub struct GroupReport {
    pub group: GroupSpec,
    /// Keys selected for the group (after the cap).
    pub matched: usize,
    /// Keys that entered the ensemble, in ensemble order.
    pub fitted: Vec<LeafKey>,
    /// Keys whose fit failed, with the reason.
    pub failed: Vec<(LeafKey, String)>,
    /// Every file written (or recorded) for the group.
    pub views: Vec<PathBuf>,
    pub aggregate_rendered: bool,
    pub summary: Option<ParameterSummary>,
}

pub struct RenderOrchestrator<'a, S: ?Sized, R> {
    store: &'a S,
    surface: &'a mut R,
    layout: &'a OutputLayout,
    fitter: SigmoidFitter,
    palette: Palette,
    namespace: String,
    pattern: KeyPattern,
    smooth_window: usize,
    stage: Stage,
}

impl<'a, S, R> RenderOrchestrator<'a, S, R>
where
    S: ScanStore + ?Sized,
    R: RenderSurface,
{
    pub fn new(
        store: &'a S,
        surface: &'a mut R,
        layout: &'a OutputLayout,
        config: &PipelineConfig,
    ) -> Result<Self, AppError> {
        Ok(Self {
            store,
            surface,
            layout,
            fitter: SigmoidFitter::new(config.fitter.clone()),
            palette: Palette::standard(),
            namespace: config.namespace.clone(),
            pattern: KeyPattern::new(&config.pattern)?,
            smooth_window: config.smooth_window,
            stage: Stage::Idle,
        })
    }

    /// Replace the colour tables (e.g. for a surface with other index conventions).
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Process every group in order.
    pub fn run(&mut self, groups: &[GroupSpec]) -> Result<Vec<GroupReport>, AppError> {
        let mut reports = Vec::with_capacity(groups.len());
        for &group in groups {
            reports.push(self.process_group(group)?);
        }
        Ok(reports)
    }

    /// Run the whole per-group cycle for one group.
    pub fn process_group(&mut self, group: GroupSpec) -> Result<GroupReport, AppError> {
        info!("group {}: start (cap {})", group.id, cap_label(group.cap));
        let result = self.process_group_inner(group);
        self.enter(group, Stage::Idle);
        let report = result?;
        info!(
            "group {}: {} selected, {} fitted, {} failed, {} views",
            group.id,
            report.matched,
            report.fitted.len(),
            report.failed.len(),
            report.views.len()
        );
        Ok(report)
    }

    fn process_group_inner(&mut self, group: GroupSpec) -> Result<GroupReport, AppError> {
        self.enter(group, Stage::Extracting);
        let keys = select(self.store, &self.namespace, &self.pattern, group.id, group.cap)?
            .collect::<Result<Vec<LeafKey>, AppError>>()?;
        let mut loaded: Vec<(LeafKey, Series)> = Vec::with_capacity(keys.len());
        for key in keys {
            let series = self.store.series(&key)?;
            loaded.push((key, series));
        }

        self.enter(group, Stage::Fitting);
        let fitter = &self.fitter;
        let fits: Vec<_> = loaded.par_iter().map(|(_, s)| fitter.try_fit(s)).collect();

        self.enter(group, Stage::Aggregating);
        let matched = loaded.len();
        let mut ensemble = Ensemble::new();
        let mut failed = Vec::new();
        for ((key, series), fit) in loaded.into_iter().zip(fits) {
            match fit {
                Ok(fit) => {
                    ensemble.add(key, series, fit);
                }
                Err(reason) => {
                    warn!("fit failed for '{key}': {reason}");
                    failed.push((key, reason.to_string()));
                }
            }
        }

        self.enter(group, Stage::RenderingIndividual);
        let mut views = Vec::new();
        for entry in ensemble.entries() {
            views.push(self.render_fit_view(&entry.key, &entry.series, entry.shift(), entry.width())?);
            views.push(self.render_smooth_view(&entry.key, &entry.series, entry.shift(), entry.width())?);
        }

        let aggregate_rendered = if ensemble.is_empty() {
            warn!(
                "group {}: no successful fits, skipping aggregate views",
                group.id
            );
            false
        } else {
            self.enter(group, Stage::RenderingAggregate);
            let compact = use_compact(group.cap);
            for overlay in Overlay::ALL {
                for log_y in [false, true] {
                    views.push(self.render_overlay(&group, &ensemble, overlay, log_y, compact)?);
                }
            }
            true
        };

        Ok(GroupReport {
            group,
            matched,
            fitted: ensemble.entries().iter().map(|e| e.key.clone()).collect(),
            failed,
            views,
            aggregate_rendered,
            summary: ensemble.summary(),
        })
    }

    /// Render every leaf under `subdir` (or the whole store) as its own view.
    pub fn dump_all(&mut self, subdir: Option<&str>) -> Result<Vec<PathBuf>, AppError> {
        let mut out = Vec::new();
        for key in walk(self.store, subdir)? {
            let key = key?;
            let series = self.store.series(&key)?;
            self.surface.clear();
            self.surface.set_title(&key);
            self.surface.draw(Drawable::Curve(series), DrawStyle::line(DATA_COLOR));
            out.push(self.save(&key)?);
        }
        Ok(out)
    }

    fn render_fit_view(
        &mut self,
        key: &str,
        series: &Series,
        shift: f64,
        width: f64,
    ) -> Result<PathBuf, AppError> {
        let range = single_bounds(shift, width);
        self.surface.clear();
        self.surface.set_title(&format!("{key}: shift {shift:.2}, width {width:.2}"));
        self.surface.set_axis_labels(X_LABEL, Y_LABEL);
        self.surface.set_x_range(range.0, range.1);
        self.surface.set_y_range(LINEAR_Y.0, LINEAR_Y.1);
        self.surface.draw(
            Drawable::Points(series.clone()),
            DrawStyle::markers(DATA_COLOR, Marker::FullCircle),
        );
        self.surface
            .draw(Drawable::Function { shift, width, range }, DrawStyle::line(FIT_COLOR));
        self.save(&format!("{key}_fit"))
    }

    fn render_smooth_view(
        &mut self,
        key: &str,
        series: &Series,
        shift: f64,
        width: f64,
    ) -> Result<PathBuf, AppError> {
        let range = single_bounds(shift, width);
        self.surface.clear();
        self.surface.set_title(&format!("{key}: smoothed"));
        self.surface.set_axis_labels(X_LABEL, Y_LABEL);
        self.surface.set_x_range(range.0, range.1);
        self.surface.set_y_range(LINEAR_Y.0, LINEAR_Y.1);
        self.surface.draw(
            Drawable::Curve(series.smoothed(self.smooth_window)),
            DrawStyle::line(SMOOTH_COLOR),
        );
        self.save(&format!("{key}_smooth"))
    }

    fn render_overlay(
        &mut self,
        group: &GroupSpec,
        ensemble: &Ensemble,
        overlay: Overlay,
        log_y: bool,
        compact: bool,
    ) -> Result<PathBuf, AppError> {
        let (lo, hi) = ensemble.bounds(overlay.framing());
        self.surface.clear();
        self.surface.set_title(&format!("{}: {}", group.label(), overlay.title()));
        self.surface.set_axis_labels(X_LABEL, Y_LABEL);
        self.surface.set_x_range(lo, hi);
        self.surface.set_log_y(log_y);
        let y = if log_y { LOG_Y } else { LINEAR_Y };
        self.surface.set_y_range(y.0, y.1);

        for (i, entry) in ensemble.entries().iter().enumerate() {
            let id = self.palette.identity(i, compact);
            let (item, style) = match overlay {
                Overlay::Raw => (Drawable::Curve(entry.series.clone()), DrawStyle::line(id.color)),
                Overlay::Fits => (
                    Drawable::Function {
                        shift: entry.shift(),
                        width: entry.width(),
                        range: (lo, hi),
                    },
                    DrawStyle::line(id.color),
                ),
                Overlay::Points => (
                    Drawable::Points(entry.series.clone()),
                    DrawStyle::markers(id.color, id.marker),
                ),
            };
            self.surface.draw(item, style);
        }

        if log_y {
            if let Err(e) = self.surface.adjust_log_range() {
                warn!("{} {}: log range not adjusted: {e}", group.label(), overlay.view_name());
            }
        }

        let suffix = if log_y { "_log" } else { "" };
        self.save(&format!("{}/{}{suffix}", group.label(), overlay.view_name()))
    }

    fn save(&mut self, name: &str) -> Result<PathBuf, AppError> {
        let path = self.layout.path_for(name)?;
        self.surface.save_as(&path)?;
        debug!("saved {}", path.display());
        Ok(path)
    }

    fn enter(&mut self, group: GroupSpec, stage: Stage) {
        debug!("group {}: {:?} -> {:?}", group.id, self.stage, stage);
        self.stage = stage;
    }
}

/// Wide framing around a single fitted transition.
fn single_bounds(shift: f64, width: f64) -> (f64, f64) {
    let k = Framing::Wide.multiplier();
    (shift - k * width, shift + k * width)
}

fn cap_label(cap: usize) -> String {
    if cap == 0 {
        "unbounded".to_string()
    } else {
        cap.to_string()
    }
}
