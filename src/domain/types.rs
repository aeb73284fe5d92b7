//! Shared domain types.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Fully qualified, slash-delimited path of one series in the store.
pub type LeafKey = String;

/// One channel's measured response curve as ordered `(x, y)` samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// Build a series from parallel coordinate arrays.
    pub fn from_xy(x: &[f64], y: &[f64]) -> Result<Self, AppError> {
        if x.len() != y.len() {
            return Err(AppError::new(
                AppError::USAGE,
                format!("Series has {} x values but {} y values.", x.len(), y.len()),
            ));
        }
        Ok(Self::new(x.iter().copied().zip(y.iter().copied()).collect()))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.0).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.1).collect()
    }

    /// Centred moving average of `y` over `window` samples (shrinks at the edges).
    ///
    /// A window of 0 or 1 returns an unchanged copy.
    pub fn smoothed(&self, window: usize) -> Series {
        if window <= 1 || self.points.len() < 2 {
            return self.clone();
        }
        let half = window / 2;
        let n = self.points.len();
        let points = (0..n)
            .map(|i| {
                let lo = i.saturating_sub(half);
                let hi = (i + half).min(n - 1);
                let slice = &self.points[lo..=hi];
                let mean = slice.iter().map(|p| p.1).sum::<f64>() / slice.len() as f64;
                (self.points[i].0, mean)
            })
            .collect();
        Series { points }
    }
}

/// Outcome of fitting one series to the sigmoid model.
///
/// `shift` and `width` are only meaningful when `success` is true; failed fits
/// carry NaN parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub success: bool,
    pub shift: f64,
    pub width: f64,
    /// Root-mean-square residual over the points used by the fit.
    pub rmse: f64,
    pub iterations: usize,
}

impl FitResult {
    pub fn failed() -> Self {
        Self {
            success: false,
            shift: f64::NAN,
            width: f64::NAN,
            rmse: f64::NAN,
            iterations: 0,
        }
    }

    /// `(shift, width)` for a successful fit.
    pub fn params(&self) -> Option<(f64, f64)> {
        self.success.then_some((self.shift, self.width))
    }
}

/// A group to process, optionally with its own cap on the number of series.
///
/// A cap of 0 means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpec {
    pub id: u32,
    pub cap: usize,
}

impl GroupSpec {
    pub fn new(id: u32, cap: usize) -> Self {
        Self { id, cap }
    }

    /// Label used for aggregate view names, e.g. `C3`.
    pub fn label(&self) -> String {
        format!("C{}", self.id)
    }
}

/// Parse a group list such as `0-7`, `0,2,5` or `0-3,5:10`.
///
/// Ranges are inclusive. `g:cap` attaches a cap to a single group; groups without
/// an explicit cap get `default_cap`. Order is preserved and duplicates rejected.
pub fn parse_group_list(spec: &str, default_cap: usize) -> Result<Vec<GroupSpec>, AppError> {
    let bad = |msg: String| AppError::new(AppError::USAGE, msg);
    let mut out: Vec<GroupSpec> = Vec::new();

    for token in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let parsed: Vec<GroupSpec> = if let Some((id, cap)) = token.split_once(':') {
            let id = id
                .trim()
                .parse::<u32>()
                .map_err(|_| bad(format!("Invalid group id in '{token}'.")))?;
            let cap = cap
                .trim()
                .parse::<usize>()
                .map_err(|_| bad(format!("Invalid cap in '{token}'.")))?;
            vec![GroupSpec::new(id, cap)]
        } else if let Some((lo, hi)) = token.split_once('-') {
            let lo = lo
                .trim()
                .parse::<u32>()
                .map_err(|_| bad(format!("Invalid group range '{token}'.")))?;
            let hi = hi
                .trim()
                .parse::<u32>()
                .map_err(|_| bad(format!("Invalid group range '{token}'.")))?;
            if hi < lo {
                return Err(bad(format!("Group range '{token}' is reversed.")));
            }
            (lo..=hi).map(|id| GroupSpec::new(id, default_cap)).collect()
        } else {
            let id = token
                .parse::<u32>()
                .map_err(|_| bad(format!("Invalid group id '{token}'.")))?;
            vec![GroupSpec::new(id, default_cap)]
        };

        for group in parsed {
            if out.iter().any(|g| g.id == group.id) {
                return Err(bad(format!("Group {} listed more than once.", group.id)));
            }
            out.push(group);
        }
    }

    if out.is_empty() {
        return Err(bad("Group list is empty.".to_string()));
    }
    Ok(out)
}

/// Multiplier `k` applied to the fitted width when framing the X axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// `k = 2`, used for fitted-function and measured-point overlays.
    Narrow,
    /// `k = 5`, used for raw curve overlays.
    Wide,
}

impl Framing {
    pub fn multiplier(self) -> f64 {
        match self {
            Framing::Narrow => 2.0,
            Framing::Wide => 5.0,
        }
    }
}

/// Image format of the written views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

/// Instrument calibration for the sigmoid fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitterConfig {
    /// Closed fit range in native instrument units.
    pub domain: (f64, f64),
    pub initial_shift: f64,
    pub initial_width: f64,
    pub max_iterations: usize,
    /// Fits whose RMSE exceeds this are treated as not attaching.
    pub max_rmse: f64,
}

impl Default for FitterConfig {
    fn default() -> Self {
        Self {
            domain: (0.0, 254.0),
            initial_shift: 120.0,
            initial_width: 10.0,
            max_iterations: 200,
            max_rmse: 0.25,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    /// Store folder the per-group keys live under.
    pub namespace: String,
    /// Key prefix template; `{namespace}` and `{group}` are substituted.
    pub pattern: String,
    pub groups: Vec<GroupSpec>,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub view_size: (u32, u32),
    pub smooth_window: usize,
    pub fitter: FitterConfig,
    pub dry_run: bool,
}

impl PipelineConfig {
    /// Defaults for everything except the input path.
    pub fn with_input(input: PathBuf) -> Self {
        Self {
            input,
            namespace: DEFAULT_NAMESPACE.to_string(),
            pattern: DEFAULT_PATTERN.to_string(),
            groups: (0..8).map(|id| GroupSpec::new(id, 0)).collect(),
            output_dir: PathBuf::from("."),
            format: OutputFormat::Svg,
            view_size: (1024, 768),
            smooth_window: 5,
            fitter: FitterConfig::default(),
            dry_run: false,
        }
    }
}

pub const DEFAULT_NAMESPACE: &str = "Final0";
pub const DEFAULT_PATTERN: &str = "{namespace}/C{group}/";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_list_parses_ranges_lists_and_caps() {
        let groups = parse_group_list("0-2, 5:10,7", 3).unwrap();
        assert_eq!(
            groups,
            vec![
                GroupSpec::new(0, 3),
                GroupSpec::new(1, 3),
                GroupSpec::new(2, 3),
                GroupSpec::new(5, 10),
                GroupSpec::new(7, 3),
            ]
        );
    }

    #[test]
    fn group_list_rejects_duplicates_and_garbage() {
        assert!(parse_group_list("0-3,2", 0).is_err());
        assert!(parse_group_list("a", 0).is_err());
        assert!(parse_group_list("4-1", 0).is_err());
        assert_eq!(parse_group_list("", 0).unwrap_err().exit_code(), AppError::USAGE);
    }

    #[test]
    fn smoothing_averages_neighbours_and_keeps_x() {
        let s = Series::new(vec![(0.0, 0.0), (1.0, 3.0), (2.0, 0.0), (3.0, 3.0)]);
        let sm = s.smoothed(3);
        assert_eq!(sm.xs(), s.xs());
        assert!((sm.points[1].1 - 1.0).abs() < 1e-12);
        assert!((sm.points[0].1 - 1.5).abs() < 1e-12);
        assert_eq!(s.smoothed(1), s);
    }

    #[test]
    fn from_xy_rejects_length_mismatch() {
        assert!(Series::from_xy(&[1.0, 2.0], &[1.0]).is_err());
        assert_eq!(Series::from_xy(&[1.0], &[2.0]).unwrap().points, vec![(1.0, 2.0)]);
    }
}
