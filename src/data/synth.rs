//! Synthetic threshold-scan datasets.
//!
//! Each channel is a sampled sigmoid `0.5 + 0.5 erf((x - shift)/width)` with
//! Gaussian noise on top. A fraction of channels is "dead": uniform noise in
//! `[0, 1)` that no sigmoid describes, so the fitter rejects it.
//!
//! Layout:
//!
//! - `{namespace}/C{g}/SCurve_c{col}r{row}` for every group and channel
//! - `{namespace}/Summary/shift_C{g}`: the true shift per channel index, which
//!   the per-group pattern never matches

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DEFAULT_NAMESPACE, Series};
use crate::error::AppError;
use crate::models::sigmoid;
use crate::store::TreeStore;

/// Smallest width a generated channel can have.
const MIN_WIDTH: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub namespace: String,
    pub groups: u32,
    pub columns: usize,
    pub rows: usize,
    pub seed: u64,
    pub noise_sigma: f64,
    /// Probability that a channel is dead.
    pub dead_fraction: f64,
    pub shift_mean: f64,
    pub shift_sigma: f64,
    pub width_mean: f64,
    pub width_sigma: f64,
    /// Scan range; one sample per integer step.
    pub domain: (f64, f64),
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            groups: 8,
            columns: 4,
            rows: 4,
            seed: 42,
            noise_sigma: 0.02,
            dead_fraction: 0.1,
            shift_mean: 130.0,
            shift_sigma: 12.0,
            width_mean: 8.0,
            width_sigma: 1.5,
            domain: (0.0, 254.0),
        }
    }
}

impl SynthConfig {
    pub fn channels_per_group(&self) -> usize {
        self.columns * self.rows
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.groups == 0 || self.channels_per_group() == 0 {
            return Err(AppError::new(
                AppError::USAGE,
                "Synthetic dataset needs at least one group and one channel.",
            ));
        }
        if self.namespace.is_empty() || self.namespace.contains('/') {
            return Err(AppError::new(
                AppError::USAGE,
                format!("Invalid namespace '{}'.", self.namespace),
            ));
        }
        if !(0.0..=1.0).contains(&self.dead_fraction) {
            return Err(AppError::new(AppError::USAGE, "Dead fraction must be in [0, 1]."));
        }
        let (lo, hi) = self.domain;
        if !(lo.is_finite() && hi.is_finite() && hi > lo) {
            return Err(AppError::new(AppError::USAGE, "Invalid scan domain."));
        }
        if !(self.width_mean.is_finite() && self.width_mean > 0.0) {
            return Err(AppError::new(AppError::USAGE, "Width mean must be > 0."));
        }
        Ok(())
    }
}

/// Build a synthetic dataset. The same config always yields the same store.
pub fn generate_store(config: &SynthConfig) -> Result<TreeStore, AppError> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = normal(0.0, config.noise_sigma)?;
    let shift_dist = normal(config.shift_mean, config.shift_sigma)?;
    let width_dist = normal(config.width_mean, config.width_sigma)?;

    let (lo, hi) = config.domain;
    let xs: Vec<f64> = (0..=((hi - lo).floor() as usize)).map(|i| lo + i as f64).collect();

    let mut store = TreeStore::new();
    let mut truths = Vec::with_capacity(config.groups as usize);
    for g in 0..config.groups {
        let mut shifts = Vec::with_capacity(config.channels_per_group());
        for col in 0..config.columns {
            for row in 0..config.rows {
                let key = format!("{}/C{g}/SCurve_c{col}r{row}", config.namespace);
                let series = if rng.gen_bool(config.dead_fraction) {
                    Series::new(xs.iter().map(|&x| (x, rng.gen_range(0.0..1.0))).collect())
                } else {
                    let shift = shift_dist.sample(&mut rng).clamp(lo, hi);
                    let width = width_dist.sample(&mut rng).abs().max(MIN_WIDTH);
                    shifts.push(((col * config.rows + row) as f64, shift));
                    Series::new(
                        xs.iter()
                            .map(|&x| (x, sigmoid(x, shift, width) + noise.sample(&mut rng)))
                            .collect(),
                    )
                };
                store.insert(&key, series)?;
            }
        }
        truths.push(Series::new(shifts));
    }

    for (g, truth) in truths.into_iter().enumerate() {
        store.insert(&format!("{}/Summary/shift_C{g}", config.namespace), truth)?;
    }
    Ok(store)
}

fn normal(mean: f64, sigma: f64) -> Result<Normal<f64>, AppError> {
    Normal::new(mean, sigma)
        .map_err(|e| AppError::new(AppError::USAGE, format!("Invalid noise settings: {e}")))
}
