//! Levenberg–Marquardt fit of the erf sigmoid to one series.
//!
//! Given samples `(x_i, y_i)` inside the fit domain we minimise
//!
//! ```text
//! Σ (y_i - sigmoid(x_i; shift, width))²
//! ```
//!
//! starting from the configured calibration guess. Each iteration solves the
//! damped normal equations in their least-squares form
//!
//! ```text
//! [ J        ]       [ r ]
//! [ √λ · D   ] δ  ≈  [ 0 ]
//! ```
//!
//! where `D = diag(‖J_col‖)`. A step is accepted only when it lowers the cost
//! and keeps `width > 0`; otherwise the damping grows.
//!
//! The fitter is quiet: it never logs and never returns an `AppError`. Callers
//! get a `FitFailure` describing why no usable parameters came out.

use nalgebra::{DMatrix, DVector};

use crate::domain::{FitResult, FitterConfig, Series};
use crate::math::solve_least_squares;
use crate::models::{fill_jacobian_row, sigmoid};

const MIN_POINTS: usize = 3;
const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MAX: f64 = 1e10;
const REL_COST_TOL: f64 = 1e-10;
const STEP_TOL: f64 = 1e-9;
const GRAD_TOL: f64 = 1e-12;

/// Why a series produced no usable fit.
#[derive(Debug, Clone, PartialEq)]
pub enum FitFailure {
    /// Fewer than three finite samples inside the fit domain.
    TooFewPoints(usize),
    /// Parameters or cost became non-finite.
    NonFinite,
    /// Iteration limit reached before the cost settled.
    NotConverged { iterations: usize },
    /// The fitted midpoint lies outside the fit domain.
    OutOfDomain { shift: f64 },
    /// The converged curve does not describe the data.
    PoorQuality { rmse: f64 },
}

impl std::fmt::Display for FitFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitFailure::TooFewPoints(n) => write!(f, "only {n} usable points in fit range"),
            FitFailure::NonFinite => write!(f, "fit produced non-finite parameters"),
            FitFailure::NotConverged { iterations } => {
                write!(f, "no convergence after {iterations} iterations")
            }
            FitFailure::OutOfDomain { shift } => {
                write!(f, "fitted shift {shift:.2} outside fit range")
            }
            FitFailure::PoorQuality { rmse } => write!(f, "poor fit (rmse {rmse:.3})"),
        }
    }
}

/// Fits `(shift, width)` of the erf sigmoid.
#[derive(Debug, Clone)]
pub struct SigmoidFitter {
    config: FitterConfig,
}

impl Default for SigmoidFitter {
    fn default() -> Self {
        Self::new(FitterConfig::default())
    }
}

impl SigmoidFitter {
    pub fn new(config: FitterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FitterConfig {
        &self.config
    }

    /// Fit a series, folding every failure into `FitResult { success: false, .. }`.
    pub fn fit(&self, series: &Series) -> FitResult {
        self.try_fit(series).unwrap_or_else(|_| FitResult::failed())
    }

    /// Fit a series, reporting why it failed if it did.
    pub fn try_fit(&self, series: &Series) -> Result<FitResult, FitFailure> {
        let (lo, hi) = self.config.domain;
        let (xs, ys): (Vec<f64>, Vec<f64>) = series
            .points
            .iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite() && *x >= lo && *x <= hi)
            .copied()
            .unzip();

        let n = xs.len();
        if n < MIN_POINTS {
            return Err(FitFailure::TooFewPoints(n));
        }

        let mut params = [self.config.initial_shift, self.config.initial_width];
        let mut cost = sum_sq(&xs, &ys, params);
        if !cost.is_finite() {
            return Err(FitFailure::NonFinite);
        }

        let mut lambda = LAMBDA_INIT;
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.config.max_iterations {
            iterations += 1;

            let (jac, resid) = linearise(&xs, &ys, params);
            let grad = jac.tr_mul(&resid);
            if grad.amax() < GRAD_TOL {
                converged = true;
                break;
            }

            let Some(step) = damped_step(&jac, &resid, lambda) else {
                lambda *= 10.0;
                if lambda > LAMBDA_MAX {
                    converged = true;
                    break;
                }
                continue;
            };

            let candidate = [params[0] + step[0], params[1] + step[1]];
            let new_cost = if candidate[1] > 0.0 && candidate.iter().all(|v| v.is_finite()) {
                sum_sq(&xs, &ys, candidate)
            } else {
                f64::INFINITY
            };

            if new_cost.is_finite() && new_cost < cost {
                let rel = (cost - new_cost) / cost.max(f64::MIN_POSITIVE);
                let small_step = step[0].abs() <= STEP_TOL * (params[0].abs() + STEP_TOL)
                    && step[1].abs() <= STEP_TOL * (params[1].abs() + STEP_TOL);
                params = candidate;
                cost = new_cost;
                lambda = (lambda / 10.0).max(1e-12);
                if rel < REL_COST_TOL || small_step {
                    converged = true;
                    break;
                }
            } else {
                // No further reduction possible at this damping: stationary point.
                lambda *= 10.0;
                if lambda > LAMBDA_MAX {
                    converged = true;
                    break;
                }
            }
        }

        if !converged {
            return Err(FitFailure::NotConverged { iterations });
        }
        let [shift, width] = params;
        if !(shift.is_finite() && width.is_finite() && width > 0.0) {
            return Err(FitFailure::NonFinite);
        }
        if shift < lo || shift > hi {
            return Err(FitFailure::OutOfDomain { shift });
        }
        let rmse = (cost / n as f64).sqrt();
        if rmse > self.config.max_rmse {
            return Err(FitFailure::PoorQuality { rmse });
        }

        Ok(FitResult {
            success: true,
            shift,
            width,
            rmse,
            iterations,
        })
    }
}

fn sum_sq(xs: &[f64], ys: &[f64], [shift, width]: [f64; 2]) -> f64 {
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| {
            let r = y - sigmoid(x, shift, width);
            r * r
        })
        .sum()
}

fn linearise(xs: &[f64], ys: &[f64], [shift, width]: [f64; 2]) -> (DMatrix<f64>, DVector<f64>) {
    let n = xs.len();
    let mut jac = DMatrix::<f64>::zeros(n, 2);
    let mut resid = DVector::<f64>::zeros(n);
    let mut row = [0.0; 2];
    for i in 0..n {
        fill_jacobian_row(xs[i], shift, width, &mut row);
        jac[(i, 0)] = row[0];
        jac[(i, 1)] = row[1];
        resid[i] = ys[i] - sigmoid(xs[i], shift, width);
    }
    (jac, resid)
}

fn damped_step(jac: &DMatrix<f64>, resid: &DVector<f64>, lambda: f64) -> Option<DVector<f64>> {
    let n = jac.nrows();
    let mut a = DMatrix::<f64>::zeros(n + 2, 2);
    a.rows_mut(0, n).copy_from(jac);
    for j in 0..2 {
        a[(n + j, j)] = (lambda * jac.column(j).norm_squared()).sqrt();
    }
    let mut b = DVector::<f64>::zeros(n + 2);
    b.rows_mut(0, n).copy_from(resid);

    solve_least_squares(&a, &b)
}
