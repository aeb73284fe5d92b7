//! Error-function sigmoid: `y(x) = 0.5 + 0.5 * erf((x - shift) / width)`.
//!
//! `shift` is the 50% point, `width` controls the steepness of the transition.
//! The fitter needs the value and the Jacobian row; plots need sampled curves.

use std::f64::consts::PI;

use statrs::function::erf::erf;

/// Evaluate the sigmoid at `x`.
pub fn sigmoid(x: f64, shift: f64, width: f64) -> f64 {
    0.5 + 0.5 * erf((x - shift) / width)
}

/// Fill `out` with `[∂y/∂shift, ∂y/∂width]` at `x`.
pub fn fill_jacobian_row(x: f64, shift: f64, width: f64, out: &mut [f64; 2]) {
    let z = (x - shift) / width;
    let g = (-z * z).exp() / (PI.sqrt() * width);
    out[0] = -g;
    out[1] = -z * g;
}

/// Sample the sigmoid on `n` evenly spaced points over `[lo, hi]`.
pub fn sample_curve(shift: f64, width: f64, (lo, hi): (f64, f64), n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let x = lo + (hi - lo) * i as f64 / (n as f64 - 1.0);
            (x, sigmoid(x, shift, width))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_and_tails() {
        assert!((sigmoid(130.0, 130.0, 8.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(0.0, 130.0, 8.0) < 1e-9);
        assert!(sigmoid(254.0, 130.0, 8.0) > 1.0 - 1e-9);
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let (x, s, w) = (125.0, 120.0, 10.0);
        let mut row = [0.0; 2];
        fill_jacobian_row(x, s, w, &mut row);

        let h = 1e-6;
        let ds = (sigmoid(x, s + h, w) - sigmoid(x, s - h, w)) / (2.0 * h);
        let dw = (sigmoid(x, s, w + h) - sigmoid(x, s, w - h)) / (2.0 * h);
        assert!((row[0] - ds).abs() < 1e-7, "{} vs {ds}", row[0]);
        assert!((row[1] - dw).abs() < 1e-7, "{} vs {dw}", row[1]);
    }

    #[test]
    fn sampled_curve_spans_range() {
        let c = sample_curve(100.0, 5.0, (0.0, 254.0), 255);
        assert_eq!(c.len(), 255);
        assert_eq!(c[0].0, 0.0);
        assert_eq!(c[254].0, 254.0);
    }
}
