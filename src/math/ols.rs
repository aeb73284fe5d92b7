//! Linear least squares via SVD.
//!
//! The sigmoid fitter linearises the model at the current parameters and solves
//!
//! ```text
//! minimize ‖A δ - b‖²
//! ```
//!
//! for the step `δ` on every Levenberg–Marquardt iteration. `A` is the Jacobian
//! stacked on top of the damping rows, so it is always tall (n + 2 rows, 2 columns).
//!
//! SVD is used instead of QR because nalgebra's `QR::solve` is meant for square
//! systems, and because a flat curve segment makes the Jacobian nearly singular.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = a.clone().svd(true, true);

    // Progressively looser singular-value cutoffs.
    for &tol in &[1e-12, 1e-9, 1e-6] {
        if let Ok(x) = svd.solve(b, tol) {
            if x.iter().all(|v| v.is_finite()) {
                return Some(x);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_overdetermined_line() {
        // y = 1.5 - 0.5x on x = [0, 1, 2, 3]
        let a = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let b = DVector::from_row_slice(&[1.5, 1.0, 0.5, 0.0]);

        let x = solve_least_squares(&a, &b).unwrap();
        assert!((x[0] - 1.5).abs() < 1e-10);
        assert!((x[1] + 0.5).abs() < 1e-10);
    }

    #[test]
    fn zero_column_gets_zero_component() {
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
        let b = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        let x = solve_least_squares(&a, &b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-10);
        assert!(x[1].abs() < 1e-10);
    }
}
