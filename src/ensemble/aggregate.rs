//! The `Ensemble`: ordered successful fits of one group.
//!
//! An ensemble is built fresh for every group and dropped when the group is
//! done. Entry order is discovery order, which is also the order colours and
//! markers are handed out in.

use crate::domain::{FitResult, Framing, LeafKey, Series};

/// One successfully fitted series.
#[derive(Debug, Clone)]
pub struct EnsembleEntry {
    pub key: LeafKey,
    pub series: Series,
    pub fit: FitResult,
}

impl EnsembleEntry {
    pub fn shift(&self) -> f64 {
        self.fit.shift
    }

    pub fn width(&self) -> f64 {
        self.fit.width
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ensemble {
    entries: Vec<EnsembleEntry>,
}

/// Descriptive statistics of the fitted parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSummary {
    pub n: usize,
    pub shift_mean: f64,
    pub shift_std: f64,
    pub shift_min: f64,
    pub shift_max: f64,
    pub width_mean: f64,
    pub width_std: f64,
    pub width_min: f64,
    pub width_max: f64,
}

impl Ensemble {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Append a fitted series. Unsuccessful fits are not part of an ensemble
    /// and are dropped; returns whether the entry was added.
    pub fn add(&mut self, key: LeafKey, series: Series, fit: FitResult) -> bool {
        if !fit.success {
            return false;
        }
        self.entries.push(EnsembleEntry { key, series, fit });
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[EnsembleEntry] {
        &self.entries
    }

    pub fn shifts(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(EnsembleEntry::shift)
    }

    pub fn widths(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(EnsembleEntry::width)
    }

    /// X-axis bounds covering every fitted transition:
    /// `(min(shift - k·width), max(shift + k·width))`.
    ///
    /// # Panics
    /// Panics on an empty ensemble. Groups without successful fits have no
    /// aggregate views, so callers check `is_empty()` first.
    pub fn bounds(&self, framing: Framing) -> (f64, f64) {
        assert!(!self.is_empty(), "Ensemble::bounds called on an empty ensemble");
        let k = framing.multiplier();
        self.entries.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), e| (lo.min(e.shift() - k * e.width()), hi.max(e.shift() + k * e.width())),
        )
    }

    /// Parameter statistics, `None` for an empty ensemble.
    pub fn summary(&self) -> Option<ParameterSummary> {
        if self.is_empty() {
            return None;
        }
        let shifts: Vec<f64> = self.shifts().collect();
        let widths: Vec<f64> = self.widths().collect();
        let (shift_mean, shift_std) = mean_std(&shifts);
        let (width_mean, width_std) = mean_std(&widths);
        Some(ParameterSummary {
            n: self.len(),
            shift_mean,
            shift_std,
            shift_min: shifts.iter().copied().fold(f64::INFINITY, f64::min),
            shift_max: shifts.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            width_mean,
            width_std,
            width_min: widths.iter().copied().fold(f64::INFINITY, f64::min),
            width_max: widths.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Mean and population standard deviation.
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(shift: f64, width: f64) -> FitResult {
        FitResult {
            success: true,
            shift,
            width,
            rmse: 0.01,
            iterations: 5,
        }
    }

    fn ensemble(params: &[(f64, f64)]) -> Ensemble {
        let mut e = Ensemble::new();
        for (i, &(s, w)) in params.iter().enumerate() {
            assert!(e.add(format!("k{i}"), Series::default(), ok(s, w)));
        }
        e
    }

    #[test]
    fn bounds_are_tight_on_both_sides() {
        let params = [(120.0, 10.0), (100.0, 2.0), (140.0, 4.0), (130.0, 9.0)];
        let e = ensemble(&params);
        for framing in [Framing::Narrow, Framing::Wide] {
            let k = framing.multiplier();
            let (lo, hi) = e.bounds(framing);
            for &(s, w) in &params {
                assert!(lo <= s - k * w);
                assert!(hi >= s + k * w);
            }
            assert!(params.iter().any(|&(s, w)| s - k * w == lo));
            assert!(params.iter().any(|&(s, w)| s + k * w == hi));
        }
        assert_eq!(e.bounds(Framing::Narrow), (96.0, 148.0));
        assert_eq!(e.bounds(Framing::Wide), (70.0, 175.0));
    }

    #[test]
    fn failed_fits_are_not_added_and_order_is_kept() {
        let mut e = Ensemble::new();
        assert!(e.add("a".into(), Series::default(), ok(1.0, 1.0)));
        assert!(!e.add("b".into(), Series::default(), FitResult::failed()));
        assert!(e.add("c".into(), Series::default(), ok(2.0, 1.0)));
        let keys: Vec<_> = e.entries().iter().map(|x| x.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "c"]);
        assert_eq!(e.shifts().count(), e.widths().count());
        e.reset();
        assert!(e.is_empty());
        assert!(e.summary().is_none());
    }

    #[test]
    #[should_panic(expected = "empty ensemble")]
    fn bounds_of_empty_ensemble_panics() {
        Ensemble::new().bounds(Framing::Narrow);
    }

    #[test]
    fn summary_reports_mean_and_spread() {
        let s = ensemble(&[(100.0, 4.0), (110.0, 8.0)]).summary().unwrap();
        assert_eq!(s.n, 2);
        assert!((s.shift_mean - 105.0).abs() < 1e-12);
        assert!((s.shift_std - 5.0).abs() < 1e-12);
        assert!((s.width_mean - 6.0).abs() < 1e-12);
        assert_eq!((s.shift_min, s.shift_max), (100.0, 110.0));
        assert_eq!((s.width_min, s.width_max), (4.0, 8.0));
    }
}
