//! Reporting utilities: run totals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::render::GroupReport;

/// Counts over every processed group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub groups: usize,
    pub matched: usize,
    pub fitted: usize,
    pub failed: usize,
    pub views: usize,
    /// Groups whose aggregate views were skipped (no successful fits).
    pub skipped_aggregates: usize,
}

pub fn run_totals(reports: &[GroupReport]) -> RunTotals {
    reports.iter().fold(RunTotals::default(), |mut t, r| {
        t.groups += 1;
        t.matched += r.matched;
        t.fitted += r.fitted.len();
        t.failed += r.failed.len();
        t.views += r.views.len();
        if !r.aggregate_rendered {
            t.skipped_aggregates += 1;
        }
        t
    })
}
