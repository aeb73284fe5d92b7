//! Formatted terminal output for a `plots` run.
//!
//! Formatting lives here so the pipeline stays free of presentation details.

use chrono::{DateTime, Local};

use crate::domain::PipelineConfig;
use crate::render::GroupReport;
use crate::report::run_totals;

/// Format the full run summary: header, per-group table, totals, failures.
pub fn format_run_summary(
    reports: &[GroupReport],
    config: &PipelineConfig,
    generated_at: DateTime<Local>,
) -> String {
    let mut out = String::new();

    out.push_str("=== scurves - S-curve fit summary ===\n");
    out.push_str(&format!("Generated: {}\n", generated_at.format("%Y-%m-%d %H:%M:%S")));
    out.push_str(&format!("Input: {}\n", config.input.display()));
    out.push_str(&format!(
        "Keys: {} (namespace {})\n",
        config.pattern, config.namespace
    ));
    if config.dry_run {
        out.push_str("Output: (dry run, nothing written)\n");
    } else {
        out.push_str(&format!(
            "Output: {} ({})\n",
            config.output_dir.display(),
            config.format.extension()
        ));
    }
    out.push('\n');

    out.push_str(&format_group_table(reports));

    let totals = run_totals(reports);
    out.push_str(&format!(
        "\nTotal: {} groups | {} selected | {} fitted | {} failed | {} views\n",
        totals.groups, totals.matched, totals.fitted, totals.failed, totals.views
    ));
    if totals.skipped_aggregates > 0 {
        out.push_str(&format!(
            "Aggregate views skipped for {} group(s) without successful fits.\n",
            totals.skipped_aggregates
        ));
    }

    let failures = format_failures(reports);
    if !failures.is_empty() {
        out.push_str("\nFit failures:\n");
        out.push_str(&failures);
    }

    out
}

/// One row per group with the ensemble's parameter statistics.
pub fn format_group_table(reports: &[GroupReport]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<6} {:>5} {:>7} {:>7} {:>6} {:>9} {:>16} {:>16}",
            "group", "cap", "matched", "fitted", "failed", "views", "shift", "width"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<6} {:-<5} {:-<7} {:-<7} {:-<6} {:-<9} {:-<16} {:-<16}",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in reports {
        let (shift, width) = match &r.summary {
            Some(s) => (
                fmt_mean_std(s.shift_mean, s.shift_std),
                fmt_mean_std(s.width_mean, s.width_std),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        let cap = if r.group.cap == 0 {
            "-".to_string()
        } else {
            r.group.cap.to_string()
        };
        out.push_str(
            format!(
                "{:<6} {:>5} {:>7} {:>7} {:>6} {:>9} {:>16} {:>16}",
                r.group.label(),
                cap,
                r.matched,
                r.fitted.len(),
                r.failed.len(),
                r.views.len(),
                shift,
                width
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

fn format_failures(reports: &[GroupReport]) -> String {
    let mut out = String::new();
    for r in reports {
        for (key, reason) in &r.failed {
            out.push_str(&format!("  {:<40} {reason}\n", truncate(key, 40)));
        }
    }
    out
}

fn fmt_mean_std(mean: f64, std: f64) -> String {
    format!("{mean:.2} ± {std:.2}")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::TimeZone;

    use super::*;
    use crate::domain::GroupSpec;
    use crate::ensemble::ParameterSummary;

    fn report(id: u32, fitted: usize, failed: usize) -> GroupReport {
        GroupReport {
            group: GroupSpec::new(id, if id == 0 { 5 } else { 0 }),
            matched: fitted + failed,
            fitted: (0..fitted).map(|i| format!("Final0/C{id}/k{i}")).collect(),
            failed: (0..failed)
                .map(|i| (format!("Final0/C{id}/bad{i}"), "too few points".to_string()))
                .collect(),
            views: vec![PathBuf::from("x.svg"); fitted * 2 + if fitted > 0 { 6 } else { 0 }],
            aggregate_rendered: fitted > 0,
            summary: (fitted > 0).then_some(ParameterSummary {
                n: fitted,
                shift_mean: 130.0,
                shift_std: 1.25,
                shift_min: 128.0,
                shift_max: 132.0,
                width_mean: 8.0,
                width_std: 0.5,
                width_min: 7.0,
                width_max: 9.0,
            }),
        }
    }

    #[test]
    fn summary_lists_groups_totals_and_failures() {
        let config = PipelineConfig::with_input(PathBuf::from("scan.json"));
        let at = Local.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        let reports = vec![report(0, 2, 1), report(1, 0, 3)];
        let text = format_run_summary(&reports, &config, at);

        assert!(text.contains("Generated: 2026-03-01 12:30:00"));
        assert!(text.contains("Input: scan.json"));
        assert!(text.contains("130.00 ± 1.25"));
        assert!(text.contains("Total: 2 groups | 6 selected | 2 fitted | 4 failed | 10 views"));
        assert!(text.contains("skipped for 1 group(s)"));
        assert!(text.contains("Final0/C1/bad2"));

        let c0 = text.lines().find(|l| l.starts_with("C0")).unwrap();
        let cols: Vec<&str> = c0.split_whitespace().collect();
        assert_eq!(&cols[..6], &["C0", "5", "3", "2", "1", "10"]);
        let c1 = text.lines().find(|l| l.starts_with("C1")).unwrap();
        assert!(c1.ends_with('-'));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd.");
    }
}
