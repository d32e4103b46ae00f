//! Cohort summary and cross-cohort comparison formatting

use super::utils::{
    export_json, format_change, format_number, format_ratio, push_warnings, section_header,
    TABLE_RULE,
};
use super::OutputFormat;
use crate::errors::AppResult;
use crate::types::analysis_results::{
    CohortComparisonReport, CohortComparisonRow, CohortSummary, TemporalStats,
};
use crate::types::visualisation::{date_axis, series_colour, PlotlyChart, PlotlyLayout, PlotlyTrace};
use crate::utils::time::{format_iso, week_end};
use std::collections::BTreeMap;

fn average_trace(summary: &CohortSummary, index: usize) -> PlotlyTrace {
    PlotlyTrace::line(
        date_axis(summary.weekly_averages.iter().map(|w| &w.week_start)),
        summary
            .weekly_averages
            .iter()
            .map(|w| w.average_commits)
            .collect(),
        &format!("{} ({} users)", summary.label, format_number(summary.cohort_size)),
        series_colour(index),
    )
    .with_hovertemplate("%{x}<br>%{y:.2f} commits/user<extra></extra>")
}

impl CohortSummary {
    /// Clean weekly commits per consistent user, treatment week shaded
    pub fn to_plotly_chart(&self) -> PlotlyChart {
        PlotlyChart {
            data: vec![average_trace(self, 0)],
            layout: PlotlyLayout::weekly(
                &format!("Average Weekly Commits per User: {}", self.label),
                "Commits / user / week",
            )
            .with_treatment_band(self.treatment_week, week_end(self.treatment_week)),
        }
    }
}

impl CohortComparisonReport {
    /// Both cohorts' weekly averages on one axis
    pub fn to_plotly_chart(&self) -> PlotlyChart {
        PlotlyChart {
            data: vec![average_trace(&self.left, 0), average_trace(&self.right, 1)],
            layout: PlotlyLayout::weekly(
                &format!(
                    "Average Weekly Commits per User: {} vs {}",
                    self.left.label, self.right.label
                ),
                "Commits / user / week",
            )
            .with_legend("h", 0.0, 1.1, "left")
            .with_treatment_band(self.left.treatment_week, week_end(self.left.treatment_week)),
        }
    }
}

fn push_temporal(
    output: &mut String,
    title: &str,
    prefix: &str,
    stats: &BTreeMap<u32, TemporalStats>,
) {
    if stats.is_empty() {
        return;
    }
    output.push_str(&format!("\n{}:\n", title));
    for (key, s) in stats {
        output.push_str(&format!(
            "   {}{:<3} {:>6} active weeks, {:>10} commits, mean {:.2}, median {:.1}\n",
            prefix,
            key,
            format_number(s.active_weeks),
            format_number(s.total_commits as usize),
            s.mean_commits,
            s.median_commits
        ));
    }
}

fn push_summary(output: &mut String, summary: &CohortSummary) {
    output.push_str(&format!(
        "Consistent users: {} of {} (active in all {} pre-treatment weeks)\n",
        format_number(summary.cohort_size),
        format_number(summary.total_users),
        summary.pre_treatment_weeks
    ));
    if let (Some(first), Some(last)) = (summary.weeks.first(), summary.weeks.last()) {
        output.push_str(&format!(
            "Weeks: {} ({} to {}), treatment week {}\n",
            summary.weeks.len(),
            format_iso(*first),
            format_iso(*last),
            format_iso(summary.treatment_week)
        ));
    }

    let outliers = &summary.cell_outliers;
    output.push_str(&format!(
        "User-week observations: {} ({} removed by {}, {} retained)\n\n",
        format_number(summary.observations),
        format_number(outliers.removed),
        outliers.method.describe(),
        format_number(outliers.retained)
    ));

    let stats = &summary.clean_stats;
    output.push_str("Clean user-week statistics:\n");
    output.push_str(&format!(
        "   Total commits:  {}\n",
        format_number(stats.total_commits as usize)
    ));
    output.push_str(&format!(
        "   Mean / median:  {:.2} / {:.1}\n",
        stats.commits.mean, stats.commits.median
    ));
    output.push_str(&format!("   Std deviation:  {:.2}\n", stats.commits.std));
    output.push_str(&format!(
        "   Active weeks:   {} ({})\n",
        format_number(stats.active_weeks),
        stats
            .active_percentage
            .map_or_else(|| "n/a".to_string(), |p| format!("{:.1}%", p))
    ));
    if let Some(p) = &stats.commits.percentiles {
        output.push_str(&format!(
            "   Percentiles:    P25 {:.1}  P50 {:.1}  P75 {:.1}  P90 {:.1}  P95 {:.1}  P99 {:.1}\n",
            p.p25, p.p50, p.p75, p.p90, p.p95, p.p99
        ));
    }

    let f = &summary.activity_frequency;
    output.push_str("\nActivity frequency (active weeks per user):\n");
    output.push_str(&format!("   Never active (0):     {}\n", f.never_active));
    output.push_str(&format!("   Rarely (1-5):         {}\n", f.rarely_active));
    output.push_str(&format!("   Sometimes (6-10):     {}\n", f.sometimes_active));
    output.push_str(&format!("   Often (11-15):        {}\n", f.often_active));
    output.push_str(&format!("   Very active (16+):    {}\n", f.very_active));

    output.push_str("\nPeriod averages (commits per user-week):\n");
    for period in &summary.period_averages {
        output.push_str(&format!(
            "   {:<15} {:>8.3} ({} cells)\n",
            period.period.label(),
            period.mean_commits,
            format_number(period.cells)
        ));
    }

    push_temporal(output, "Monthly", "M", &summary.temporal.monthly);
    push_temporal(output, "Quarterly", "Q", &summary.temporal.quarterly);

    let before_after = &summary.before_after;
    if !before_after.rows.is_empty() {
        output.push_str("\nBefore vs after outlier removal:\n");
        output.push_str(&format!(
            "   {:<26} {:>12} {:>12} {:>9}\n",
            "Metric", "Original", "Filtered", "Change"
        ));
        for row in &before_after.rows {
            output.push_str(&format!(
                "   {:<26} {:>12.2} {:>12.2} {:>9}\n",
                row.metric,
                row.original,
                row.filtered,
                format_change(row.change_pct)
            ));
        }
        if let (Some(min), Some(max)) = (before_after.removed_min, before_after.removed_max) {
            output.push_str(&format!(
                "   Removed values range from {} to {}\n",
                format_number(min as usize),
                format_number(max as usize)
            ));
        }
    }
}

/// Format the consistent-user summary for one cohort
pub fn format_cohort_summary(summary: &CohortSummary, format: &OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => export_json(summary),
        OutputFormat::Plotly => export_json(&summary.to_plotly_chart()),
        OutputFormat::Console => {
            let mut output = String::new();
            section_header(
                &mut output,
                &format!("📊 COHORT SUMMARY: {}", summary.label.to_uppercase()),
            );
            push_summary(&mut output, summary);
            push_warnings(&mut output, &summary.warnings);
            Ok(output)
        }
    }
}

fn push_rows(output: &mut String, left: &str, right: &str, rows: &[CohortComparisonRow]) {
    output.push_str(&format!(
        "{:<26} │ {:>14} │ {:>14} │ {:>8}\n",
        "Metric", left, right, "Ratio"
    ));
    output.push_str(TABLE_RULE);
    output.push('\n');
    for row in rows {
        output.push_str(&format!(
            "{:<26} │ {:>14.2} │ {:>14.2} │ {:>8}\n",
            row.metric,
            row.left,
            row.right,
            format_ratio(row.ratio)
        ));
    }
}

/// Format a two-cohort comparison
pub fn format_cohort_comparison(
    report: &CohortComparisonReport,
    format: &OutputFormat,
) -> AppResult<String> {
    match format {
        OutputFormat::Json => export_json(report),
        OutputFormat::Plotly => export_json(&report.to_plotly_chart()),
        OutputFormat::Console => {
            let c = &report.comparison;
            let mut output = String::new();
            section_header(
                &mut output,
                &format!("📊 COHORT COMPARISON: {} vs {}", c.left_label, c.right_label),
            );

            push_rows(&mut output, &c.left_label, &c.right_label, &c.rows);
            output.push('\n');
            push_rows(&mut output, &c.left_label, &c.right_label, &c.percentile_rows);

            output.push_str(&format!(
                "\nPre-treatment correlation of weekly averages: {}\n",
                c.pre_treatment_correlation
                    .map_or_else(|| "n/a".to_string(), |r| format!("{:.3}", r))
            ));

            for summary in [&report.left, &report.right] {
                if !summary.warnings.is_empty() {
                    output.push_str(&format!("\n{}:", summary.label));
                    push_warnings(&mut output, &summary.warnings);
                }
            }
            Ok(output)
        }
    }
}
