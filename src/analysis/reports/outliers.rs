//! Outlier report formatting: weekly totals and user-week cells

use super::utils::{
    export_json, format_change, format_number, push_warnings, section_header, TABLE_RULE,
};
use super::OutputFormat;
use crate::errors::AppResult;
use crate::types::analysis_results::{
    OutlierBoundary, UserWeekAnalysisReport, WeekCategory, WeeklyAverage, WeeklyOutlierReport,
};
use crate::types::visualisation::{
    date_axis, get_category_colour, series_colour, PlotlyAnnotation, PlotlyChart, PlotlyLayout,
    PlotlyTrace,
};
use crate::utils::math::checked_percent_change;
use crate::utils::time::format_iso;

fn describe_boundary(boundary: Option<OutlierBoundary>) -> String {
    match boundary {
        None => "none (no non-zero values)".to_string(),
        Some(OutlierBoundary::Above { upper }) => format!("> {:.2}", upper),
        Some(OutlierBoundary::Outside { lower, upper }) => {
            format!("outside [{:.2}, {:.2}]", lower, upper)
        }
        Some(OutlierBoundary::AtOrBelow { lower }) => format!("<= {:.2}", lower),
    }
}

impl WeeklyOutlierReport {
    /// Weekly totals coloured by category, with the mean as a dashed line
    pub fn to_plotly_chart(&self) -> PlotlyChart {
        let x = date_axis(self.categories.iter().map(|w| &w.week_start));
        let colours = self
            .categories
            .iter()
            .map(|w| get_category_colour(w.category).to_string())
            .collect();
        let mut data = vec![PlotlyTrace::coloured_bars(
            x.clone(),
            self.categories.iter().map(|w| w.commits as f64).collect(),
            "Weekly Commits",
            colours,
        )];

        if let Some(thresholds) = &self.thresholds {
            data.push(
                PlotlyTrace::line(
                    x,
                    vec![thresholds.average; self.categories.len()],
                    "Average",
                    series_colour(1),
                )
                .dashed(),
            );
        }

        let summary = format!(
            "Method: {}<br>Flagged: {} of {} weeks",
            self.partition.method.describe(),
            self.partition.flagged.len(),
            self.partition.total()
        );

        PlotlyChart {
            data,
            layout: PlotlyLayout::weekly("Weekly Commit Outliers", "Total Commits")
                .with_legend("v", 1.02, 1.0, "left")
                .with_annotations(vec![PlotlyAnnotation::stats_box(&summary, 0.01, 0.85)]),
        }
    }
}

/// Format weekly-total outliers and categories
pub fn format_weekly_outliers(
    report: &WeeklyOutlierReport,
    format: &OutputFormat,
) -> AppResult<String> {
    match format {
        OutputFormat::Json => export_json(report),
        OutputFormat::Plotly => export_json(&report.to_plotly_chart()),
        OutputFormat::Console => {
            let mut output = String::new();
            section_header(&mut output, "📊 WEEKLY OUTLIER ANALYSIS");

            let partition = &report.partition;
            output.push_str(&format!("Method:   {}\n", partition.method.describe()));
            output.push_str(&format!(
                "Boundary: {}\n",
                describe_boundary(partition.boundary)
            ));
            output.push_str(&format!(
                "Flagged:  {} of {} weeks ({:.1}%)\n\n",
                format_number(partition.flagged.len()),
                format_number(partition.total()),
                partition.outlier_rate()
            ));

            if let Some(t) = &report.thresholds {
                output.push_str(&format!("Average weekly commits: {:.1}\n", t.average));
                output.push_str(&format!(
                    "Category thresholds: very high >= {:.1}, high >= {:.1}, low <= {:.1}\n\n",
                    t.very_high, t.high, t.low
                ));
            }

            for (label, category) in [
                ("Very High", WeekCategory::VeryHigh),
                ("High", WeekCategory::High),
                ("Normal", WeekCategory::Normal),
                ("Low", WeekCategory::Low),
            ] {
                output.push_str(&format!(
                    "   {:<10} {}\n",
                    label,
                    report.count(category)
                ));
            }
            output.push('\n');

            if !report.categories.is_empty() {
                output.push_str(&format!(
                    "{:<12} │ {:>10} │ {:>10} │ {:<9}\n",
                    "Week Start", "Commits", "vs Mean", "Category"
                ));
                output.push_str(TABLE_RULE);
                output.push('\n');
                for week in &report.categories {
                    output.push_str(&format!(
                        "{:<12} │ {:>10} │ {:>10} │ {:<9}\n",
                        format_iso(week.week_start),
                        format_number(week.commits as usize),
                        format_change(week.deviation_pct),
                        format!("{:?}", week.category)
                    ));
                }
            }

            if !partition.flagged.is_empty() {
                output.push_str("\nFlagged weeks:\n");
                for week in &partition.flagged {
                    output.push_str(&format!(
                        "   {}: {} commits\n",
                        format_iso(week.week_start),
                        format_number(week.commits as usize)
                    ));
                }
            }

            push_warnings(&mut output, &report.warnings);
            Ok(output)
        }
    }
}

fn overall_average(averages: &[WeeklyAverage]) -> f64 {
    if averages.is_empty() {
        return 0.0;
    }
    averages.iter().map(|w| w.average_commits).sum::<f64>() / averages.len() as f64
}

impl UserWeekAnalysisReport {
    /// Original, cleaned and power-user-free weekly averages
    pub fn to_plotly_chart(&self) -> PlotlyChart {
        let series = |averages: &[WeeklyAverage], name: &str, index: usize| {
            PlotlyTrace::line(
                date_axis(averages.iter().map(|w| &w.week_start)),
                averages.iter().map(|w| w.average_commits).collect(),
                name,
                series_colour(index),
            )
        };

        PlotlyChart {
            data: vec![
                series(&self.cells.original_averages, "Original", 0),
                series(&self.cells.cleaned_averages, "User-week outliers removed", 1),
                series(&self.averages_without_power_users, "Power users removed", 2),
            ],
            layout: PlotlyLayout::weekly(
                "Average Commits per User per Week",
                "Commits / user / week",
            )
            .with_legend("v", 1.02, 1.0, "left")
            .with_treatment_band(self.treatment.start, self.treatment.end),
        }
    }
}

/// Format the user-week cell outlier analysis
pub fn format_user_week_analysis(
    report: &UserWeekAnalysisReport,
    format: &OutputFormat,
) -> AppResult<String> {
    match format {
        OutputFormat::Json => export_json(report),
        OutputFormat::Plotly => export_json(&report.to_plotly_chart()),
        OutputFormat::Console => {
            let mut output = String::new();
            section_header(&mut output, "📊 USER-WEEK ANALYSIS");

            let cells = &report.cells;
            output.push_str(&format!(
                "Users: {}   Weeks: {}   Observations: {}\n\n",
                format_number(cells.population),
                format_number(cells.original_averages.len()),
                format_number(cells.total_cells)
            ));

            let original = overall_average(&cells.original_averages);
            let cleaned = overall_average(&cells.cleaned_averages);
            let no_power = overall_average(&report.averages_without_power_users);
            output.push_str("Average commits per user per week:\n");
            output.push_str(&format!("   Original:                 {:.4}\n", original));
            output.push_str(&format!(
                "   Without user-week outliers: {:.4} ({})\n",
                cleaned,
                format_change(checked_percent_change(original, cleaned))
            ));
            output.push_str(&format!(
                "   Without power users:      {:.4} ({})\n\n",
                no_power,
                format_change(checked_percent_change(original, no_power))
            ));

            output.push_str(&format!(
                "User-week outliers (> {:.0}% above week average): {} ({:.2}%)\n",
                cells.threshold_pct,
                format_number(cells.removed.len()),
                cells.outlier_rate()
            ));
            output.push_str(&format!(
                "Power users removed: {}\n",
                format_number(report.power_users.power_users.len())
            ));

            let mut top: Vec<_> = cells.removed.iter().collect();
            top.sort_by(|a, b| b.commits.cmp(&a.commits).then(a.user_id.cmp(&b.user_id)));
            if !top.is_empty() {
                output.push_str("\nTop user-week outliers:\n");
                for cell in top.into_iter().take(5) {
                    output.push_str(&format!(
                        "   {} (week {}): {} commits (week avg {:.2}, threshold {:.2})\n",
                        cell.user_id,
                        format_iso(cell.week_start),
                        format_number(cell.commits as usize),
                        cell.week_average,
                        cell.threshold
                    ));
                }
            }

            push_warnings(&mut output, &report.warnings);
            Ok(output)
        }
    }
}
