//! Individual user analysis formatting

use super::utils::{export_json, format_number, push_warnings, section_header, TABLE_RULE};
use super::OutputFormat;
use crate::errors::AppResult;
use crate::types::analysis_results::{IndividualAnalysisReport, MetricDistribution, PowerUserReport};
use crate::types::visualisation::{series_colour, PlotlyChart, PlotlyLayout, PlotlyTrace};
use crate::utils::math::safe_percentage;
use crate::utils::time::format_iso;

impl IndividualAnalysisReport {
    /// Users per activity category
    pub fn to_plotly_chart(&self) -> PlotlyChart {
        let c = &self.categories;
        let labels = ["Inactive", "Casual", "Regular", "Power"];
        let counts = [
            c.inactive.len(),
            c.casual.len(),
            c.regular.len(),
            c.power_users.len(),
        ];

        PlotlyChart {
            data: vec![PlotlyTrace::bar(
                labels.iter().map(|l| l.to_string()).collect(),
                counts.iter().map(|&n| n as f64).collect(),
                "Users",
                series_colour(0),
            )
            .with_hovertemplate("%{x}: %{y:,} users<extra></extra>")],
            layout: PlotlyLayout::basic(
                "Users by Activity Category",
                "Category",
                "Number of users",
            ),
        }
    }
}

fn push_distribution_row(output: &mut String, d: &MetricDistribution) {
    let p = d.percentiles.unwrap_or_default();
    output.push_str(&format!(
        "{:<20} │ {:>9.2} │ {:>9.2} │ {:>8.2} │ {:>8.2} │ {:>8.2} │ {:>5} │ {:>5} │ {:>5} │ {:>5} │ {:>6}\n",
        d.metric,
        d.mean,
        d.std,
        p.p50,
        p.p95,
        p.p99,
        d.flagged.iqr,
        d.flagged.beyond_2_sigma,
        d.flagged.beyond_3_sigma,
        d.flagged.top_tail,
        d.flagged.bottom_tail
    ));
}

fn push_power_users(output: &mut String, title: &str, report: &PowerUserReport) {
    output.push_str(&format!(
        "{}: {}\n",
        title,
        format_number(report.power_users.len())
    ));
    for user in report.power_users.iter().take(5) {
        output.push_str(&format!(
            "   {}: {} commits (max month {})\n",
            user.user_id,
            format_number(user.total_commits as usize),
            format_number(user.max_monthly_commits as usize)
        ));
    }
}

/// Format per-user behavioral metrics and their distributions
pub fn format_individual_analysis(
    report: &IndividualAnalysisReport,
    format: &OutputFormat,
) -> AppResult<String> {
    match format {
        OutputFormat::Json => export_json(report),
        OutputFormat::Plotly => export_json(&report.to_plotly_chart()),
        OutputFormat::Console => {
            let mut output = String::new();
            section_header(&mut output, "📊 INDIVIDUAL USER ANALYSIS");

            output.push_str(&format!(
                "Window: {} to {} ({} days)\n",
                format_iso(report.window.start),
                format_iso(report.window.end),
                report.window.days()
            ));
            output.push_str(&format!(
                "Users:  {}\n\n",
                format_number(report.user_count)
            ));

            let c = &report.categories;
            let total = c.total();
            output.push_str("Activity categories:\n");
            for (label, users) in [
                ("Inactive", &c.inactive),
                ("Casual", &c.casual),
                ("Regular", &c.regular),
                ("Power", &c.power_users),
            ] {
                output.push_str(&format!(
                    "   {:<9} {:>8} ({:.1}%)\n",
                    label,
                    format_number(users.len()),
                    safe_percentage(users.len(), total)
                ));
            }
            output.push('\n');

            push_power_users(
                &mut output,
                "Power users (any month above threshold)",
                &report.monthly_power_users,
            );
            push_power_users(
                &mut output,
                "Power users (average per month)",
                &report.average_power_users,
            );

            let h = &report.highlights;
            output.push_str("\nBehaviour highlights:\n");
            output.push_str(&format!(
                "   Highly consistent (score > 0.7): {}\n",
                format_number(h.highly_consistent)
            ));
            output.push_str(&format!(
                "   Streaks over 30 days:            {}\n",
                format_number(h.long_streaks)
            ));
            output.push_str(&format!(
                "   Weekend-heavy:                   {}\n\n",
                format_number(h.weekend_heavy)
            ));

            output.push_str("DISTRIBUTIONS\n");
            output.push_str(&format!(
                "{:<20} │ {:>9} │ {:>9} │ {:>8} │ {:>8} │ {:>8} │ {:>5} │ {:>5} │ {:>5} │ {:>5} │ {:>6}\n",
                "Metric", "Mean", "Std", "P50", "P95", "P99", "IQR", "2σ", "3σ", "Top", "Bottom"
            ));
            output.push_str(TABLE_RULE);
            output.push('\n');
            for distribution in &report.distributions {
                push_distribution_row(&mut output, distribution);
            }

            let mut top: Vec<_> = report.metrics.values().collect();
            top.sort_by(|a, b| {
                b.total_commits
                    .cmp(&a.total_commits)
                    .then(a.user_id.cmp(&b.user_id))
            });
            let top: Vec<_> = top.into_iter().filter(|m| m.total_commits > 0).take(5).collect();
            if !top.is_empty() {
                output.push_str("\nMost active users:\n");
                for m in top {
                    output.push_str(&format!(
                        "   {}: {} commits, {} active days, streak {}, consistency {:.2}\n",
                        m.user_id,
                        format_number(m.total_commits as usize),
                        m.active_days,
                        m.longest_streak,
                        m.consistency_score
                    ));
                }
            }

            push_warnings(&mut output, &report.warnings);
            Ok(output)
        }
    }
}
