//! Weekly totals formatting (console, JSON, Plotly)

use super::utils::{export_json, format_number, push_warnings, section_header, TABLE_RULE};
use super::OutputFormat;
use crate::errors::AppResult;
use crate::types::analysis_results::{PowerUserExclusionReport, WeekTotal, WeeklyTotalsReport};
use crate::types::visualisation::{date_axis, series_colour, PlotlyChart, PlotlyLayout, PlotlyTrace};
use crate::utils::time::format_iso;

impl WeeklyTotalsReport {
    /// Weekly commit line with the treatment range shaded
    pub fn to_plotly_chart(&self) -> PlotlyChart {
        weekly_chart(
            &self.weeks,
            "Weekly Commits",
            &format!("Weekly Commits ({} users)", format_number(self.user_count)),
            self,
        )
    }
}

impl PowerUserExclusionReport {
    /// Weekly commits of the regular users only
    pub fn to_plotly_chart(&self) -> PlotlyChart {
        weekly_chart(
            &self.weekly.weeks,
            "Weekly Commits (excluding power users)",
            &format!(
                "Weekly Commits without {} Power Users",
                format_number(self.power_users.power_users.len())
            ),
            &self.weekly,
        )
    }
}

fn weekly_chart(
    weeks: &[WeekTotal],
    name: &str,
    title: &str,
    report: &WeeklyTotalsReport,
) -> PlotlyChart {
    let trace = PlotlyTrace::line(
        date_axis(weeks.iter().map(|w| &w.week_start)),
        weeks.iter().map(|w| w.commits as f64).collect(),
        name,
        series_colour(0),
    )
    .with_hovertemplate("%{x}<br>%{y:,} commits<extra></extra>");

    let mut layout = PlotlyLayout::weekly(title, "Total Commits");
    if let Some(treatment) = report.treatment {
        layout = layout.with_treatment_band(treatment.start, treatment.end);
    }

    PlotlyChart {
        data: vec![trace],
        layout,
    }
}

fn push_week_table(output: &mut String, report: &WeeklyTotalsReport) {
    output.push_str(&format!("{:<12} │ {:>12}\n", "Week Start", "Commits"));
    output.push_str(TABLE_RULE);
    output.push('\n');
    for week in &report.weeks {
        output.push_str(&format!(
            "{:<12} │ {:>12}\n",
            format_iso(week.week_start),
            format_number(week.commits as usize)
        ));
    }
}

fn push_overview(output: &mut String, report: &WeeklyTotalsReport) {
    output.push_str(&format!(
        "Users:         {}\n",
        format_number(report.user_count)
    ));
    output.push_str(&format!(
        "Weeks:         {}\n",
        format_number(report.weeks.len())
    ));
    output.push_str(&format!(
        "Total Commits: {}\n",
        format_number(report.total_commits as usize)
    ));
    output.push_str(&format!(
        "Average/Week:  {:.1}\n",
        report.average_per_week()
    ));
    if let Some(peak) = report.peak_week() {
        output.push_str(&format!(
            "Peak Week:     {} ({} commits)\n",
            format_iso(peak.week_start),
            format_number(peak.commits as usize)
        ));
    }
    if let Some(low) = report.lowest_week() {
        output.push_str(&format!(
            "Lowest Week:   {} ({} commits)\n",
            format_iso(low.week_start),
            format_number(low.commits as usize)
        ));
    }
    if !report.trimmed.is_empty() {
        let trimmed: Vec<String> = report
            .trimmed
            .iter()
            .map(|w| format_iso(w.week_start))
            .collect();
        output.push_str(&format!(
            "Trimmed:       {} (partial weeks)\n",
            trimmed.join(", ")
        ));
    }
    output.push('\n');
}

/// Format weekly commit totals
pub fn format_weekly_totals(
    report: &WeeklyTotalsReport,
    format: &OutputFormat,
) -> AppResult<String> {
    match format {
        OutputFormat::Json => export_json(report),
        OutputFormat::Plotly => export_json(&report.to_plotly_chart()),
        OutputFormat::Console => {
            let mut output = String::new();
            section_header(&mut output, "📊 WEEKLY COMMIT TOTALS");

            if report.weeks.is_empty() {
                output.push_str("No weeks in the analysis period.\n");
                push_warnings(&mut output, &report.warnings);
                return Ok(output);
            }

            push_overview(&mut output, report);
            push_week_table(&mut output, report);
            push_warnings(&mut output, &report.warnings);
            Ok(output)
        }
    }
}

/// Format weekly totals with power users removed
pub fn format_power_user_exclusion(
    report: &PowerUserExclusionReport,
    format: &OutputFormat,
) -> AppResult<String> {
    match format {
        OutputFormat::Json => export_json(report),
        OutputFormat::Plotly => export_json(&report.to_plotly_chart()),
        OutputFormat::Console => {
            let mut output = String::new();
            section_header(&mut output, "📊 WEEKLY COMMITS WITHOUT POWER USERS");

            let power = &report.power_users;
            output.push_str(&format!(
                "Power Users Removed: {} ({} regular users remain)\n",
                format_number(power.power_users.len()),
                format_number(power.regular_user_count)
            ));
            for user in power.power_users.iter().take(5) {
                output.push_str(&format!(
                    "   {}: {} commits (max month)\n",
                    user.user_id,
                    format_number(user.max_monthly_commits as usize)
                ));
            }
            output.push('\n');

            push_overview(&mut output, &report.weekly);
            push_week_table(&mut output, &report.weekly);
            push_warnings(&mut output, &report.weekly.warnings);
            Ok(output)
        }
    }
}
