//! Utility functions for report formatting
//!
//! Provides shared formatting helpers used across all report formatters.

use crate::errors::AppResult;
use crate::types::analysis_results::AnalysisWarning;
use serde::Serialize;

/// Heavy rule under report titles
pub const HEADER_RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Light rule under table headers
pub const TABLE_RULE: &str = "───────────────────────────────────────────────────────────────────────────────";

/// Format number with thousand separators for console output
///
/// # Arguments
///
/// * `n` - Number to format
///
/// # Returns
///
/// String with comma separators (e.g., "1,234,567")
///
/// # Examples
///
/// ```
/// # use commit_activity_research::analysis::reports::utils::format_number;
/// assert_eq!(format_number(1234), "1,234");
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(26371), "26,371");
/// ```
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(*c);
    }

    result
}

/// Signed percentage, or "n/a" when undefined
///
/// ```
/// # use commit_activity_research::analysis::reports::utils::format_change;
/// assert_eq!(format_change(Some(12.345)), "+12.3%");
/// assert_eq!(format_change(Some(-4.0)), "-4.0%");
/// assert_eq!(format_change(None), "n/a");
/// ```
pub fn format_change(pct: Option<f64>) -> String {
    match pct {
        Some(p) => format!("{:+.1}%", p),
        None => "n/a".to_string(),
    }
}

/// Ratio with two decimals, or "n/a" when undefined
pub fn format_ratio(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| "n/a".to_string(), |r| format!("{:.2}", r))
}

/// Title line followed by the header rule
pub fn section_header(output: &mut String, title: &str) {
    output.push_str(&format!("\n{}\n", title));
    output.push_str(HEADER_RULE);
    output.push('\n');
}

/// Warning block appended to console reports (nothing when empty)
pub fn push_warnings(output: &mut String, warnings: &[AnalysisWarning]) {
    if warnings.is_empty() {
        return;
    }
    output.push_str("\n⚠️  Warnings:\n");
    for warning in warnings {
        output.push_str(&format!("   • {}\n", warning));
    }
}

/// Export data as JSON for programmatic use
pub fn export_json<T: Serialize>(data: &T) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(data)?)
}
