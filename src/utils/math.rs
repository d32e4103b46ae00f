//! Mathematical utility functions for statistical analysis
//!
//! Percentage, ratio and moment helpers with explicit zero-division guards.
//! Guards come in two flavours:
//! - `safe_percentage*` return 0.0 for an empty base (display counts)
//! - `checked_*` return `None` ("not applicable") so callers never emit
//!   `inf` or `NaN` into downstream output

/// Calculate percentage safely for usize values, returning 0.0 if total is zero.
///
/// # Examples
/// ```
/// use commit_activity_research::utils::math::safe_percentage;
///
/// assert_eq!(safe_percentage(50, 100), 50.0);
/// assert_eq!(safe_percentage(1, 4), 25.0);
/// assert_eq!(safe_percentage(50, 0), 0.0);  // Zero-division guard
/// ```
#[inline]
pub fn safe_percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Calculate percentage safely for u64 values, returning 0.0 if total is zero.
///
/// **Precision Note**: Large u64 values (>2^53) may lose precision when cast to f64.
#[inline]
pub fn safe_percentage_u64(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// `numerator / denominator`, or `None` when the denominator is zero or
/// either operand is not finite.
///
/// # Examples
/// ```
/// use commit_activity_research::utils::math::checked_ratio;
///
/// assert_eq!(checked_ratio(3.0, 2.0), Some(1.5));
/// assert_eq!(checked_ratio(3.0, 0.0), None);
/// ```
#[inline]
pub fn checked_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !numerator.is_finite() || !denominator.is_finite() {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// Percentage change from `original` to `updated`; `None` when `original` is zero.
///
/// # Examples
/// ```
/// use commit_activity_research::utils::math::checked_percent_change;
///
/// assert_eq!(checked_percent_change(200.0, 150.0), Some(-25.0));
/// assert_eq!(checked_percent_change(0.0, 5.0), None);
/// ```
#[inline]
pub fn checked_percent_change(original: f64, updated: f64) -> Option<f64> {
    checked_ratio(updated - original, original).map(|r| r * 100.0)
}

/// Arithmetic mean (`None` for an empty slice)
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation, ddof = 0 (`None` for an empty slice)
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Sort a copy of `values` ascending (NaN-free input assumed)
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    out
}

/// Inclusive linear-interpolation percentile over an ascending slice
///
/// Rank is `p / 100 * (n - 1)`; the result interpolates between the two
/// neighbouring order statistics. `p` is clamped to `[0, 100]`.
///
/// # Examples
/// ```
/// use commit_activity_research::utils::math::percentile_sorted;
///
/// let v = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(percentile_sorted(&v, 50.0), Some(2.5));
/// assert_eq!(percentile_sorted(&v, 100.0), Some(4.0));
/// assert_eq!(percentile_sorted(&[], 50.0), None);
/// ```
pub fn percentile_sorted(sorted_values: &[f64], p: f64) -> Option<f64> {
    if sorted_values.is_empty() {
        return None;
    }
    let p = p.clamp(0.0, 100.0);
    let rank = p / 100.0 * (sorted_values.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    let lo = sorted_values[lower];
    let hi = sorted_values[upper];
    Some(lo + (hi - lo) * fraction)
}

/// Percentile over unsorted values (see [`percentile_sorted`])
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    percentile_sorted(&sorted(values), p)
}

/// Pearson correlation coefficient
///
/// `None` when the slices differ in length, hold fewer than two points,
/// or either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mx) * (y - my);
        vx += (x - mx).powi(2);
        vy += (y - my).powi(2);
    }
    checked_ratio(cov, (vx * vy).sqrt())
}
