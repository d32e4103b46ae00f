//! Plotly chart types for data visualisation
//!
//! Shared Plotly types used across analysis reports for generating
//! interactive charts compatible with Plotly.js.

use super::analysis_results::WeekCategory;
use chrono::NaiveDate;
use serde::Serialize;

// ============================================================================
// Font and Styling Types
// ============================================================================

/// Plotly font configuration for titles, labels, and annotations
#[derive(Debug, Clone, Serialize, Default)]
pub struct PlotlyFont {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

/// Plotly legend configuration
#[derive(Debug, Clone, Serialize, Default)]
pub struct PlotlyLegend {
    /// Legend orientation: "v" (vertical) or "h" (horizontal)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xanchor: Option<String>,
}

/// Plotly annotation for text boxes and labels
#[derive(Debug, Clone, Serialize)]
pub struct PlotlyAnnotation {
    pub text: String,
    /// "paper" (0-1 fraction) or "x" (data coords)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xanchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yanchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showarrow: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bordercolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borderwidth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<PlotlyFont>,
}

impl PlotlyAnnotation {
    /// Statistics box in paper coordinates with monospace font
    pub fn stats_box(text: &str, x: f64, y: f64) -> Self {
        Self {
            text: text.to_string(),
            xref: Some("paper".to_string()),
            yref: Some("paper".to_string()),
            x: Some(serde_json::json!(x)),
            y: Some(y),
            xanchor: Some("left".to_string()),
            yanchor: Some("bottom".to_string()),
            showarrow: Some(false),
            bgcolor: Some("rgba(255, 255, 255, 0.8)".to_string()),
            bordercolor: Some("gray".to_string()),
            borderwidth: Some(1),
            font: Some(PlotlyFont {
                family: Some("monospace".to_string()),
                size: Some(10),
            }),
        }
    }

    /// Label pinned to the top of the plot at a date on the x-axis
    pub fn date_label(text: &str, date: NaiveDate) -> Self {
        Self {
            text: text.to_string(),
            xref: Some("x".to_string()),
            yref: Some("paper".to_string()),
            x: Some(serde_json::json!(date.to_string())),
            y: Some(1.02),
            xanchor: Some("left".to_string()),
            yanchor: Some("bottom".to_string()),
            showarrow: Some(false),
            bgcolor: None,
            bordercolor: None,
            borderwidth: None,
            font: Some(PlotlyFont {
                family: None,
                size: Some(10),
            }),
        }
    }
}

/// Layout shape (vertical bands and reference lines)
#[derive(Debug, Clone, Serialize)]
pub struct PlotlyShape {
    #[serde(rename = "type")]
    pub shape_type: String,
    pub xref: String,
    pub yref: String,
    pub x0: String,
    pub x1: String,
    pub y0: f64,
    pub y1: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fillcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<PlotlyLine>,
}

impl PlotlyShape {
    /// Shaded full-height band between two dates
    pub fn date_band(start: NaiveDate, end: NaiveDate, fill: &str) -> Self {
        Self {
            shape_type: "rect".to_string(),
            xref: "x".to_string(),
            yref: "paper".to_string(),
            x0: start.to_string(),
            x1: end.to_string(),
            y0: 0.0,
            y1: 1.0,
            fillcolor: Some(fill.to_string()),
            opacity: Some(0.3),
            line: Some(PlotlyLine {
                color: fill.to_string(),
                width: Some(0.0),
                dash: None,
            }),
        }
    }
}

// ============================================================================
// Chart Types
// ============================================================================

/// Complete Plotly chart data structure
///
/// Standard format expected by Plotly.js: `{data: [...], layout: {...}}`
#[derive(Debug, Clone, Serialize)]
pub struct PlotlyChart {
    pub data: Vec<PlotlyTrace>,
    pub layout: PlotlyLayout,
}

/// A single data series in the chart
#[derive(Debug, Clone, Serialize)]
pub struct PlotlyTrace {
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub name: String,
    #[serde(rename = "type")]
    pub trace_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<PlotlyMarker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<PlotlyLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
}

/// Plotly marker configuration
///
/// `color` is either one colour or one colour per point.
#[derive(Debug, Clone, Serialize)]
pub struct PlotlyMarker {
    pub color: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlotlyLine {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// "solid", "dash", "dot"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
}

/// Plotly hover label configuration
#[derive(Debug, Clone, Serialize)]
pub struct PlotlyHoverLabel {
    /// -1 means show full name without truncation
    pub namelength: i32,
}

/// Plotly layout configuration
#[derive(Debug, Clone, Serialize)]
pub struct PlotlyLayout {
    pub title: PlotlyTitle,
    pub xaxis: PlotlyAxis,
    pub yaxis: PlotlyAxis,
    pub hovermode: String,
    pub hoverlabel: PlotlyHoverLabel,
    /// Bar mode: "stack", "group", "overlay", "relative"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<PlotlyLegend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<PlotlyAnnotation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shapes: Option<Vec<PlotlyShape>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlotlyTitle {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<PlotlyFont>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlotlyAxis {
    pub title: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickangle: Option<i32>,
}

impl PlotlyAxis {
    fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            axis_type: None,
            tickangle: None,
        }
    }
}

impl PlotlyLayout {
    /// Create a basic layout with single y-axis
    pub fn basic(title: &str, x_title: &str, y_title: &str) -> Self {
        Self {
            title: PlotlyTitle {
                text: title.to_string(),
                font: None,
            },
            xaxis: PlotlyAxis::titled(x_title),
            yaxis: PlotlyAxis::titled(y_title),
            hovermode: "x unified".to_string(),
            hoverlabel: PlotlyHoverLabel { namelength: -1 },
            barmode: None,
            legend: None,
            annotations: None,
            shapes: None,
        }
    }

    /// Layout with a date x-axis and angled ticks
    pub fn weekly(title: &str, y_title: &str) -> Self {
        let mut layout = Self::basic(title, "Week starting", y_title);
        layout.xaxis.axis_type = Some("date".to_string());
        layout.xaxis.tickangle = Some(-45);
        layout
    }

    /// Standard positioning: `with_legend("v", 1.02, 1.0, "left")` for a legend on the right
    pub fn with_legend(mut self, orientation: &str, x: f64, y: f64, xanchor: &str) -> Self {
        self.legend = Some(PlotlyLegend {
            orientation: Some(orientation.to_string()),
            x: Some(x),
            y: Some(y),
            xanchor: Some(xanchor.to_string()),
        });
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<PlotlyAnnotation>) -> Self {
        self.annotations
            .get_or_insert_with(Vec::new)
            .extend(annotations);
        self
    }

    /// Shade the treatment week and label it
    pub fn with_treatment_band(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.shapes
            .get_or_insert_with(Vec::new)
            .push(PlotlyShape::date_band(start, end, TREATMENT_BAND_COLOUR));
        self.annotations
            .get_or_insert_with(Vec::new)
            .push(PlotlyAnnotation::date_label("Treatment", start));
        self
    }
}

impl PlotlyTrace {
    /// Create a bar trace
    pub fn bar(x: Vec<String>, y: Vec<f64>, name: &str, color: &str) -> Self {
        Self {
            x,
            y,
            name: name.to_string(),
            trace_type: "bar".to_string(),
            mode: None,
            yaxis: None,
            marker: Some(PlotlyMarker {
                color: serde_json::json!(color),
            }),
            line: None,
            hovertemplate: None,
        }
    }

    /// Bar trace with one colour per bar
    pub fn coloured_bars(x: Vec<String>, y: Vec<f64>, name: &str, colours: Vec<String>) -> Self {
        let mut trace = Self::bar(x, y, name, "");
        trace.marker = Some(PlotlyMarker {
            color: serde_json::json!(colours),
        });
        trace
    }

    /// Create a line trace
    pub fn line(x: Vec<String>, y: Vec<f64>, name: &str, color: &str) -> Self {
        Self {
            x,
            y,
            name: name.to_string(),
            trace_type: "scatter".to_string(),
            mode: Some("lines+markers".to_string()),
            yaxis: None,
            marker: None,
            line: Some(PlotlyLine {
                color: color.to_string(),
                width: None,
                dash: None,
            }),
            hovertemplate: None,
        }
    }

    /// Dashed line without markers
    pub fn dashed(mut self) -> Self {
        self.mode = Some("lines".to_string());
        if let Some(line) = self.line.as_mut() {
            line.dash = Some("dash".to_string());
        }
        self
    }

    pub fn with_hovertemplate(mut self, template: &str) -> Self {
        self.hovertemplate = Some(template.to_string());
        self
    }
}

pub const TREATMENT_BAND_COLOUR: &str = "#F5B7B1";

/// Series colours, cycled for multi-cohort charts
pub const SERIES_COLOURS: &[&str] = &["#3498DB", "#E74C3C", "#2ECC71", "#9B59B6", "#F39C12"];

pub fn series_colour(index: usize) -> &'static str {
    SERIES_COLOURS[index % SERIES_COLOURS.len()]
}

/// Get colour for a weekly activity category
pub fn get_category_colour(category: WeekCategory) -> &'static str {
    match category {
        WeekCategory::VeryHigh => "#C0392B",
        WeekCategory::High => "#E67E22",
        WeekCategory::Normal => "#3498DB",
        WeekCategory::Low => "#95A5A6",
    }
}

/// Dates as ISO strings for a Plotly x-axis
pub fn date_axis<'a>(dates: impl IntoIterator<Item = &'a NaiveDate>) -> Vec<String> {
    dates.into_iter().map(|d| d.to_string()).collect()
}
