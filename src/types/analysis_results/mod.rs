//! Analysis result types and data structures
//!
//! Plain, serialisable views produced by the analysers. Nothing here holds a
//! reference into the input snapshot, so every report can be written out
//! directly as JSON.

mod cohort;
mod metrics;
mod outliers;
mod statistics;
mod warnings;
mod weekly;

pub use cohort::{Cohort, CohortSelection};
pub use metrics::{
    ActivityCategories, ActivityCategory, ActivityFrequency, ActivityMetrics, Band,
    BehaviourHighlights, IndividualAnalysisReport, MetricDistribution, MetricOutlierCounts,
    PowerUser, PowerUserMethod, PowerUserReport, SigmaBands,
};
pub use outliers::{
    CategorisedWeek, CategoryThresholds, CellOutlier, CellOutlierReport, OutlierBoundary,
    OutlierMethod, OutlierPartition, OutlierVerdict, PowerUserExclusionReport,
    UserWeekAnalysisReport, WeekCategory, WeeklyOutlierReport,
};
pub use statistics::{
    BeforeAfterComparison, CellOutlierSummary, CohortComparison, CohortComparisonReport,
    CohortComparisonRow, CohortSummary, ComparisonRow, DescriptiveStats, PeriodAverage,
    Percentiles, TemporalPatterns, TemporalStats, UserWeekStatistics,
};
pub use warnings::AnalysisWarning;
pub use weekly::{
    MatrixDensity, TreatmentPeriod, UserWeekMatrix, UserWeekObservation, WeekTotal,
    WeeklyAverage, WeeklyTotalsReport,
};
