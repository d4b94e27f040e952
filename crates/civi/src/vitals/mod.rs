//! Indicator snapshots and everything computed from them: pillar and scope
//! aggregation, historical series, country rankings, and the CSV pipeline
//! that turns raw metric exports into indicators.

pub mod aggregate;
pub mod catalog;
pub mod comparison;
pub mod domain;
pub mod import;
pub mod labels;
pub mod normalize;
pub mod router;
pub mod series;
pub mod service;
pub mod snapshot;
pub mod store;
pub mod views;

#[cfg(test)]
mod tests;

pub use aggregate::{aggregate_pillar, error_margin, scope_score, ScopedScore, ScopedScores};
pub use catalog::{assemble_indicators, score_indicator_set, IndicatorSet, MetricCatalog};
pub use comparison::{compare_countries, ComparisonEntry};
pub use domain::{
    CountryHistory, CountryRecord, HistoricalRecord, Indicator, IndustryRecord, Pillar,
    PillarScore, PillarScores, Selection, Timeframe, INDUSTRIES,
};
pub use import::{
    parse_catalog, parse_catalog_path, parse_observations, parse_observations_path, ImportError,
    MetricDefinition, RawObservation,
};
pub use labels::{display_label, selection_label};
pub use normalize::{
    normalize_observations, Directionality, NormalizationLogEntry, NormalizationRun,
    NormalizedObservation,
};
pub use router::vitals_router;
pub use series::{build_chart, build_series, ChartData, HistorySource, SeriesDataset, SeriesPoint};
pub use service::{SeriesRequest, VitalsService, VitalsServiceError};
pub use snapshot::SnapshotLoader;
pub use store::{IndicatorStore, SnapshotError};
pub use views::{CountryProfileView, CountrySummaryView, IndustryProfileView, PillarScoreView};
