use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use super::aggregate::ScopedScores;
use super::domain::{CountryHistory, Selection, Timeframe};
use super::labels::selection_label;

/// Read access to loaded histories, so chart assembly does not care where
/// they live.
pub trait HistorySource {
    fn history(&self, alpha3: &str) -> Option<&CountryHistory>;

    /// Human name for dataset labels; falls back to the code itself.
    fn display_name(&self, alpha3: &str) -> String {
        alpha3.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: i32,
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesDataset {
    pub label: String,
    pub data: Vec<SeriesPoint>,
    pub color_ref: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<i32>,
    pub datasets: Vec<SeriesDataset>,
}

/// One point per recorded year inside the timeframe. Years without a record
/// are skipped, and a history that has not been loaded yields no points.
pub fn build_series(
    selection: &Selection,
    timeframe: Timeframe,
    history: Option<&CountryHistory>,
) -> Vec<SeriesPoint> {
    let Some(history) = history else {
        return Vec::new();
    };

    history
        .within(timeframe)
        .map(|record| {
            let scoped = record.select(selection.industry(), selection.pillar());
            SeriesPoint {
                x: record.year,
                y: scoped.score,
                error: scoped.error_margin(),
            }
        })
        .collect()
}

/// Assembles every selection into datasets sharing a sorted, deduplicated
/// year axis. Selections whose history is still pending contribute nothing.
pub fn build_chart<S>(source: &S, selections: &[Selection], timeframe: Timeframe) -> ChartData
where
    S: HistorySource + ?Sized,
{
    let mut labels = BTreeSet::new();
    let mut datasets = Vec::with_capacity(selections.len());

    for selection in selections {
        let alpha3 = selection.country.trim().to_ascii_uppercase();
        let Some(history) = source.history(&alpha3) else {
            debug!(country = %alpha3, "history not loaded; selection skipped");
            continue;
        };

        let data = build_series(selection, timeframe, Some(history));
        labels.extend(data.iter().map(|point| point.x));
        datasets.push(SeriesDataset {
            label: selection_label(
                &source.display_name(&alpha3),
                selection.industry(),
                selection.pillar(),
            ),
            data,
            color_ref: selection.color.clone(),
        });
    }

    ChartData {
        labels: labels.into_iter().collect(),
        datasets,
    }
}
