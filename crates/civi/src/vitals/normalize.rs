use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use super::import::RawObservation;

pub const MIN_MAX_METHOD: &str = "min-max";

/// Whether higher raw values are better (`POS`) or worse (`NEG`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Directionality {
    #[default]
    #[serde(rename = "POS")]
    Positive,
    #[serde(rename = "NEG")]
    Negative,
}

impl Directionality {
    /// Anything other than `NEG` counts as positive.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("NEG") {
            Self::Negative
        } else {
            Self::Positive
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedObservation {
    pub country_code: String,
    pub year: i32,
    pub metric_id: String,
    pub normalized_value: f64,
    pub method: &'static str,
    pub window: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizationLogEntry {
    pub metric_id: String,
    pub method: &'static str,
    pub window_start_year: i32,
    pub window_end_year: i32,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationRun {
    pub observations: Vec<NormalizedObservation>,
    pub log: Vec<NormalizationLogEntry>,
    /// Metrics with no measurements, or with every measurement identical.
    pub skipped_metrics: Vec<String>,
}

/// Min-max scales every metric onto 0..=100, flipping `NEG` metrics so that
/// higher is always better. Unmeasured rows produce no output.
pub fn normalize_observations<F>(raw: &[RawObservation], directionality: F) -> NormalizationRun
where
    F: Fn(&str) -> Directionality,
{
    let Some((window_start, window_end)) = year_window(raw) else {
        return NormalizationRun::default();
    };
    let window = format!("{window_start}-{window_end}");

    let mut by_metric: BTreeMap<&str, Vec<&RawObservation>> = BTreeMap::new();
    for observation in raw {
        by_metric
            .entry(observation.metric_id.as_str())
            .or_default()
            .push(observation);
    }

    let mut run = NormalizationRun::default();
    for (metric_id, observations) in by_metric {
        let measured: Vec<(&RawObservation, f64)> = observations
            .iter()
            .filter_map(|observation| observation.metric_value.map(|value| (*observation, value)))
            .collect();

        let Some((min, max)) = value_range(measured.iter().map(|(_, value)| *value)) else {
            warn!(metric = metric_id, "metric has no measurements; skipped");
            run.skipped_metrics.push(metric_id.to_string());
            continue;
        };
        if min == max {
            warn!(metric = metric_id, value = min, "metric has no spread; skipped");
            run.skipped_metrics.push(metric_id.to_string());
            continue;
        }

        let direction = directionality(metric_id);
        for (observation, value) in measured {
            let scaled = (value - min) / (max - min) * 100.0;
            let normalized_value = match direction {
                Directionality::Positive => scaled,
                Directionality::Negative => 100.0 - scaled,
            };
            run.observations.push(NormalizedObservation {
                country_code: observation.country_code.clone(),
                year: observation.year,
                metric_id: metric_id.to_string(),
                normalized_value,
                method: MIN_MAX_METHOD,
                window: window.clone(),
            });
        }

        run.log.push(NormalizationLogEntry {
            metric_id: metric_id.to_string(),
            method: MIN_MAX_METHOD,
            window_start_year: window_start,
            window_end_year: window_end,
            min,
            max,
        });
    }

    info!(
        normalized = run.observations.len(),
        metrics = run.log.len(),
        skipped = run.skipped_metrics.len(),
        "raw observations normalized"
    );
    run
}

fn year_window(raw: &[RawObservation]) -> Option<(i32, i32)> {
    let start = raw.iter().map(|observation| observation.year).min()?;
    let end = raw.iter().map(|observation| observation.year).max()?;
    Some((start, end))
}

fn value_range<I: Iterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values.fold(None, |range, value| match range {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(country: &str, year: i32, metric: &str, value: Option<f64>) -> RawObservation {
        RawObservation {
            country_code: country.to_string(),
            year,
            metric_id: metric.to_string(),
            metric_value: value,
            source: "test".to_string(),
        }
    }

    #[test]
    fn scales_between_extremes() {
        let raw = vec![
            observation("USA", 2019, "grid_uptime", Some(90.0)),
            observation("GBR", 2020, "grid_uptime", Some(95.0)),
            observation("JPN", 2021, "grid_uptime", Some(100.0)),
        ];

        let run = normalize_observations(&raw, |_| Directionality::Positive);

        let values: Vec<f64> = run
            .observations
            .iter()
            .map(|entry| entry.normalized_value)
            .collect();
        assert_eq!(values, vec![0.0, 50.0, 100.0]);
        assert!(run.observations.iter().all(|entry| entry.window == "2019-2021"));
        assert_eq!(run.log.len(), 1);
        assert_eq!(run.log[0].min, 90.0);
        assert_eq!(run.log[0].max, 100.0);
        assert_eq!(run.log[0].method, "min-max");
    }

    #[test]
    fn negative_metrics_are_flipped() {
        let raw = vec![
            observation("USA", 2020, "outage_hours", Some(10.0)),
            observation("GBR", 2020, "outage_hours", Some(30.0)),
        ];

        let run = normalize_observations(&raw, |_| Directionality::Negative);

        assert_eq!(run.observations[0].normalized_value, 100.0);
        assert_eq!(run.observations[1].normalized_value, 0.0);
    }

    #[test]
    fn constant_and_unmeasured_metrics_are_skipped() {
        let raw = vec![
            observation("USA", 2020, "flat", Some(5.0)),
            observation("GBR", 2020, "flat", Some(5.0)),
            observation("USA", 2020, "blank", None),
            observation("USA", 2020, "spread", Some(1.0)),
            observation("GBR", 2020, "spread", None),
            observation("JPN", 2020, "spread", Some(3.0)),
        ];

        let run = normalize_observations(&raw, Directionality::parse);

        assert_eq!(run.skipped_metrics, vec!["blank".to_string(), "flat".to_string()]);
        assert_eq!(run.observations.len(), 2);
        assert!(run
            .observations
            .iter()
            .all(|entry| entry.metric_id == "spread"));
    }

    #[test]
    fn unknown_direction_counts_as_positive() {
        assert_eq!(Directionality::parse("neg"), Directionality::Negative);
        assert_eq!(Directionality::parse("POS"), Directionality::Positive);
        assert_eq!(Directionality::parse("sideways"), Directionality::Positive);
    }
}
