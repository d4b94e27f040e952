use serde::Serialize;
use std::cmp::Ordering;

use super::aggregate::ScopedScores;
use super::store::IndicatorStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonEntry {
    pub alpha3: String,
    pub name: String,
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<f64>,
}

/// Ranks every stored country on the selected scope, best first. Countries
/// without a score trail the list; ties fall back to the country code.
///
/// With `year` set, each country is scored from its historical record for
/// that year instead of the current snapshot; countries with no such record
/// rank as unscored.
pub fn compare_countries(
    store: &IndicatorStore,
    industry: Option<&str>,
    pillar: Option<&str>,
    year: Option<i32>,
) -> Vec<ComparisonEntry> {
    let mut entries: Vec<ComparisonEntry> = store
        .countries()
        .map(|record| {
            let scoped = match year {
                None => record.select(industry, pillar),
                Some(year) => store
                    .record_for_year(&record.alpha3, year)
                    .map(|historical| historical.select(industry, pillar))
                    .unwrap_or_default(),
            };
            ComparisonEntry {
                alpha3: record.alpha3.clone(),
                name: record.name.clone(),
                score: scoped.score,
                confidence: scoped.pillar.and_then(|selected| selected.confidence),
                error: scoped.error_margin(),
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        let by_score = match (a.score, b.score) {
            (Some(left), Some(right)) => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_score.then_with(|| a.alpha3.cmp(&b.alpha3))
    });
    entries
}
