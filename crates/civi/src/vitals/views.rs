use serde::Serialize;

use std::collections::BTreeMap;

use super::aggregate::scope_score;
use super::domain::{
    missing_industries, CountryRecord, HistoricalRecord, Indicator, IndustryRecord, Pillar,
    PillarScore, PillarScores,
};
use super::labels::display_label;

#[derive(Debug, Clone, Serialize)]
pub struct PillarScoreView {
    pub pillar: Pillar,
    pub pillar_label: &'static str,
    pub score: Option<f64>,
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<f64>,
}

impl From<&PillarScore> for PillarScoreView {
    fn from(value: &PillarScore) -> Self {
        Self {
            pillar: value.pillar,
            pillar_label: value.pillar.label(),
            score: value.score,
            confidence: value.confidence,
            error: value.error_margin(),
        }
    }
}

fn pillar_views(scores: &PillarScores) -> Vec<PillarScoreView> {
    scores.iter().map(PillarScoreView::from).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct CountrySummaryView {
    pub alpha3: String,
    pub name: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub score: Option<f64>,
}

impl CountrySummaryView {
    /// Country metadata with the overall score from `historical`. A year
    /// with no record scores as `None`.
    pub fn for_year(
        record: &CountryRecord,
        year: i32,
        historical: Option<&HistoricalRecord>,
    ) -> Self {
        Self {
            year: Some(year),
            score: historical.and_then(|historical| scope_score(&historical.scores, None)),
            ..Self::from(record)
        }
    }
}

impl From<&CountryRecord> for CountrySummaryView {
    fn from(value: &CountryRecord) -> Self {
        Self {
            alpha3: value.alpha3.clone(),
            name: value.name.clone(),
            region: value.region.clone(),
            year: None,
            score: scope_score(&value.scores, None),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndustryProfileView {
    pub key: String,
    pub label: String,
    pub score: Option<f64>,
    pub pillars: Vec<PillarScoreView>,
    pub indicator_count: usize,
    pub measured_count: usize,
    pub indicators: Vec<Indicator>,
}

impl From<&IndustryRecord> for IndustryProfileView {
    fn from(value: &IndustryRecord) -> Self {
        let scores = value.pillar_scores();
        Self {
            key: value.key.clone(),
            label: display_label(&value.key),
            score: scope_score(&scores, None),
            pillars: pillar_views(&scores),
            indicator_count: value.indicators.len(),
            measured_count: value
                .indicators
                .iter()
                .filter(|indicator| indicator.is_measured())
                .count(),
            indicators: value.indicators.clone(),
        }
    }
}

/// Everything known about one country, either now or as of a past year.
#[derive(Debug, Clone, Serialize)]
pub struct CountryProfileView {
    pub alpha3: String,
    pub name: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub score: Option<f64>,
    pub pillars: Vec<PillarScoreView>,
    pub industries: Vec<IndustryProfileView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_industries: Vec<&'static str>,
}

impl CountryProfileView {
    fn build(
        record: &CountryRecord,
        year: Option<i32>,
        scores: &PillarScores,
        industries: &BTreeMap<String, IndustryRecord>,
    ) -> Self {
        Self {
            alpha3: record.alpha3.clone(),
            name: record.name.clone(),
            region: record.region.clone(),
            year,
            score: scope_score(scores, None),
            pillars: pillar_views(scores),
            industries: industries.values().map(IndustryProfileView::from).collect(),
            missing_industries: missing_industries(industries),
        }
    }

    /// Profile scored from `historical`. Without a record for the year every
    /// pillar is unscored and no industries are listed.
    pub fn for_year(
        record: &CountryRecord,
        year: i32,
        historical: Option<&HistoricalRecord>,
    ) -> Self {
        match historical {
            Some(historical) => Self::build(
                record,
                Some(year),
                &historical.scores,
                &historical.industries,
            ),
            None => Self::build(record, Some(year), &PillarScores::empty(), &BTreeMap::new()),
        }
    }
}

impl From<&CountryRecord> for CountryProfileView {
    fn from(value: &CountryRecord) -> Self {
        Self::build(value, None, &value.scores, &value.industries)
    }
}
