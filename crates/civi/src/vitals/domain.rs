use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The four evaluation dimensions every score is broken down into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Autonomy,
    Resilience,
    Sustainability,
    Effectiveness,
}

impl Pillar {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Autonomy,
            Self::Resilience,
            Self::Sustainability,
            Self::Effectiveness,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Autonomy => "autonomy",
            Self::Resilience => "resilience",
            Self::Sustainability => "sustainability",
            Self::Effectiveness => "effectiveness",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Autonomy => "Autonomy",
            Self::Resilience => "Resilience",
            Self::Sustainability => "Sustainability",
            Self::Effectiveness => "Effectiveness",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Autonomy => 0,
            Self::Resilience => 1,
            Self::Sustainability => 2,
            Self::Effectiveness => 3,
        }
    }

    /// Case-insensitive lookup; `None` for anything outside the four pillars.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ordered()
            .into_iter()
            .find(|pillar| pillar.key().eq_ignore_ascii_case(trimmed))
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Infrastructure sectors the index expects every country document to cover.
pub const INDUSTRIES: [&str; 11] = [
    "communications",
    "defence",
    "energy",
    "finance",
    "food_agriculture",
    "healthcare",
    "transport",
    "water",
    "waste_management",
    "emergency_services",
    "information_technology",
];

pub fn is_known_industry(key: &str) -> bool {
    INDUSTRIES.contains(&key)
}

/// Known industries with no entry in `industries`, in canonical order.
pub fn missing_industries<V>(industries: &BTreeMap<String, V>) -> Vec<&'static str> {
    INDUSTRIES
        .iter()
        .copied()
        .filter(|key| !industries.contains_key(*key))
        .collect()
}

/// A single measured value feeding one pillar of one industry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub key: String,
    #[serde(default)]
    pub description: String,
    pub pillar: Pillar,
    #[serde(default)]
    pub value: Option<f64>,
    pub weight: f64,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub year: Option<i32>,
}

impl Indicator {
    pub fn is_measured(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PillarScore {
    pub pillar: Pillar,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl PillarScore {
    pub const fn empty(pillar: Pillar) -> Self {
        Self {
            pillar,
            score: None,
            confidence: None,
        }
    }

    pub fn error_margin(&self) -> Option<f64> {
        super::aggregate::error_margin(self.confidence, self.score)
    }
}

/// One score per pillar, always in [`Pillar::ordered`] order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PillarScore>", into = "Vec<PillarScore>")]
pub struct PillarScores([PillarScore; 4]);

impl PillarScores {
    pub fn empty() -> Self {
        Self(Pillar::ordered().map(PillarScore::empty))
    }

    pub fn get(&self, pillar: Pillar) -> &PillarScore {
        &self.0[pillar.index()]
    }

    pub fn set(&mut self, score: PillarScore) {
        self.0[score.pillar.index()] = score;
    }

    pub fn iter(&self) -> impl Iterator<Item = &PillarScore> {
        self.0.iter()
    }
}

impl Default for PillarScores {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<PillarScore> for PillarScores {
    fn from_iter<T: IntoIterator<Item = PillarScore>>(iter: T) -> Self {
        let mut scores = Self::empty();
        for score in iter {
            scores.set(score);
        }
        scores
    }
}

impl TryFrom<Vec<PillarScore>> for PillarScores {
    type Error = String;

    fn try_from(value: Vec<PillarScore>) -> Result<Self, Self::Error> {
        let mut seen = [false; 4];
        let mut scores = Self::empty();
        for score in value {
            let slot = score.pillar.index();
            if seen[slot] {
                return Err(format!("pillar '{}' listed more than once", score.pillar));
            }
            seen[slot] = true;
            scores.set(score);
        }
        Ok(scores)
    }
}

impl From<PillarScores> for Vec<PillarScore> {
    fn from(value: PillarScores) -> Self {
        value.0.to_vec()
    }
}

/// Indicators and upstream pillar scores for one (country, industry).
#[derive(Debug, Clone, PartialEq)]
pub struct IndustryRecord {
    pub key: String,
    pub indicators: Vec<Indicator>,
    pub scores: PillarScores,
}

impl IndustryRecord {
    /// Recomputes the pillar from its indicators when the record carries any;
    /// records without indicators (historical snapshots) keep the supplied score.
    /// Confidence always comes from the supplied score.
    pub fn pillar_score(&self, pillar: Pillar) -> PillarScore {
        let supplied = self.scores.get(pillar);
        if self.indicators.is_empty() {
            return *supplied;
        }

        super::aggregate::aggregate_pillar(
            pillar,
            self.indicators
                .iter()
                .filter(|indicator| indicator.pillar == pillar),
            supplied.confidence,
        )
    }

    pub fn pillar_scores(&self) -> PillarScores {
        Pillar::ordered()
            .into_iter()
            .map(|pillar| self.pillar_score(pillar))
            .collect()
    }

    pub fn indicators_for(&self, pillar: Pillar) -> impl Iterator<Item = &Indicator> {
        self.indicators
            .iter()
            .filter(move |indicator| indicator.pillar == pillar)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryRecord {
    pub alpha3: String,
    pub name: String,
    pub region: String,
    pub scores: PillarScores,
    pub industries: BTreeMap<String, IndustryRecord>,
}

impl CountryRecord {
    pub fn missing_industries(&self) -> Vec<&'static str> {
        missing_industries(&self.industries)
    }
}

/// One year of a country's history; same shape as [`CountryRecord`] minus metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRecord {
    pub year: i32,
    pub scores: PillarScores,
    pub industries: BTreeMap<String, IndustryRecord>,
}

/// Chronological, duplicate-free history for one country.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryHistory {
    pub(crate) alpha3: String,
    pub(crate) records: Vec<HistoricalRecord>,
}

impl CountryHistory {
    pub fn alpha3(&self) -> &str {
        &self.alpha3
    }

    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    /// The record for exactly `year`, if one was loaded.
    pub fn record(&self, year: i32) -> Option<&HistoricalRecord> {
        self.records
            .binary_search_by_key(&year, |record| record.year)
            .ok()
            .map(|index| &self.records[index])
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.records.iter().map(|record| record.year)
    }

    pub fn within(&self, timeframe: Timeframe) -> impl Iterator<Item = &HistoricalRecord> {
        self.records
            .iter()
            .filter(move |record| timeframe.contains(record.year))
    }
}

/// Inclusive year range for historical queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeframe {
    pub start_year: i32,
    pub end_year: i32,
}

impl Timeframe {
    pub const fn new(start_year: i32, end_year: i32) -> Self {
        Self {
            start_year,
            end_year,
        }
    }

    pub const fn is_valid(&self) -> bool {
        self.start_year <= self.end_year
    }

    pub const fn contains(&self, year: i32) -> bool {
        year >= self.start_year && year <= self.end_year
    }
}

/// A charted line: country plus optional industry and pillar drill-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub country: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub pillar: Option<String>,
    #[serde(default)]
    pub color: String,
}

impl Selection {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            industry: None,
            pillar: None,
            color: String::new(),
        }
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn with_pillar(mut self, pillar: impl Into<String>) -> Self {
        self.pillar = Some(pillar.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Blank strings mean "overall", the same as an absent field.
    pub fn industry(&self) -> Option<&str> {
        self.industry
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn pillar(&self) -> Option<&str> {
        self.pillar
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}
