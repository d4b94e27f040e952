use std::collections::BTreeMap;

use super::domain::{CountryHistory, CountryRecord, HistoricalRecord, Indicator, PillarScores};
use super::series::HistorySource;

/// Rejections raised while data enters the store. Once ingested, the
/// aggregators assume every indicator and score is well formed.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid JSON in {document}: {source}")]
    Json {
        document: String,
        source: serde_json::Error,
    },
    #[error("indicator '{key}' for {country}/{industry}: {reason}")]
    MalformedIndicator {
        country: String,
        industry: String,
        key: String,
        reason: &'static str,
    },
    #[error("{pillar} score for {country} ({scope}): {reason}")]
    MalformedScore {
        country: String,
        scope: String,
        pillar: &'static str,
        reason: &'static str,
    },
    #[error("country {0} loaded more than once")]
    DuplicateCountry(String),
    #[error("history for {country} repeats year {year}")]
    DuplicateYear { country: String, year: i32 },
    #[error("history for {country} lists {year} after {previous}")]
    OutOfOrderYear {
        country: String,
        year: i32,
        previous: i32,
    },
    #[error("history record {index} for {country} has no year and no start year to infer one")]
    MissingYear { country: String, index: usize },
    #[error("history record {index} for {country} falls outside the year range when counted from {start_year}")]
    YearOutOfRange {
        country: String,
        start_year: i32,
        index: usize,
    },
}

/// In-memory snapshot of every country document and history.
#[derive(Debug, Clone, Default)]
pub struct IndicatorStore {
    countries: BTreeMap<String, CountryRecord>,
    histories: BTreeMap<String, CountryHistory>,
}

impl IndicatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_country(&mut self, record: CountryRecord) -> Result<(), SnapshotError> {
        let alpha3 = record.alpha3.to_ascii_uppercase();
        if self.countries.contains_key(&alpha3) {
            return Err(SnapshotError::DuplicateCountry(alpha3));
        }

        validate_scores(&alpha3, "overall", &record.scores)?;
        for (industry, entry) in &record.industries {
            validate_scores(&alpha3, industry, &entry.scores)?;
            for indicator in &entry.indicators {
                validate_indicator(&alpha3, industry, indicator)?;
            }
        }

        self.countries.insert(alpha3, record);
        Ok(())
    }

    pub fn insert_history(&mut self, history: CountryHistory) -> Result<(), SnapshotError> {
        let alpha3 = history.alpha3.to_ascii_uppercase();
        for record in &history.records {
            let scope = record.year.to_string();
            validate_scores(&alpha3, &scope, &record.scores)?;
            for (industry, entry) in &record.industries {
                validate_scores(&alpha3, &format!("{scope} {industry}"), &entry.scores)?;
                for indicator in &entry.indicators {
                    validate_indicator(&alpha3, industry, indicator)?;
                }
            }
        }

        self.histories.insert(alpha3, history);
        Ok(())
    }

    pub fn country(&self, alpha3: &str) -> Option<&CountryRecord> {
        self.countries.get(&alpha3.trim().to_ascii_uppercase())
    }

    /// One country's historical record for `year`; `None` when either the
    /// history or that year is absent.
    pub fn record_for_year(&self, alpha3: &str, year: i32) -> Option<&HistoricalRecord> {
        self.history(alpha3)
            .and_then(|history| history.record(year))
    }

    pub fn countries(&self) -> impl Iterator<Item = &CountryRecord> {
        self.countries.values()
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn history_count(&self) -> usize {
        self.histories.len()
    }
}

impl HistorySource for IndicatorStore {
    fn history(&self, alpha3: &str) -> Option<&CountryHistory> {
        self.histories.get(&alpha3.trim().to_ascii_uppercase())
    }

    fn display_name(&self, alpha3: &str) -> String {
        self.country(alpha3)
            .map(|record| record.name.clone())
            .unwrap_or_else(|| alpha3.to_string())
    }
}

impl CountryHistory {
    /// Builds a history from records already in chronological order.
    pub fn new(
        alpha3: impl Into<String>,
        records: Vec<HistoricalRecord>,
    ) -> Result<Self, SnapshotError> {
        let alpha3 = alpha3.into().to_ascii_uppercase();
        let mut previous: Option<i32> = None;
        for record in &records {
            if let Some(previous) = previous {
                if record.year == previous {
                    return Err(SnapshotError::DuplicateYear {
                        country: alpha3,
                        year: record.year,
                    });
                }
                if record.year < previous {
                    return Err(SnapshotError::OutOfOrderYear {
                        country: alpha3,
                        year: record.year,
                        previous,
                    });
                }
            }
            previous = Some(record.year);
        }

        Ok(Self { alpha3, records })
    }
}

fn validate_indicator(
    country: &str,
    industry: &str,
    indicator: &Indicator,
) -> Result<(), SnapshotError> {
    let reason = if !indicator.weight.is_finite() {
        Some("weight must be finite")
    } else if indicator.weight <= 0.0 {
        Some("weight must be positive")
    } else if indicator.value.is_some_and(|value| !value.is_finite()) {
        Some("value must be finite")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(SnapshotError::MalformedIndicator {
            country: country.to_string(),
            industry: industry.to_string(),
            key: indicator.key.clone(),
            reason,
        }),
        None => Ok(()),
    }
}

fn validate_scores(country: &str, scope: &str, scores: &PillarScores) -> Result<(), SnapshotError> {
    for entry in scores.iter() {
        let reason = if entry.score.is_some_and(|score| !(0.0..=100.0).contains(&score)) {
            Some("score must lie within 0..=100")
        } else if entry
            .confidence
            .is_some_and(|confidence| !(0.0..=1.0).contains(&confidence))
        {
            Some("confidence must lie within 0..=1")
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(SnapshotError::MalformedScore {
                country: country.to_string(),
                scope: scope.to_string(),
                pillar: entry.pillar.key(),
                reason,
            });
        }
    }
    Ok(())
}
