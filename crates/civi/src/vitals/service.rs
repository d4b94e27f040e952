use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::comparison::{compare_countries, ComparisonEntry};
use super::domain::{Selection, Timeframe};
use super::series::{build_chart, ChartData};
use super::store::IndicatorStore;
use super::views::{CountryProfileView, CountrySummaryView};

#[derive(Debug, Clone, Deserialize)]
pub struct SeriesRequest {
    pub selections: Vec<Selection>,
    #[serde(default)]
    pub timeframe: Option<Timeframe>,
}

#[derive(Debug, thiserror::Error)]
pub enum VitalsServiceError {
    #[error("country '{0}' not found")]
    UnknownCountry(String),
    #[error("timeframe start {start_year} is after end {end_year}")]
    InvalidTimeframe { start_year: i32, end_year: i32 },
}

/// Read-only queries over one immutable indicator snapshot.
pub struct VitalsService {
    store: Arc<IndicatorStore>,
    default_timeframe: Timeframe,
}

impl VitalsService {
    pub fn new(store: Arc<IndicatorStore>, default_timeframe: Timeframe) -> Self {
        Self {
            store,
            default_timeframe,
        }
    }

    pub fn store(&self) -> &IndicatorStore {
        &self.store
    }

    pub fn default_timeframe(&self) -> Timeframe {
        self.default_timeframe
    }

    /// Current summaries, or summaries scored as of `year` when given.
    pub fn summaries(&self, year: Option<i32>) -> Vec<CountrySummaryView> {
        self.store
            .countries()
            .map(|record| match year {
                None => CountrySummaryView::from(record),
                Some(year) => CountrySummaryView::for_year(
                    record,
                    year,
                    self.store.record_for_year(&record.alpha3, year),
                ),
            })
            .collect()
    }

    /// An unknown country is an error; a known country without a record for
    /// `year` yields an unscored profile.
    pub fn profile(
        &self,
        alpha3: &str,
        year: Option<i32>,
    ) -> Result<CountryProfileView, VitalsServiceError> {
        let record = self
            .store
            .country(alpha3)
            .ok_or_else(|| VitalsServiceError::UnknownCountry(alpha3.to_ascii_uppercase()))?;

        Ok(match year {
            None => CountryProfileView::from(record),
            Some(year) => {
                let historical = self.store.record_for_year(&record.alpha3, year);
                if historical.is_none() {
                    debug!(country = %record.alpha3, year, "no historical record for profile year");
                }
                CountryProfileView::for_year(record, year, historical)
            }
        })
    }

    pub fn comparison(
        &self,
        industry: Option<&str>,
        pillar: Option<&str>,
        year: Option<i32>,
    ) -> Vec<ComparisonEntry> {
        let industry = industry.map(str::trim).filter(|value| !value.is_empty());
        let pillar = pillar.map(str::trim).filter(|value| !value.is_empty());
        debug!(?industry, ?pillar, ?year, "ranking countries");
        compare_countries(&self.store, industry, pillar, year)
    }

    pub fn chart(&self, request: &SeriesRequest) -> Result<ChartData, VitalsServiceError> {
        let timeframe = request.timeframe.unwrap_or(self.default_timeframe);
        if !timeframe.is_valid() {
            return Err(VitalsServiceError::InvalidTimeframe {
                start_year: timeframe.start_year,
                end_year: timeframe.end_year,
            });
        }

        debug!(
            selections = request.selections.len(),
            start_year = timeframe.start_year,
            end_year = timeframe.end_year,
            "building chart"
        );
        Ok(build_chart(
            self.store.as_ref(),
            &request.selections,
            timeframe,
        ))
    }
}
