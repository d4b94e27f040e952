use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;
use std::path::Path;

use super::normalize::Directionality;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidWeight { metric_id: String, weight: f64 },
    InvalidValue { metric_id: String, value: String },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read metric export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid metric CSV data: {}", err),
            ImportError::InvalidWeight { metric_id, weight } => write!(
                f,
                "metric '{}' has weight {}; weights must be positive",
                metric_id, weight
            ),
            ImportError::InvalidValue { metric_id, value } => {
                write!(f, "metric '{}' has non-numeric value '{}'", metric_id, value)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::InvalidWeight { .. } | ImportError::InvalidValue { .. } => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// One row of the raw metric export. `metric_value` is `None` when the
/// source had no measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawObservation {
    pub country_code: String,
    pub year: i32,
    pub metric_id: String,
    pub metric_value: Option<f64>,
    pub source: String,
}

/// Catalog entry mapping a metric onto an (industry, pillar) slot.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDefinition {
    pub metric_id: String,
    pub name: String,
    pub description: String,
    pub industry: String,
    pub pillar: String,
    pub weight: f64,
    pub directionality: Directionality,
    pub source: String,
    pub units: String,
}

pub fn parse_observations<R: Read>(reader: R) -> Result<Vec<RawObservation>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut observations = Vec::new();

    for record in csv_reader.deserialize::<ObservationRow>() {
        let row = record?;
        let metric_value = match row.metric_value.as_deref() {
            Some(raw) => Some(raw.parse::<f64>().ok().filter(|value| value.is_finite()).ok_or_else(
                || ImportError::InvalidValue {
                    metric_id: row.metric_id.clone(),
                    value: raw.to_string(),
                },
            )?),
            None => None,
        };

        observations.push(RawObservation {
            country_code: row.country_code.to_ascii_uppercase(),
            year: row.year,
            metric_id: row.metric_id,
            metric_value,
            source: row.source.unwrap_or_default(),
        });
    }

    Ok(observations)
}

pub fn parse_observations_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawObservation>, ImportError> {
    let file = std::fs::File::open(path)?;
    parse_observations(file)
}

pub fn parse_catalog<R: Read>(reader: R) -> Result<Vec<MetricDefinition>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut definitions = Vec::new();

    for record in csv_reader.deserialize::<CatalogRow>() {
        let row = record?;
        let weight = row.weight.unwrap_or(1.0);
        if !weight.is_finite() || weight <= 0.0 {
            return Err(ImportError::InvalidWeight {
                metric_id: row.metric_id,
                weight,
            });
        }

        definitions.push(MetricDefinition {
            name: row.name.unwrap_or_else(|| row.metric_id.clone()),
            description: row.description.unwrap_or_default(),
            industry: row.industry.to_ascii_lowercase(),
            pillar: row.pillar,
            weight,
            directionality: row
                .directionality
                .as_deref()
                .map(Directionality::parse)
                .unwrap_or_default(),
            source: row.source.unwrap_or_default(),
            units: row.units.unwrap_or_default(),
            metric_id: row.metric_id,
        });
    }

    Ok(definitions)
}

pub fn parse_catalog_path<P: AsRef<Path>>(path: P) -> Result<Vec<MetricDefinition>, ImportError> {
    let file = std::fs::File::open(path)?;
    parse_catalog(file)
}

#[derive(Debug, Deserialize)]
struct ObservationRow {
    country_code: String,
    year: i32,
    metric_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    metric_value: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    metric_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    industry: String,
    pillar: String,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    directionality: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    source: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    units: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn empty_metric_value_means_not_measured() {
        let csv = "country_code,year,metric_id,metric_value,source\n\
                   usa,2020,grid_uptime,97.5,EIA\n\
                   GBR,2020,grid_uptime,,\n";

        let rows = parse_observations(Cursor::new(csv)).expect("csv parses");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].country_code, "USA");
        assert_eq!(rows[0].metric_value, Some(97.5));
        assert_eq!(rows[1].metric_value, None);
        assert_eq!(rows[1].source, "");
    }

    #[test]
    fn garbage_metric_value_is_reported() {
        let csv = "country_code,year,metric_id,metric_value,source\nUSA,2020,grid_uptime,n/a,EIA\n";

        let err = parse_observations(Cursor::new(csv)).expect_err("non-numeric rejected");
        assert!(matches!(err, ImportError::InvalidValue { .. }));
    }

    #[test]
    fn catalog_defaults_weight_and_direction() {
        let csv = "metric_id,name,description,industry,pillar,weight,directionality,source,units\n\
                   outage_hours,Outage hours,,Energy,resilience,,NEG,EIA,hours\n\
                   grid_uptime,,,energy,resilience,2,,,\n";

        let catalog = parse_catalog(Cursor::new(csv)).expect("catalog parses");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].industry, "energy");
        assert_eq!(catalog[0].weight, 1.0);
        assert_eq!(catalog[0].directionality, Directionality::Negative);
        assert_eq!(catalog[1].name, "grid_uptime");
        assert_eq!(catalog[1].weight, 2.0);
        assert_eq!(catalog[1].directionality, Directionality::Positive);
    }

    #[test]
    fn catalog_rejects_zero_weight() {
        let csv = "metric_id,name,description,industry,pillar,weight,directionality,source,units\n\
                   grid_uptime,,,energy,resilience,0,,,\n";

        let err = parse_catalog(Cursor::new(csv)).expect_err("zero weight rejected");
        assert!(matches!(err, ImportError::InvalidWeight { weight, .. } if weight == 0.0));
    }
}
