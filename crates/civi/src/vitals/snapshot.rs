use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use super::domain::{
    CountryHistory, CountryRecord, HistoricalRecord, Indicator, IndustryRecord, PillarScores,
};
use super::store::{IndicatorStore, SnapshotError};

pub const COUNTRIES_DIR: &str = "countries";
pub const HISTORICAL_DIR: &str = "historical";

#[derive(Debug, Deserialize)]
struct CountryDocument {
    #[serde(default)]
    alpha3: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    scores: PillarScores,
    #[serde(default)]
    industries: BTreeMap<String, IndustryDocument>,
}

#[derive(Debug, Default, Deserialize)]
struct IndustryDocument {
    #[serde(default)]
    scores: PillarScores,
    #[serde(default)]
    indicators: Vec<Indicator>,
}

/// Object form of a history file: an optional start year for records that
/// omit their own. A bare JSON array of records is accepted too.
#[derive(Debug, Deserialize)]
struct WrappedHistory {
    #[serde(default)]
    start_year: Option<i32>,
    #[serde(alias = "historical_scores")]
    records: Vec<HistoricalDocument>,
}

#[derive(Debug, Deserialize)]
struct HistoricalDocument {
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    scores: PillarScores,
    #[serde(default)]
    industries: BTreeMap<String, IndustryDocument>,
}

fn into_industries(documents: BTreeMap<String, IndustryDocument>) -> BTreeMap<String, IndustryRecord> {
    documents
        .into_iter()
        .map(|(key, document)| {
            let record = IndustryRecord {
                key: key.clone(),
                indicators: document.indicators,
                scores: document.scores,
            };
            (key, record)
        })
        .collect()
}

/// Reads country and history documents into an [`IndicatorStore`].
pub struct SnapshotLoader;

impl SnapshotLoader {
    /// Loads `countries/*.json` and `historical/*.json` under `root`.
    /// A missing directory leaves that half of the store empty.
    pub fn from_dir<P: AsRef<Path>>(root: P) -> Result<IndicatorStore, SnapshotError> {
        let root = root.as_ref();
        let mut store = IndicatorStore::new();

        for (alpha3, path) in json_documents(&root.join(COUNTRIES_DIR))? {
            let file = open(&path)?;
            let record = Self::country_from_reader(&alpha3, file)?;
            store.insert_country(record)?;
        }

        for (alpha3, path) in json_documents(&root.join(HISTORICAL_DIR))? {
            let file = open(&path)?;
            let history = Self::history_from_reader(&alpha3, file)?;
            store.insert_history(history)?;
        }

        info!(
            countries = store.len(),
            histories = store.history_count(),
            root = %root.display(),
            "indicator snapshot loaded"
        );
        Ok(store)
    }

    /// `fallback_alpha3` names the country when the document does not.
    pub fn country_from_reader<R: Read>(
        fallback_alpha3: &str,
        reader: R,
    ) -> Result<CountryRecord, SnapshotError> {
        let document: CountryDocument =
            serde_json::from_reader(reader).map_err(|source| SnapshotError::Json {
                document: format!("country {fallback_alpha3}"),
                source,
            })?;

        let alpha3 = document
            .alpha3
            .unwrap_or_else(|| fallback_alpha3.to_string())
            .to_ascii_uppercase();
        let record = CountryRecord {
            name: document.name.unwrap_or_else(|| alpha3.clone()),
            region: document.region.unwrap_or_else(|| "Unknown".to_string()),
            scores: document.scores,
            industries: into_industries(document.industries),
            alpha3,
        };

        let missing = record.missing_industries();
        if !missing.is_empty() {
            warn!(country = %record.alpha3, missing = ?missing, "country document lacks industries");
        }
        Ok(record)
    }

    /// Explicit `year` fields win; `start_year + index` is only used for
    /// records that carry no year of their own.
    pub fn history_from_reader<R: Read>(
        alpha3: &str,
        reader: R,
    ) -> Result<CountryHistory, SnapshotError> {
        let json_error = |source| SnapshotError::Json {
            document: format!("history {alpha3}"),
            source,
        };
        let value: serde_json::Value = serde_json::from_reader(reader).map_err(json_error)?;

        // Decode against the shape the document actually has so errors name
        // the offending field.
        let (start_year, documents) = if value.is_array() {
            let records: Vec<HistoricalDocument> =
                serde_json::from_value(value).map_err(json_error)?;
            (None, records)
        } else {
            let wrapped: WrappedHistory = serde_json::from_value(value).map_err(json_error)?;
            (wrapped.start_year, wrapped.records)
        };

        let mut records = Vec::with_capacity(documents.len());
        for (index, document) in documents.into_iter().enumerate() {
            let year = match (document.year, start_year) {
                (Some(year), _) => year,
                (None, Some(start)) => {
                    debug!(country = %alpha3, index, "inferring history year from position");
                    i32::try_from(index)
                        .ok()
                        .and_then(|offset| start.checked_add(offset))
                        .ok_or_else(|| SnapshotError::YearOutOfRange {
                            country: alpha3.to_ascii_uppercase(),
                            start_year: start,
                            index,
                        })?
                }
                (None, None) => {
                    return Err(SnapshotError::MissingYear {
                        country: alpha3.to_ascii_uppercase(),
                        index,
                    })
                }
            };
            records.push(HistoricalRecord {
                year,
                scores: document.scores,
                industries: into_industries(document.industries),
            });
        }

        CountryHistory::new(alpha3, records)
    }
}

fn open(path: &Path) -> Result<fs::File, SnapshotError> {
    fs::File::open(path).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// `(upper-cased file stem, path)` for each `*.json` file, sorted by path.
fn json_documents(dir: &Path) -> Result<Vec<(String, std::path::PathBuf)>, SnapshotError> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "snapshot directory missing; treating as empty");
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|source| SnapshotError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let mut documents = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SnapshotError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            documents.push((stem.to_ascii_uppercase(), path.clone()));
        }
    }
    documents.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(documents)
}
