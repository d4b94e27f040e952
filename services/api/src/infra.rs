use civi::case_studies::CaseStudyIndex;
use civi::error::AppError;
use civi::vitals::{IndicatorStore, SnapshotLoader};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Everything read from the data directory at startup.
pub(crate) struct LoadedData {
    pub(crate) store: IndicatorStore,
    pub(crate) case_studies: CaseStudyIndex,
}

pub(crate) fn load_data(root: &Path) -> Result<LoadedData, AppError> {
    let store = SnapshotLoader::from_dir(root)?;
    let case_studies = CaseStudyIndex::from_dir(root)?;
    Ok(LoadedData {
        store,
        case_studies,
    })
}

pub(crate) fn parse_year(raw: &str) -> Result<i32, String> {
    raw.trim()
        .parse::<i32>()
        .map_err(|err| format!("failed to parse '{raw}' as a year ({err})"))
}
