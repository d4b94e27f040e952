use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use civi::case_studies::{case_study_router, CaseStudyIndex};
use civi::error::AppError;
use civi::vitals::{
    assemble_indicators, normalize_observations, parse_catalog, parse_observations,
    score_indicator_set, vitals_router, MetricCatalog, NormalizationLogEntry, PillarScores,
    VitalsService,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct NormalizeRequest {
    pub(crate) raw_csv: String,
    pub(crate) catalog_csv: String,
    pub(crate) year: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct NormalizeResponse {
    pub(crate) year: i32,
    pub(crate) normalized: usize,
    pub(crate) log: Vec<NormalizationLogEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) skipped_metrics: Vec<String>,
    pub(crate) scores: BTreeMap<String, BTreeMap<String, PillarScores>>,
}

pub(crate) fn with_service_routes(
    vitals: Arc<VitalsService>,
    case_studies: Arc<CaseStudyIndex>,
) -> axum::Router {
    vitals_router(vitals)
        .merge(case_study_router(case_studies))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/normalize",
            axum::routing::post(normalize_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Runs an ad-hoc raw export through normalization and scoring without
/// touching the loaded snapshot.
pub(crate) async fn normalize_endpoint(
    Json(payload): Json<NormalizeRequest>,
) -> Result<Json<NormalizeResponse>, AppError> {
    let NormalizeRequest {
        raw_csv,
        catalog_csv,
        year,
    } = payload;

    let observations = parse_observations(Cursor::new(raw_csv.into_bytes()))?;
    let catalog = MetricCatalog::new(parse_catalog(Cursor::new(catalog_csv.into_bytes()))?);
    let run = normalize_observations(&observations, |metric| catalog.directionality(metric));
    let scores = score_indicator_set(&assemble_indicators(&catalog, &run.observations, year));

    Ok(Json(NormalizeResponse {
        year,
        normalized: run.observations.len(),
        log: run.log,
        skipped_metrics: run.skipped_metrics,
        scores,
    }))
}
