use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::service::{SeriesRequest, VitalsService, VitalsServiceError};

/// Country, comparison, and series endpoints over the loaded snapshot.
pub fn vitals_router(service: Arc<VitalsService>) -> Router {
    Router::new()
        .route("/api/v1/countries", get(countries_handler))
        .route("/api/v1/countries/:alpha3", get(profile_handler))
        .route("/api/v1/comparison", get(comparison_handler))
        .route("/api/v1/series", post(series_handler))
        .with_state(service)
}

/// `?year=` selects a historical record instead of the current snapshot.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct YearQuery {
    #[serde(default)]
    year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ComparisonQuery {
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    pillar: Option<String>,
    #[serde(default)]
    year: Option<i32>,
}

pub(crate) async fn countries_handler(
    State(service): State<Arc<VitalsService>>,
    Query(query): Query<YearQuery>,
) -> Response {
    (StatusCode::OK, axum::Json(service.summaries(query.year))).into_response()
}

pub(crate) async fn profile_handler(
    State(service): State<Arc<VitalsService>>,
    Path(alpha3): Path<String>,
    Query(query): Query<YearQuery>,
) -> Response {
    match service.profile(&alpha3, query.year) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn comparison_handler(
    State(service): State<Arc<VitalsService>>,
    Query(query): Query<ComparisonQuery>,
) -> Response {
    let ranking = service.comparison(
        query.industry.as_deref(),
        query.pillar.as_deref(),
        query.year,
    );
    (StatusCode::OK, axum::Json(ranking)).into_response()
}

pub(crate) async fn series_handler(
    State(service): State<Arc<VitalsService>>,
    axum::Json(request): axum::Json<SeriesRequest>,
) -> Response {
    match service.chart(&request) {
        Ok(chart) => (StatusCode::OK, axum::Json(chart)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: VitalsServiceError) -> Response {
    let status = match error {
        VitalsServiceError::UnknownCountry(_) => StatusCode::NOT_FOUND,
        VitalsServiceError::InvalidTimeframe { .. } => StatusCode::BAD_REQUEST,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
