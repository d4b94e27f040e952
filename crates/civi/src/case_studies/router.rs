use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::index::CaseStudyIndex;
use super::query::StudyFilters;

/// Case-study query, tag, and article endpoints.
pub fn case_study_router(index: Arc<CaseStudyIndex>) -> Router {
    Router::new()
        .route("/api/v1/case-studies/query", post(query_handler))
        .route("/api/v1/case-studies/tags", get(tags_handler))
        .route("/api/v1/case-studies/:slug", get(article_handler))
        .with_state(index)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudyQueryRequest {
    #[serde(flatten)]
    filters: StudyFilters,
    #[serde(default)]
    page: Option<usize>,
}

impl StudyQueryRequest {
    /// Missing or zero pages read as the first page.
    fn page(&self) -> usize {
        self.page.filter(|page| *page > 0).unwrap_or(1)
    }
}

pub(crate) async fn query_handler(
    State(index): State<Arc<CaseStudyIndex>>,
    axum::Json(request): axum::Json<StudyQueryRequest>,
) -> Response {
    let page = request.page();
    debug!(page, filters = ?request.filters, "querying case studies");
    let result = index.query(&request.filters, page);
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn tags_handler(State(index): State<Arc<CaseStudyIndex>>) -> Response {
    (StatusCode::OK, axum::Json(index.available_tags().clone())).into_response()
}

pub(crate) async fn article_handler(
    State(index): State<Arc<CaseStudyIndex>>,
    Path(slug): Path<String>,
) -> Response {
    match index.article(&slug) {
        Some(article) => (StatusCode::OK, axum::Json(article.clone())).into_response(),
        None => {
            let payload = json!({
                "error": format!("case study '{slug}' not found"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}
