use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use civi::case_studies::{
    case_study_router, CaseStudyArticle, CaseStudyDocument, CaseStudyIndex, StudyFilters, TagSet,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn study(index: usize) -> CaseStudyDocument {
    let country = if index % 2 == 0 { "USA" } else { "GBR" };
    CaseStudyDocument {
        slug: format!("study-{index:02}"),
        title: format!("Grid resilience review {index}"),
        author: "Analyst".to_string(),
        date: format!("2023-01-{:02}", index + 1),
        thumbnail: String::new(),
        tags: TagSet {
            countries: vec![country.to_string()],
            industries: vec!["energy".to_string()],
            pillars: vec!["resilience".to_string()],
        },
    }
}

fn index() -> CaseStudyIndex {
    let mut studies: Vec<CaseStudyDocument> = (0..20).map(study).collect();
    studies.push(CaseStudyDocument {
        slug: "water-audit".to_string(),
        title: "Water Audit".to_string(),
        author: "Analyst".to_string(),
        date: "2022-06-30".to_string(),
        thumbnail: String::new(),
        tags: TagSet {
            countries: vec!["JPN".to_string()],
            industries: vec!["water".to_string()],
            pillars: Vec::new(),
        },
    });

    let article = CaseStudyArticle {
        document: studies[20].clone(),
        content: "# Findings".to_string(),
    };
    CaseStudyIndex::from_documents(studies)
        .expect("unique slugs")
        .with_articles(vec![article])
}

async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

async fn post_query(payload: Value) -> Response {
    case_study_router(Arc::new(index()))
        .oneshot(
            Request::post("/api/v1/case-studies/query")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

#[test]
fn twenty_matches_split_into_three_pages() {
    let index = index();
    let filters = StudyFilters {
        industries: vec!["energy".to_string()],
        ..StudyFilters::default()
    };

    let third = index.query(&filters, 3);
    assert_eq!(third.total_matches, 20);
    assert_eq!(third.total_pages, 3);
    assert_eq!(third.paginated_studies.len(), 2);
    assert!(index.query(&filters, 4).paginated_studies.is_empty());
}

#[test]
fn facets_combine_with_search() {
    let index = index();
    let filters = StudyFilters {
        search: "REVIEW grid".to_string(),
        countries: vec!["GBR".to_string(), "FRA".to_string()],
        ..StudyFilters::default()
    };

    let page = index.query(&filters, 1);
    assert_eq!(page.total_matches, 10);
    assert!(page
        .paginated_studies
        .iter()
        .all(|study| study.tags.countries == vec!["GBR".to_string()]));
    assert_eq!(page.paginated_studies[0].slug, "study-19");
}

#[tokio::test]
async fn query_route_defaults_to_first_page() {
    let response = post_query(json!({"countries": ["JPN"]})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["paginated_studies"][0]["slug"], "water-audit");
}

#[tokio::test]
async fn query_route_returns_empty_page_past_the_end() {
    let response = post_query(json!({"search": "", "pillars": ["resilience"], "page": 7})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["paginated_studies"], json!([]));
}

#[tokio::test]
async fn tags_route_lists_sorted_facets() {
    let response = case_study_router(Arc::new(index()))
        .oneshot(
            Request::get("/api/v1/case-studies/tags")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["countries"], json!(["GBR", "JPN", "USA"]));
    assert_eq!(body["industries"], json!(["energy", "water"]));
    assert_eq!(body["pillars"], json!(["resilience"]));
}

#[tokio::test]
async fn article_route_serves_content_or_not_found() {
    let router = case_study_router(Arc::new(index()));

    let found = router
        .clone()
        .oneshot(
            Request::get("/api/v1/case-studies/water-audit")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(found.status(), StatusCode::OK);
    let body = read_json_body(found).await;
    assert_eq!(body["title"], "Water Audit");
    assert_eq!(body["content"], "# Findings");

    let missing = router
        .oneshot(
            Request::get("/api/v1/case-studies/study-01")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
