use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::vitals::{
    vitals_router, CountryHistory, CountryRecord, HistoricalRecord, Indicator, IndicatorStore,
    IndustryRecord, Pillar, PillarScore, PillarScores, Timeframe, VitalsService,
};

pub(super) fn indicator(key: &str, pillar: Pillar, value: Option<f64>, weight: f64) -> Indicator {
    Indicator {
        key: key.to_string(),
        description: key.replace('_', " "),
        pillar,
        value,
        weight,
        source: "fixture".to_string(),
        year: Some(2020),
    }
}

pub(super) fn pillar_score(pillar: Pillar, score: Option<f64>, confidence: Option<f64>) -> PillarScore {
    PillarScore {
        pillar,
        score,
        confidence,
    }
}

/// Scores for the four pillars in order, all sharing one confidence.
pub(super) fn scores(values: [Option<f64>; 4], confidence: Option<f64>) -> PillarScores {
    Pillar::ordered()
        .into_iter()
        .zip(values)
        .map(|(pillar, score)| pillar_score(pillar, score, confidence))
        .collect()
}

pub(super) fn industry(key: &str, indicators: Vec<Indicator>, scores: PillarScores) -> IndustryRecord {
    IndustryRecord {
        key: key.to_string(),
        indicators,
        scores,
    }
}

fn industries(records: Vec<IndustryRecord>) -> BTreeMap<String, IndustryRecord> {
    records
        .into_iter()
        .map(|record| (record.key.clone(), record))
        .collect()
}

pub(super) fn country(
    alpha3: &str,
    name: &str,
    overall: PillarScores,
    records: Vec<IndustryRecord>,
) -> CountryRecord {
    CountryRecord {
        alpha3: alpha3.to_string(),
        name: name.to_string(),
        region: "Fixture".to_string(),
        scores: overall,
        industries: industries(records),
    }
}

pub(super) fn year(year: i32, overall: PillarScores, records: Vec<IndustryRecord>) -> HistoricalRecord {
    HistoricalRecord {
        year,
        scores: overall,
        industries: industries(records),
    }
}

/// USA with a measured energy sector, GBR with overall scores only.
pub(super) fn usa() -> CountryRecord {
    country(
        "USA",
        "United States",
        scores([Some(50.0), Some(70.0), None, Some(90.0)], Some(0.5)),
        vec![industry(
            "energy",
            vec![
                indicator("grid_uptime", Pillar::Resilience, Some(80.0), 2.0),
                indicator("reserve_margin", Pillar::Resilience, Some(60.0), 1.0),
                indicator("import_share", Pillar::Autonomy, None, 1.0),
            ],
            scores([Some(10.0), Some(10.0), None, None], Some(0.8)),
        )],
    )
}

pub(super) fn gbr() -> CountryRecord {
    country(
        "GBR",
        "United Kingdom",
        scores([Some(80.0), Some(80.0), Some(80.0), Some(80.0)], Some(1.0)),
        Vec::new(),
    )
}

pub(super) fn usa_history() -> CountryHistory {
    CountryHistory::new(
        "USA",
        vec![
            year(
                2019,
                scores([Some(40.0), Some(60.0), None, None], Some(0.0)),
                vec![industry(
                    "energy",
                    Vec::new(),
                    scores([Some(30.0), None, None, Some(50.0)], Some(0.5)),
                )],
            ),
            year(
                2020,
                scores([Some(50.0), Some(70.0), None, Some(90.0)], Some(0.5)),
                Vec::new(),
            ),
            year(2021, scores([None, None, None, None], None), Vec::new()),
        ],
    )
    .expect("chronological fixture")
}

pub(super) fn gbr_history() -> CountryHistory {
    CountryHistory::new(
        "GBR",
        vec![
            year(2020, scores([Some(80.0); 4], Some(1.0)), Vec::new()),
            year(2022, scores([Some(85.0); 4], Some(1.0)), Vec::new()),
        ],
    )
    .expect("chronological fixture")
}

pub(super) fn store() -> IndicatorStore {
    let mut store = IndicatorStore::new();
    store.insert_country(usa()).expect("usa valid");
    store.insert_country(gbr()).expect("gbr valid");
    store.insert_history(usa_history()).expect("usa history valid");
    store.insert_history(gbr_history()).expect("gbr history valid");
    store
}

pub(super) fn service() -> Arc<VitalsService> {
    Arc::new(VitalsService::new(
        Arc::new(store()),
        Timeframe::new(2010, 2020),
    ))
}

pub(super) fn router() -> axum::Router {
    vitals_router(service())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
