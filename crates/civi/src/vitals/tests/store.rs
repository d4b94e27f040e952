use super::common::*;

use crate::vitals::{
    compare_countries, CountryHistory, HistorySource, IndicatorStore, Pillar, SnapshotError,
};

#[test]
fn lookups_ignore_case() {
    let store = store();
    assert_eq!(store.len(), 2);
    assert_eq!(store.country("usa").map(|record| record.name.as_str()), Some("United States"));
    assert!(store.history(" gbr ").is_some());
    assert!(store.history("JPN").is_none());
}

#[test]
fn duplicate_countries_are_rejected() {
    let mut store = IndicatorStore::new();
    store.insert_country(usa()).expect("first insert");
    let err = store.insert_country(usa()).expect_err("second insert rejected");
    assert!(matches!(err, SnapshotError::DuplicateCountry(code) if code == "USA"));
}

#[test]
fn zero_weight_indicators_are_rejected_at_ingest() {
    let mut record = usa();
    record
        .industries
        .get_mut("energy")
        .expect("energy fixture")
        .indicators
        .push(indicator("free_lunch", Pillar::Autonomy, Some(10.0), 0.0));

    let err = IndicatorStore::new()
        .insert_country(record)
        .expect_err("zero weight rejected");
    assert!(matches!(
        err,
        SnapshotError::MalformedIndicator { ref key, reason, .. }
            if key == "free_lunch" && reason == "weight must be positive"
    ));
}

#[test]
fn non_finite_values_are_rejected_at_ingest() {
    let mut record = usa();
    record
        .industries
        .get_mut("energy")
        .expect("energy fixture")
        .indicators
        .push(indicator("broken_sensor", Pillar::Resilience, Some(f64::NAN), 1.0));

    let err = IndicatorStore::new()
        .insert_country(record)
        .expect_err("NaN rejected");
    assert!(matches!(err, SnapshotError::MalformedIndicator { .. }));
}

#[test]
fn out_of_range_confidence_is_rejected() {
    let record = country(
        "FRA",
        "France",
        scores([Some(50.0), None, None, None], Some(1.5)),
        Vec::new(),
    );

    let err = IndicatorStore::new()
        .insert_country(record)
        .expect_err("confidence above one rejected");
    assert!(matches!(err, SnapshotError::MalformedScore { pillar: "autonomy", .. }));
}

#[test]
fn history_years_must_strictly_increase() {
    let overall = scores([Some(50.0); 4], None);

    let duplicate = CountryHistory::new(
        "USA",
        vec![
            year(2019, overall.clone(), Vec::new()),
            year(2019, overall.clone(), Vec::new()),
        ],
    )
    .expect_err("duplicate year rejected");
    assert!(matches!(duplicate, SnapshotError::DuplicateYear { year: 2019, .. }));

    let reversed = CountryHistory::new(
        "USA",
        vec![
            year(2020, overall.clone(), Vec::new()),
            year(2018, overall, Vec::new()),
        ],
    )
    .expect_err("reversed years rejected");
    assert!(matches!(
        reversed,
        SnapshotError::OutOfOrderYear {
            year: 2018,
            previous: 2020,
            ..
        }
    ));
}

#[test]
fn comparison_ranks_best_first_with_missing_last() {
    let mut store = store();
    store
        .insert_country(country("AUS", "Australia", scores([Some(80.0); 4], Some(1.0)), Vec::new()))
        .expect("aus valid");
    store
        .insert_country(country("NZL", "New Zealand", scores([None; 4], None), Vec::new()))
        .expect("nzl valid");

    let ranking = compare_countries(&store, None, None, None);
    let order: Vec<&str> = ranking.iter().map(|entry| entry.alpha3.as_str()).collect();
    assert_eq!(order, vec!["AUS", "GBR", "USA", "NZL"]);
    assert_eq!(ranking[2].score, Some(70.0));
    assert_eq!(ranking[3].score, None);
    assert!(ranking.iter().all(|entry| entry.error.is_none()));
}

#[test]
fn comparison_attaches_margin_for_single_pillar() {
    let store = store();

    let ranking = compare_countries(&store, None, Some("autonomy"), None);

    assert_eq!(ranking[0].alpha3, "GBR");
    assert_eq!(ranking[0].error, Some(0.0));
    assert_eq!(ranking[1].alpha3, "USA");
    assert_eq!(ranking[1].confidence, Some(0.5));
    assert_eq!(ranking[1].error, Some((1.0 - 0.5) * 50.0 * 0.1));
}

#[test]
fn comparison_on_industry_uses_recomputed_scores() {
    let store = store();

    let ranking = compare_countries(&store, Some("energy"), Some("resilience"), None);

    assert_eq!(ranking[0].alpha3, "USA");
    let score = ranking[0].score.expect("usa energy scored");
    assert!((score - 220.0 / 3.0).abs() < 1e-9);
    assert_eq!(ranking[1].alpha3, "GBR");
    assert_eq!(ranking[1].score, None);
}

#[test]
fn comparison_for_a_year_reads_historical_records() {
    let store = store();

    let ranking = compare_countries(&store, None, Some("resilience"), Some(2019));

    assert_eq!(ranking[0].alpha3, "USA");
    assert_eq!(ranking[0].score, Some(60.0));
    assert_eq!(ranking[0].error, Some(6.0));
    assert_eq!(ranking[1].alpha3, "GBR");
    assert_eq!(ranking[1].score, None);
}

#[test]
fn comparison_for_an_unrecorded_year_leaves_everyone_unscored() {
    let store = store();

    let ranking = compare_countries(&store, Some("energy"), None, Some(1990));

    let order: Vec<&str> = ranking.iter().map(|entry| entry.alpha3.as_str()).collect();
    assert_eq!(order, vec!["GBR", "USA"]);
    assert!(ranking.iter().all(|entry| entry.score.is_none()));
}

#[test]
fn record_for_year_matches_exact_years_only() {
    let store = store();

    let record = store.record_for_year("usa", 2020).expect("2020 recorded");
    assert_eq!(record.year, 2020);
    assert!(store.record_for_year("GBR", 2021).is_none());
    assert!(store.record_for_year("JPN", 2020).is_none());
}
